// crates/call-plane-core/src/core/request.rs
// ============================================================================
// Module: Call Plane Request Types
// Description: Decoded method-call request and result shapes.
// Purpose: Define the per-request contract consumed and produced by dispatch.
// Dependencies: crate::core::{identifiers, status, variant}, serde
// ============================================================================

//! ## Overview
//! These are the decoded forms handed over by the transport layer and
//! returned to it; wire encoding is out of scope. A result always carries a
//! terminal status code; per-argument statuses are populated only on
//! argument-validation failure, and output arguments only on success.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::NodeId;
use crate::core::status::StatusCode;
use crate::core::variant::Variant;

// ============================================================================
// SECTION: Request
// ============================================================================

/// One decoded method-call request.
///
/// # Invariants
/// - Identifiers are resolved against the address space at dispatch time;
///   neither implies node existence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMethodRequest {
    /// Identifier of the containing object.
    pub object_id: NodeId,
    /// Identifier of the method to invoke.
    pub method_id: NodeId,
    /// Input arguments in declaration order.
    pub input_arguments: Vec<Variant>,
}

impl CallMethodRequest {
    /// Creates a request without input arguments.
    #[must_use]
    pub const fn new(object_id: NodeId, method_id: NodeId) -> Self {
        Self {
            object_id,
            method_id,
            input_arguments: Vec::new(),
        }
    }

    /// Replaces the input arguments.
    #[must_use]
    pub fn with_input_arguments(mut self, input_arguments: Vec<Variant>) -> Self {
        self.input_arguments = input_arguments;
        self
    }
}

// ============================================================================
// SECTION: Result
// ============================================================================

/// Typed outcome of one method-call evaluation.
///
/// # Invariants
/// - `input_argument_results` is non-empty only on argument-validation
///   failure, one status per supplied input position.
/// - `output_arguments` is non-empty only on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMethodResult {
    /// Terminal status code for the request.
    pub status_code: StatusCode,
    /// Per-argument statuses on argument-validation failure.
    pub input_argument_results: Vec<StatusCode>,
    /// Output arguments populated by the handler on success.
    pub output_arguments: Vec<Variant>,
}

impl CallMethodResult {
    /// Creates a result carrying only a status code.
    #[must_use]
    pub const fn status_only(status_code: StatusCode) -> Self {
        Self {
            status_code,
            input_argument_results: Vec::new(),
            output_arguments: Vec::new(),
        }
    }

    /// Creates an argument-validation failure result with per-argument
    /// statuses.
    #[must_use]
    pub const fn invalid_arguments(input_argument_results: Vec<StatusCode>) -> Self {
        Self {
            status_code: StatusCode::BadInvalidArgument,
            input_argument_results,
            output_arguments: Vec::new(),
        }
    }

    /// Creates a success result carrying handler outputs.
    #[must_use]
    pub const fn success(status_code: StatusCode, output_arguments: Vec<Variant>) -> Self {
        Self {
            status_code,
            input_argument_results: Vec::new(),
            output_arguments,
        }
    }
}
