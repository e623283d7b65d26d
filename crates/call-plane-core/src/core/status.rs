// crates/call-plane-core/src/core/status.rs
// ============================================================================
// Module: Call Plane Status Codes
// Description: Terminal per-request outcome codes for the Call service.
// Purpose: Represent every dispatch outcome as a typed status value.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every outcome of a method-call evaluation, including server-configuration
//! defects, is represented as a [`StatusCode`] inside a result. No fault
//! crosses the service boundary. Three error classes are distinguished by
//! origin: caller errors (correctable by the caller), server-configuration
//! defects (reported distinctly for monitoring), and handler-originated
//! failures (passed through verbatim).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Status Code
// ============================================================================

/// Terminal outcome code of one method-call evaluation.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
    /// Success; output arguments populated per the output signature.
    Good,
    /// The object or method identifier does not resolve in the address space.
    BadNodeIdUnknown,
    /// The method identifier resolves but its node class is not Method.
    BadNodeClassInvalid,
    /// The resolved Method node has no bound handler or the handler violated
    /// its output contract (server misconfiguration).
    BadInternalError,
    /// The method's `executable` attribute is false.
    BadNotExecutable,
    /// The method's session-resolved `user_executable` attribute is false.
    BadUserAccessDenied,
    /// Fewer input arguments were supplied than the signature declares.
    BadArgumentsMissing,
    /// More input arguments were supplied than the signature declares.
    BadTooManyArguments,
    /// One or more positional type mismatches; see per-argument results.
    BadInvalidArgument,
    /// Per-argument status for a specific mismatched position.
    BadTypeMismatch,
}

impl StatusCode {
    /// Returns true when the status denotes success.
    #[must_use]
    pub const fn is_good(self) -> bool {
        matches!(self, Self::Good)
    }

    /// Returns true when the status denotes a server-configuration defect.
    ///
    /// Configuration defects are never the caller's fault and are worth
    /// separate monitoring since they indicate a bug in address-space
    /// construction or in a bound handler's output contract.
    #[must_use]
    pub const fn is_misconfiguration(self) -> bool {
        matches!(self, Self::BadInternalError)
    }

    /// Returns a stable label for the status code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::BadNodeIdUnknown => "BadNodeIdUnknown",
            Self::BadNodeClassInvalid => "BadNodeClassInvalid",
            Self::BadInternalError => "BadInternalError",
            Self::BadNotExecutable => "BadNotExecutable",
            Self::BadUserAccessDenied => "BadUserAccessDenied",
            Self::BadArgumentsMissing => "BadArgumentsMissing",
            Self::BadTooManyArguments => "BadTooManyArguments",
            Self::BadInvalidArgument => "BadInvalidArgument",
            Self::BadTypeMismatch => "BadTypeMismatch",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
