// crates/call-plane-core/src/interfaces/mod.rs
// ============================================================================
// Module: Call Plane Interfaces
// Description: Handler, session, and authorization contract surfaces.
// Purpose: Define the seams between the dispatch core and its collaborators.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the dispatch core integrates with externally
//! authored code without embedding backend-specific details. A bound
//! [`MethodHandler`] is the only point where external code runs; the
//! [`AccessDecider`] seam resolves per-session authorization without this
//! core knowing how identities map to rights. Implementations must be
//! deterministic and fail closed on missing or invalid data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::identifiers::NodeId;
use crate::core::identifiers::SessionId;
use crate::core::node::MethodNode;
use crate::core::node::NodeContext;
use crate::core::status::StatusCode;
use crate::core::variant::Variant;

// ============================================================================
// SECTION: Session Context
// ============================================================================

/// Opaque caller identity established by the transport/session collaborator.
///
/// # Invariants
/// - Constructed and destroyed outside this core; dispatch only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Opaque session identifier.
    pub session_id: SessionId,
}

impl SessionContext {
    /// Creates a session context from an opaque identifier.
    #[must_use]
    pub fn new(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}

// ============================================================================
// SECTION: Invocation Context
// ============================================================================

/// Context handed to a bound handler for one invocation.
///
/// # Invariants
/// - Identifiers refer to the nodes resolved for this request.
/// - Context values are the caller-opaque values attached at node
///   construction; this core never interprets them.
pub struct InvocationContext<'a> {
    /// Session identity of the caller.
    pub session: &'a SessionContext,
    /// Identifier of the containing object.
    pub object_id: &'a NodeId,
    /// Identifier of the invoked method.
    pub method_id: &'a NodeId,
    /// Caller-opaque context of the object node.
    pub object_context: Option<&'a NodeContext>,
    /// Caller-opaque context of the method node.
    pub method_context: Option<&'a NodeContext>,
}

// ============================================================================
// SECTION: Method Handler
// ============================================================================

/// Outcome returned by a bound handler.
///
/// # Invariants
/// - On a good status, `outputs` must be sized per the method's declared
///   output signature; the dispatcher verifies the count before finalizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerOutcome {
    /// Status code reported by the handler, passed through verbatim.
    pub status: StatusCode,
    /// Output arguments populated by the handler.
    pub outputs: Vec<Variant>,
}

impl HandlerOutcome {
    /// Creates a good outcome carrying output arguments.
    #[must_use]
    pub const fn good(outputs: Vec<Variant>) -> Self {
        Self {
            status: StatusCode::Good,
            outputs,
        }
    }

    /// Creates an outcome carrying only a status code.
    #[must_use]
    pub const fn status(status: StatusCode) -> Self {
        Self {
            status,
            outputs: Vec::new(),
        }
    }
}

/// Externally bound executable behavior attached to a method node.
///
/// The handler is invoked synchronously, at most once per request, and only
/// after every validation step has passed. It receives everything it needs
/// as arguments; no ambient server state is involved.
pub trait MethodHandler: Send + Sync {
    /// Invokes the handler with validated inputs.
    fn invoke(&self, ctx: &InvocationContext<'_>, inputs: &[Variant]) -> HandlerOutcome;
}

// ============================================================================
// SECTION: Access Decider
// ============================================================================

/// Session-relative authorization seam for the user-executable gate.
///
/// The mechanism for resolving per-caller rights is an external
/// collaborator's responsibility; this core only consumes the resolved
/// boolean.
pub trait AccessDecider: Send + Sync {
    /// Resolves the session-relative executable attribute for a method.
    fn user_executable(&self, session: &SessionContext, method: &MethodNode) -> bool;
}

/// Default decider returning the method node's pre-resolved attribute.
pub struct AttributeAccess;

impl AccessDecider for AttributeAccess {
    fn user_executable(&self, _session: &SessionContext, method: &MethodNode) -> bool {
        method.user_executable()
    }
}
