// crates/call-plane-core/src/runtime/dispatcher.rs
// ============================================================================
// Module: Call Plane Dispatcher
// Description: Fixed-order evaluation of one method-call request.
// Purpose: Map one request, session, and space snapshot to one typed result.
// Dependencies: crate::core, crate::interfaces, crate::space
// ============================================================================

//! ## Overview
//! The dispatcher evaluates exactly one request to exactly one result,
//! deterministically, with no dependency on any other request in the same
//! batch. Evaluation is a fixed-order decision pipeline: each step either
//! produces a terminal status code or falls through. Steps before handler
//! invocation are pure validation with no observable side effect; the
//! handler invocation is the only point where externally authored code runs,
//! and a faulting handler is contained at the dispatch boundary so it can
//! never abort sibling requests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::panic::AssertUnwindSafe;
use std::panic::catch_unwind;

use crate::core::node::MethodNode;
use crate::core::node::Node;
use crate::core::request::CallMethodRequest;
use crate::core::request::CallMethodResult;
use crate::core::status::StatusCode;
use crate::core::variant::ArgumentSpec;
use crate::core::variant::Variant;
use crate::interfaces::AccessDecider;
use crate::interfaces::InvocationContext;
use crate::interfaces::SessionContext;
use crate::space::AddressSpace;

// ============================================================================
// SECTION: Call Dispatcher
// ============================================================================

/// Stateless evaluator for single method-call requests.
///
/// # Invariants
/// - Holds only read borrows; evaluation never outlives one dispatch call.
/// - The bound handler is invoked at most once per request, and only after
///   every validation step has passed.
pub struct CallDispatcher<'a> {
    /// Address-space snapshot resolved against.
    space: &'a AddressSpace,
    /// Session-relative authorization seam.
    access: &'a dyn AccessDecider,
}

impl<'a> CallDispatcher<'a> {
    /// Creates a dispatcher over a space snapshot and an access decider.
    #[must_use]
    pub const fn new(space: &'a AddressSpace, access: &'a dyn AccessDecider) -> Self {
        Self {
            space,
            access,
        }
    }

    /// Evaluates one request to one result.
    ///
    /// The pipeline order is observable through the returned status codes:
    /// object resolution, method resolution, classification, binding sanity,
    /// the executable gate, the user-executable gate, argument-shape
    /// validation, and finally handler invocation.
    #[must_use]
    pub fn dispatch(
        &self,
        session: &SessionContext,
        request: &CallMethodRequest,
    ) -> CallMethodResult {
        let Some(object) = self.space.lookup(&request.object_id) else {
            return CallMethodResult::status_only(StatusCode::BadNodeIdUnknown);
        };
        let Some(method_node) = self.space.lookup(&request.method_id) else {
            return CallMethodResult::status_only(StatusCode::BadNodeIdUnknown);
        };
        let Node::Method(method) = method_node else {
            return CallMethodResult::status_only(StatusCode::BadNodeClassInvalid);
        };
        let Some(handler) = method.handler() else {
            return CallMethodResult::status_only(StatusCode::BadInternalError);
        };
        if !method.executable() {
            return CallMethodResult::status_only(StatusCode::BadNotExecutable);
        }
        if !self.access.user_executable(session, method) {
            return CallMethodResult::status_only(StatusCode::BadUserAccessDenied);
        }
        if let Some(failure) =
            validate_arguments(method.input_arguments(), &request.input_arguments)
        {
            return failure;
        }

        let ctx = InvocationContext {
            session,
            object_id: &request.object_id,
            method_id: &request.method_id,
            object_context: object.context(),
            method_context: method_node.context(),
        };
        let invocation =
            catch_unwind(AssertUnwindSafe(|| handler.invoke(&ctx, &request.input_arguments)));
        let Ok(outcome) = invocation else {
            return CallMethodResult::status_only(StatusCode::BadInternalError);
        };
        finalize(method, outcome.status, outcome.outputs)
    }
}

// ============================================================================
// SECTION: Argument Validation
// ============================================================================

/// Validates supplied inputs against the declared signature.
///
/// Returns the terminal failure result when the shape does not match, or
/// `None` when the handler may be invoked.
fn validate_arguments(
    signature: &[ArgumentSpec],
    inputs: &[Variant],
) -> Option<CallMethodResult> {
    if inputs.len() < signature.len() {
        return Some(CallMethodResult::status_only(StatusCode::BadArgumentsMissing));
    }
    if inputs.len() > signature.len() {
        return Some(CallMethodResult::status_only(StatusCode::BadTooManyArguments));
    }

    let mut mismatched = false;
    let mut results = Vec::with_capacity(inputs.len());
    for (spec, input) in signature.iter().zip(inputs) {
        if spec.accepts(input) {
            results.push(StatusCode::Good);
        } else {
            mismatched = true;
            results.push(StatusCode::BadTypeMismatch);
        }
    }
    if mismatched {
        return Some(CallMethodResult::invalid_arguments(results));
    }
    None
}

// ============================================================================
// SECTION: Finalization
// ============================================================================

/// Finalizes the result from a handler outcome.
///
/// A good handler status must be accompanied by exactly as many outputs as
/// the method declares; a short or long output sequence is a handler
/// contract violation reported as a server-configuration defect. Any
/// non-good handler status is passed through verbatim, never reinterpreted.
fn finalize(method: &MethodNode, status: StatusCode, outputs: Vec<Variant>) -> CallMethodResult {
    if !status.is_good() {
        return CallMethodResult::status_only(status);
    }
    if outputs.len() != method.output_arguments().len() {
        return CallMethodResult::status_only(StatusCode::BadInternalError);
    }
    CallMethodResult::success(status, outputs)
}
