// crates/call-plane-core/tests/call_errors.rs
// ============================================================================
// Module: Call Dispatch Error Branch Tests
// Description: Conformance coverage for every terminal validation branch.
// Purpose: Ensure dispatch evaluates its decision pipeline in fixed order.
// Dependencies: call-plane-core
// ============================================================================

//! ## Overview
//! Exercises the dispatch pipeline's failure branches with in-memory address
//! spaces: unknown identifiers, wrong node class, unbound handlers, and both
//! gating attributes, plus the success path and at-most-once invocation.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use call_plane_core::AccessDecider;
use call_plane_core::AddressSpace;
use call_plane_core::AddressSpaceBuilder;
use call_plane_core::ArgumentSpec;
use call_plane_core::AttributeAccess;
use call_plane_core::CallDispatcher;
use call_plane_core::CallMethodRequest;
use call_plane_core::DataTypeId;
use call_plane_core::HandlerOutcome;
use call_plane_core::InvocationContext;
use call_plane_core::MethodHandler;
use call_plane_core::MethodNode;
use call_plane_core::NodeClass;
use call_plane_core::NodeId;
use call_plane_core::PlainNode;
use call_plane_core::ReferenceKind;
use call_plane_core::SessionContext;
use call_plane_core::StatusCode;
use call_plane_core::Variant;
use serde_json::json;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

/// Handler that counts invocations and reports success without outputs.
struct CountingHandler {
    calls: AtomicUsize,
}

impl CountingHandler {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MethodHandler for CountingHandler {
    fn invoke(&self, _ctx: &InvocationContext<'_>, _inputs: &[Variant]) -> HandlerOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        HandlerOutcome::good(Vec::new())
    }
}

/// Access decider that denies every session.
struct DenyAllAccess;

impl AccessDecider for DenyAllAccess {
    fn user_executable(&self, _session: &SessionContext, _method: &MethodNode) -> bool {
        false
    }
}

fn objects_folder() -> NodeId {
    NodeId::numeric(0, 85)
}

fn server_object() -> NodeId {
    NodeId::numeric(0, 2253)
}

fn auditing_variable() -> NodeId {
    NodeId::numeric(0, 2994)
}

fn int32_type() -> DataTypeId {
    DataTypeId::numeric(0, 6)
}

/// Builds the fixture space used by the error-branch tests.
///
/// Contains an objects folder, a server object with an auditing variable, a
/// method without a bound handler, and a non-executable method with a
/// handler bound.
fn fixture_space(counting: &Arc<CountingHandler>) -> AddressSpace {
    let mut builder = AddressSpaceBuilder::new();
    builder.add_object(objects_folder(), "Objects").unwrap();
    builder.add_object(server_object(), "Server").unwrap();
    builder
        .add_plain(PlainNode::new(auditing_variable(), NodeClass::Variable, "Auditing"))
        .unwrap();
    builder
        .add_method(MethodNode::new(NodeId::text(1, "nofunctionpointer"), "No function pointer"))
        .unwrap();
    builder
        .add_method(
            MethodNode::new(NodeId::text(1, "nonexec"), "Not executable")
                .with_executable(false)
                .with_handler(Arc::clone(counting) as Arc<dyn MethodHandler>),
        )
        .unwrap();
    builder
        .add_method(
            MethodNode::new(NodeId::text(1, "greet"), "Greet")
                .with_input_arguments(vec![ArgumentSpec::scalar("name", int32_type())])
                .with_handler(Arc::clone(counting) as Arc<dyn MethodHandler>),
        )
        .unwrap();
    builder
        .link(
            &objects_folder(),
            ReferenceKind::HasOrderedComponent,
            &NodeId::text(1, "nofunctionpointer"),
        )
        .unwrap();
    builder
        .link(&objects_folder(), ReferenceKind::HasOrderedComponent, &NodeId::text(1, "nonexec"))
        .unwrap();
    builder.link(&objects_folder(), ReferenceKind::HasComponent, &NodeId::text(1, "greet")).unwrap();
    builder.link(&server_object(), ReferenceKind::HasProperty, &auditing_variable()).unwrap();
    builder.build()
}

fn session() -> SessionContext {
    SessionContext::new("session-1")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn call_unknown_method_is_rejected() {
    let counting = CountingHandler::new();
    let space = fixture_space(&counting);
    let dispatcher = CallDispatcher::new(&space, &AttributeAccess);

    let request = CallMethodRequest::new(objects_folder(), NodeId::numeric(0, 60_000));
    let result = dispatcher.dispatch(&session(), &request);

    assert_eq!(result.status_code, StatusCode::BadNodeIdUnknown);
    assert!(result.output_arguments.is_empty());
}

#[test]
fn call_known_method_on_unknown_object_is_rejected() {
    let counting = CountingHandler::new();
    let space = fixture_space(&counting);
    let dispatcher = CallDispatcher::new(&space, &AttributeAccess);

    let request = CallMethodRequest::new(NodeId::numeric(0, 60_000), NodeId::text(1, "nonexec"));
    let result = dispatcher.dispatch(&session(), &request);

    assert_eq!(result.status_code, StatusCode::BadNodeIdUnknown);
    assert_eq!(counting.calls(), 0);
}

#[test]
fn call_with_both_identifiers_unknown_is_rejected() {
    let counting = CountingHandler::new();
    let space = fixture_space(&counting);
    let dispatcher = CallDispatcher::new(&space, &AttributeAccess);

    let request =
        CallMethodRequest::new(NodeId::numeric(0, 60_000), NodeId::numeric(0, 60_001));
    let result = dispatcher.dispatch(&session(), &request);

    assert_eq!(result.status_code, StatusCode::BadNodeIdUnknown);
}

#[test]
fn call_with_wrong_method_node_class_is_rejected() {
    let counting = CountingHandler::new();
    let space = fixture_space(&counting);
    let dispatcher = CallDispatcher::new(&space, &AttributeAccess);

    let request = CallMethodRequest::new(server_object(), auditing_variable());
    let result = dispatcher.dispatch(&session(), &request);

    assert_eq!(result.status_code, StatusCode::BadNodeClassInvalid);
}

#[test]
fn call_without_bound_handler_is_a_configuration_defect() {
    let counting = CountingHandler::new();
    let space = fixture_space(&counting);
    let dispatcher = CallDispatcher::new(&space, &AttributeAccess);

    let request = CallMethodRequest::new(objects_folder(), NodeId::text(1, "nofunctionpointer"));
    let result = dispatcher.dispatch(&session(), &request);

    assert_eq!(result.status_code, StatusCode::BadInternalError);
    assert!(result.status_code.is_misconfiguration());
}

#[test]
fn call_non_executable_method_is_rejected() {
    let counting = CountingHandler::new();
    let space = fixture_space(&counting);
    let dispatcher = CallDispatcher::new(&space, &AttributeAccess);

    let request = CallMethodRequest::new(objects_folder(), NodeId::text(1, "nonexec"));
    let result = dispatcher.dispatch(&session(), &request);

    assert_eq!(result.status_code, StatusCode::BadNotExecutable);
    assert_eq!(counting.calls(), 0);
}

#[test]
fn executable_gate_dominates_user_executable() {
    let counting = CountingHandler::new();
    let mut builder = AddressSpaceBuilder::new();
    builder.add_object(objects_folder(), "Objects").unwrap();
    builder
        .add_method(
            MethodNode::new(NodeId::text(1, "locked"), "Locked")
                .with_executable(false)
                .with_user_executable(false)
                .with_handler(Arc::clone(&counting) as Arc<dyn MethodHandler>),
        )
        .unwrap();
    let space = builder.build();
    let dispatcher = CallDispatcher::new(&space, &AttributeAccess);

    let request = CallMethodRequest::new(objects_folder(), NodeId::text(1, "locked"));
    let result = dispatcher.dispatch(&session(), &request);

    assert_eq!(result.status_code, StatusCode::BadNotExecutable);
}

#[test]
fn user_executable_attribute_denies_access() {
    let counting = CountingHandler::new();
    let mut builder = AddressSpaceBuilder::new();
    builder.add_object(objects_folder(), "Objects").unwrap();
    builder
        .add_method(
            MethodNode::new(NodeId::text(1, "restricted"), "Restricted")
                .with_user_executable(false)
                .with_handler(Arc::clone(&counting) as Arc<dyn MethodHandler>),
        )
        .unwrap();
    let space = builder.build();
    let dispatcher = CallDispatcher::new(&space, &AttributeAccess);

    let request = CallMethodRequest::new(objects_folder(), NodeId::text(1, "restricted"));
    let result = dispatcher.dispatch(&session(), &request);

    assert_eq!(result.status_code, StatusCode::BadUserAccessDenied);
    assert_eq!(counting.calls(), 0);
}

#[test]
fn access_decider_overrides_the_node_attribute() {
    let counting = CountingHandler::new();
    let space = fixture_space(&counting);
    let dispatcher = CallDispatcher::new(&space, &DenyAllAccess);

    let request = CallMethodRequest::new(objects_folder(), NodeId::text(1, "greet"))
        .with_input_arguments(vec![Variant::scalar(int32_type(), json!(7))]);
    let result = dispatcher.dispatch(&session(), &request);

    assert_eq!(result.status_code, StatusCode::BadUserAccessDenied);
    assert_eq!(counting.calls(), 0);
}

#[test]
fn successful_call_invokes_the_handler_exactly_once() {
    let counting = CountingHandler::new();
    let space = fixture_space(&counting);
    let dispatcher = CallDispatcher::new(&space, &AttributeAccess);

    let request = CallMethodRequest::new(objects_folder(), NodeId::text(1, "greet"))
        .with_input_arguments(vec![Variant::scalar(int32_type(), json!(7))]);
    let result = dispatcher.dispatch(&session(), &request);

    assert_eq!(result.status_code, StatusCode::Good);
    assert_eq!(counting.calls(), 1);
}

#[test]
fn failed_validation_never_reaches_the_handler() {
    let counting = CountingHandler::new();
    let space = fixture_space(&counting);
    let dispatcher = CallDispatcher::new(&space, &AttributeAccess);

    let requests = vec![
        CallMethodRequest::new(objects_folder(), NodeId::numeric(0, 60_000)),
        CallMethodRequest::new(NodeId::numeric(0, 60_000), NodeId::text(1, "greet")),
        CallMethodRequest::new(server_object(), auditing_variable()),
        CallMethodRequest::new(objects_folder(), NodeId::text(1, "nofunctionpointer")),
        CallMethodRequest::new(objects_folder(), NodeId::text(1, "nonexec")),
    ];
    for request in &requests {
        let result = dispatcher.dispatch(&session(), request);
        assert_ne!(result.status_code, StatusCode::Good);
    }

    assert_eq!(counting.calls(), 0);
}
