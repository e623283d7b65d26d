// crates/call-plane-core/tests/call_batch.rs
// ============================================================================
// Module: Call Service Batch Tests
// Description: Order preservation, execution modes, limits, and telemetry.
// Purpose: Validate batch orchestration with in-memory fixtures.
// Dependencies: call-plane-core
// ============================================================================

//! ## Overview
//! Exercises the batch orchestrator: positional result assembly in both
//! execution modes, empty batches, partial success, the per-batch operation
//! limit, and audit/metric hooks.

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

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use call_plane_core::AddressSpace;
use call_plane_core::AddressSpaceBuilder;
use call_plane_core::ArgumentSpec;
use call_plane_core::CallAuditEvent;
use call_plane_core::CallAuditSink;
use call_plane_core::CallMethodRequest;
use call_plane_core::CallMetricEvent;
use call_plane_core::CallMetrics;
use call_plane_core::CallService;
use call_plane_core::CallServiceError;
use call_plane_core::DataTypeId;
use call_plane_core::ExecutionMode;
use call_plane_core::HandlerOutcome;
use call_plane_core::InvocationContext;
use call_plane_core::MethodHandler;
use call_plane_core::MethodNode;
use call_plane_core::NodeId;
use call_plane_core::SessionContext;
use call_plane_core::StatusCode;
use call_plane_core::Variant;
use call_plane_core::VariantValue;
use serde_json::json;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

/// Handler that echoes its single input after an input-controlled delay.
///
/// Earlier batch positions are given longer delays so completion order is
/// the reverse of submission order under concurrent execution.
struct DelayedEchoHandler;

impl MethodHandler for DelayedEchoHandler {
    fn invoke(&self, _ctx: &InvocationContext<'_>, inputs: &[Variant]) -> HandlerOutcome {
        let value = match inputs.first().map(|input| &input.value) {
            Some(VariantValue::Scalar(value)) => value.clone(),
            _ => json!(null),
        };
        let delay = 40_u64.saturating_sub(value.as_u64().unwrap_or(0) * 10);
        thread::sleep(Duration::from_millis(delay));
        HandlerOutcome::good(vec![Variant::scalar(int32_type(), value)])
    }
}

/// Audit sink that captures events in memory.
#[derive(Default)]
struct MemoryAuditSink {
    events: Mutex<Vec<CallAuditEvent>>,
}

impl MemoryAuditSink {
    fn events(&self) -> Vec<CallAuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl CallAuditSink for MemoryAuditSink {
    fn record(&self, event: &CallAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Metrics sink that counts calls and latency observations.
#[derive(Default)]
struct MemoryMetrics {
    calls: Mutex<Vec<CallMetricEvent>>,
    latencies: Mutex<usize>,
}

impl CallMetrics for MemoryMetrics {
    fn record_call(&self, event: CallMetricEvent) {
        self.calls.lock().unwrap().push(event);
    }

    fn record_latency(&self, _event: CallMetricEvent, _latency: Duration) {
        *self.latencies.lock().unwrap() += 1;
    }
}

fn objects_folder() -> NodeId {
    NodeId::numeric(0, 85)
}

fn int32_type() -> DataTypeId {
    DataTypeId::numeric(0, 6)
}

/// Builds a space with a delayed echo method and an unbound method.
fn fixture_space() -> AddressSpace {
    let mut builder = AddressSpaceBuilder::new();
    builder.add_object(objects_folder(), "Objects").unwrap();
    builder
        .add_method(
            MethodNode::new(NodeId::text(1, "echo"), "Echo")
                .with_input_arguments(vec![ArgumentSpec::scalar("value", int32_type())])
                .with_output_arguments(vec![ArgumentSpec::scalar("value", int32_type())])
                .with_handler(Arc::new(DelayedEchoHandler)),
        )
        .unwrap();
    builder
        .add_method(MethodNode::new(NodeId::text(1, "unbound"), "Unbound"))
        .unwrap();
    builder.build()
}

fn session() -> SessionContext {
    SessionContext::new("session-1")
}

fn echo_request(value: u64) -> CallMethodRequest {
    CallMethodRequest::new(objects_folder(), NodeId::text(1, "echo"))
        .with_input_arguments(vec![Variant::scalar(int32_type(), json!(value))])
}

fn echoed_value(result: &call_plane_core::CallMethodResult) -> u64 {
    match result.output_arguments.first().map(|output| &output.value) {
        Some(VariantValue::Scalar(value)) => value.as_u64().unwrap(),
        _ => panic!("missing echoed output"),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn empty_batch_yields_empty_results() {
    let service = CallService::builder().space(Arc::new(fixture_space())).build().unwrap();

    let results = service.call(&session(), &[]).unwrap();

    assert!(results.is_empty());
}

#[test]
fn results_mirror_request_order_sequentially() {
    let service = CallService::builder().space(Arc::new(fixture_space())).build().unwrap();

    let requests = vec![
        echo_request(0),
        CallMethodRequest::new(objects_folder(), NodeId::numeric(0, 60_000)),
        echo_request(2),
    ];
    let results = service.call(&session(), &requests).unwrap();

    assert_eq!(results.len(), requests.len());
    assert_eq!(results[0].status_code, StatusCode::Good);
    assert_eq!(echoed_value(&results[0]), 0);
    assert_eq!(results[1].status_code, StatusCode::BadNodeIdUnknown);
    assert_eq!(results[2].status_code, StatusCode::Good);
    assert_eq!(echoed_value(&results[2]), 2);
}

#[test]
fn pooled_results_mirror_request_order_despite_completion_order() {
    let service = CallService::builder()
        .space(Arc::new(fixture_space()))
        .execution_mode(ExecutionMode::Pooled {
            workers: NonZeroUsize::new(4).unwrap(),
        })
        .build()
        .unwrap();

    let requests: Vec<CallMethodRequest> = (0 .. 4).map(echo_request).collect();
    let results = service.call(&session(), &requests).unwrap();

    assert_eq!(results.len(), requests.len());
    for (index, result) in results.iter().enumerate() {
        assert_eq!(result.status_code, StatusCode::Good);
        assert_eq!(echoed_value(result), u64::try_from(index).unwrap());
    }
}

#[test]
fn pooled_mode_accepts_more_workers_than_requests() {
    let service = CallService::builder()
        .space(Arc::new(fixture_space()))
        .execution_mode(ExecutionMode::Pooled {
            workers: NonZeroUsize::new(16).unwrap(),
        })
        .build()
        .unwrap();

    let requests = vec![echo_request(1)];
    let results = service.call(&session(), &requests).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(echoed_value(&results[0]), 1);
}

#[test]
fn pooled_mode_preserves_partial_success() {
    let service = CallService::builder()
        .space(Arc::new(fixture_space()))
        .execution_mode(ExecutionMode::Pooled {
            workers: NonZeroUsize::new(2).unwrap(),
        })
        .build()
        .unwrap();

    let requests = vec![
        CallMethodRequest::new(objects_folder(), NodeId::text(1, "unbound")),
        echo_request(3),
        CallMethodRequest::new(objects_folder(), NodeId::numeric(0, 60_000)),
    ];
    let results = service.call(&session(), &requests).unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].status_code, StatusCode::BadInternalError);
    assert_eq!(results[1].status_code, StatusCode::Good);
    assert_eq!(results[2].status_code, StatusCode::BadNodeIdUnknown);
}

#[test]
fn oversized_batch_is_rejected_before_evaluation() {
    let service = CallService::builder()
        .space(Arc::new(fixture_space()))
        .max_requests_per_call(2)
        .build()
        .unwrap();

    let requests: Vec<CallMethodRequest> = (0 .. 3).map(echo_request).collect();
    let error = service.call(&session(), &requests).unwrap_err();

    match error {
        CallServiceError::TooManyOperations {
            submitted,
            limit,
        } => {
            assert_eq!(submitted, 3);
            assert_eq!(limit, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn batch_within_the_operation_limit_is_accepted() {
    let service = CallService::builder()
        .space(Arc::new(fixture_space()))
        .max_requests_per_call(2)
        .build()
        .unwrap();

    let requests: Vec<CallMethodRequest> = (0 .. 2).map(echo_request).collect();
    let results = service.call(&session(), &requests).unwrap();

    assert_eq!(results.len(), 2);
}

#[test]
fn zero_limit_means_unbounded_batches() {
    let service = CallService::builder()
        .space(Arc::new(fixture_space()))
        .max_requests_per_call(0)
        .build()
        .unwrap();

    let requests: Vec<CallMethodRequest> = (0 .. 8).map(|_| echo_request(4)).collect();
    let results = service.call(&session(), &requests).unwrap();

    assert_eq!(results.len(), 8);
}

#[test]
fn builder_without_a_space_fails_closed() {
    let error = CallService::builder().build().unwrap_err();

    assert!(matches!(error, CallServiceError::MissingAddressSpace));
}

#[test]
fn audit_events_are_recorded_per_request() {
    let audit = Arc::new(MemoryAuditSink::default());
    let service = CallService::builder()
        .space(Arc::new(fixture_space()))
        .audit(Arc::clone(&audit) as Arc<dyn CallAuditSink>)
        .build()
        .unwrap();

    let requests = vec![
        echo_request(1),
        CallMethodRequest::new(objects_folder(), NodeId::text(1, "unbound")),
    ];
    service.call(&session(), &requests).unwrap();

    let events = audit.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].status, StatusCode::Good);
    assert!(!events[0].misconfiguration);
    assert_eq!(events[0].input_count, 1);
    assert_eq!(events[1].status, StatusCode::BadInternalError);
    assert!(events[1].misconfiguration);
    assert_eq!(events[1].method_id, NodeId::text(1, "unbound"));
}

#[test]
fn metrics_observe_every_evaluation() {
    let metrics = Arc::new(MemoryMetrics::default());
    let service = CallService::builder()
        .space(Arc::new(fixture_space()))
        .metrics(Arc::clone(&metrics) as Arc<dyn CallMetrics>)
        .build()
        .unwrap();

    let requests = vec![echo_request(1), echo_request(2)];
    service.call(&session(), &requests).unwrap();

    assert_eq!(metrics.calls.lock().unwrap().len(), 2);
    assert_eq!(*metrics.latencies.lock().unwrap(), 2);
}
