// crates/call-plane-core/src/runtime/service.rs
// ============================================================================
// Module: Call Plane Service
// Description: Batch orchestration over the single-request dispatcher.
// Purpose: Evaluate request batches with order-preserving result assembly.
// Dependencies: crate::core, crate::interfaces, crate::runtime::dispatcher,
// crate::space, crate::telemetry, thiserror
// ============================================================================

//! ## Overview
//! The call service applies the dispatcher to each entry of an incoming
//! request batch and assembles the response batch positionally: the result
//! length always equals the request length and `result[i]` corresponds
//! strictly to `request[i]`, irrespective of execution or completion order.
//! Requests are independent; a failing request never aborts its siblings,
//! and partial success across a batch is the normal case. An empty batch is
//! accepted and yields an empty result batch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use thiserror::Error;

use crate::core::request::CallMethodRequest;
use crate::core::request::CallMethodResult;
use crate::core::status::StatusCode;
use crate::interfaces::AccessDecider;
use crate::interfaces::AttributeAccess;
use crate::interfaces::SessionContext;
use crate::runtime::dispatcher::CallDispatcher;
use crate::space::AddressSpace;
use crate::telemetry::CallAuditEvent;
use crate::telemetry::CallAuditEventParams;
use crate::telemetry::CallAuditSink;
use crate::telemetry::CallMetricEvent;
use crate::telemetry::CallMetrics;
use crate::telemetry::CallNoopAuditSink;
use crate::telemetry::CallOutcome;
use crate::telemetry::NoopMetrics;

// ============================================================================
// SECTION: Execution Mode
// ============================================================================

/// Scheduling strategy for evaluating the requests of one batch.
///
/// # Invariants
/// - Both modes assemble results in input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Evaluate requests one after another on the calling thread.
    ///
    /// One blocked handler serializes all Call traffic in this mode; it is
    /// the deliberate trade-off for deployments that want single-threaded
    /// semantics.
    Sequential,
    /// Fan requests out across a bounded pool of worker threads, one
    /// schedulable unit per invocation.
    Pooled {
        /// Upper bound on concurrent worker threads for one batch.
        workers: NonZeroUsize,
    },
}

// ============================================================================
// SECTION: Service Errors
// ============================================================================

/// Errors returned by the call service.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Batch-level errors are distinct from per-request status codes.
#[derive(Debug, Error)]
pub enum CallServiceError {
    /// Service was built without an address space.
    #[error("call service address space is not configured")]
    MissingAddressSpace,
    /// Batch exceeds the configured operation limit.
    #[error("too many operations in batch ({submitted} > {limit})")]
    TooManyOperations {
        /// Number of requests submitted.
        submitted: usize,
        /// Configured per-batch limit.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Service Builder
// ============================================================================

/// Builder for a call service.
///
/// # Invariants
/// - `build` succeeds only when an address space is configured.
/// - Collaborator seams default to attribute access, no-op audit, and no-op
///   metrics.
#[derive(Default)]
pub struct CallServiceBuilder {
    /// Address space served by the service.
    space: Option<Arc<AddressSpace>>,
    /// Session-relative authorization seam.
    access: Option<Arc<dyn AccessDecider>>,
    /// Audit sink for call events.
    audit: Option<Arc<dyn CallAuditSink>>,
    /// Metrics sink for call counters and latencies.
    metrics: Option<Arc<dyn CallMetrics>>,
    /// Scheduling strategy for batches.
    mode: Option<ExecutionMode>,
    /// Per-batch operation limit (0 = unbounded).
    max_requests_per_call: usize,
}

impl CallServiceBuilder {
    /// Registers the address space served by the service.
    #[must_use]
    pub fn space(mut self, space: Arc<AddressSpace>) -> Self {
        self.space = Some(space);
        self
    }

    /// Registers the session-relative authorization seam.
    #[must_use]
    pub fn access(mut self, access: impl AccessDecider + 'static) -> Self {
        self.access = Some(Arc::new(access));
        self
    }

    /// Registers the audit sink for call events.
    #[must_use]
    pub fn audit(mut self, audit: Arc<dyn CallAuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Registers the metrics sink.
    #[must_use]
    pub fn metrics(mut self, metrics: Arc<dyn CallMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Selects the scheduling strategy for batches.
    #[must_use]
    pub const fn execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets the per-batch operation limit (0 = unbounded).
    #[must_use]
    pub const fn max_requests_per_call(mut self, limit: usize) -> Self {
        self.max_requests_per_call = limit;
        self
    }

    /// Builds the call service.
    ///
    /// # Errors
    ///
    /// Returns [`CallServiceError::MissingAddressSpace`] when no address
    /// space is configured.
    pub fn build(self) -> Result<CallService, CallServiceError> {
        Ok(CallService {
            space: self.space.ok_or(CallServiceError::MissingAddressSpace)?,
            access: self.access.unwrap_or_else(|| Arc::new(AttributeAccess)),
            audit: self.audit.unwrap_or_else(|| Arc::new(CallNoopAuditSink)),
            metrics: self.metrics.unwrap_or_else(|| Arc::new(NoopMetrics)),
            mode: self.mode.unwrap_or(ExecutionMode::Sequential),
            max_requests_per_call: self.max_requests_per_call,
        })
    }
}

// ============================================================================
// SECTION: Call Service
// ============================================================================

/// Batch orchestrator for the Call service.
///
/// # Invariants
/// - The address space is shared, multi-reader, and read-only for the
///   lifetime of the service.
/// - Result order mirrors request order within every batch.
pub struct CallService {
    /// Address space served by the service.
    space: Arc<AddressSpace>,
    /// Session-relative authorization seam.
    access: Arc<dyn AccessDecider>,
    /// Audit sink for call events.
    audit: Arc<dyn CallAuditSink>,
    /// Metrics sink for call counters and latencies.
    metrics: Arc<dyn CallMetrics>,
    /// Scheduling strategy for batches.
    mode: ExecutionMode,
    /// Per-batch operation limit (0 = unbounded).
    max_requests_per_call: usize,
}

impl std::fmt::Debug for CallService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallService")
            .field("space", &"<AddressSpace>")
            .field("access", &"<dyn AccessDecider>")
            .field("audit", &"<dyn CallAuditSink>")
            .field("metrics", &"<dyn CallMetrics>")
            .field("mode", &self.mode)
            .field("max_requests_per_call", &self.max_requests_per_call)
            .finish()
    }
}

impl CallService {
    /// Returns a builder for the call service.
    #[must_use]
    pub fn builder() -> CallServiceBuilder {
        CallServiceBuilder::default()
    }

    /// Evaluates a request batch for one session.
    ///
    /// # Errors
    ///
    /// Returns [`CallServiceError::TooManyOperations`] when the batch
    /// exceeds the configured operation limit. Per-request failures are
    /// reported inside the corresponding [`CallMethodResult`], never as a
    /// batch error.
    pub fn call(
        &self,
        session: &SessionContext,
        requests: &[CallMethodRequest],
    ) -> Result<Vec<CallMethodResult>, CallServiceError> {
        if self.max_requests_per_call != 0 && requests.len() > self.max_requests_per_call {
            return Err(CallServiceError::TooManyOperations {
                submitted: requests.len(),
                limit: self.max_requests_per_call,
            });
        }
        match self.mode {
            ExecutionMode::Sequential => Ok(self.call_sequential(session, requests)),
            ExecutionMode::Pooled {
                workers,
            } => Ok(self.call_pooled(session, requests, workers.get())),
        }
    }

    /// Evaluates the batch on the calling thread, in order.
    fn call_sequential(
        &self,
        session: &SessionContext,
        requests: &[CallMethodRequest],
    ) -> Vec<CallMethodResult> {
        requests.iter().map(|request| self.evaluate_one(session, request)).collect()
    }

    /// Evaluates the batch across a bounded worker pool, assembling results
    /// in input order regardless of completion order.
    fn call_pooled(
        &self,
        session: &SessionContext,
        requests: &[CallMethodRequest],
        workers: usize,
    ) -> Vec<CallMethodResult> {
        if requests.is_empty() {
            return Vec::new();
        }
        let worker_count = workers.min(requests.len());
        let mut slots: Vec<Option<CallMethodResult>> = Vec::with_capacity(requests.len());
        slots.resize_with(requests.len(), || None);
        let next = AtomicUsize::new(0);
        let (sender, receiver) = mpsc::channel();

        thread::scope(|scope| {
            for _ in 0..worker_count {
                let sender = sender.clone();
                let next = &next;
                scope.spawn(move || {
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(request) = requests.get(index) else {
                            break;
                        };
                        let result = self.evaluate_one(session, request);
                        if sender.send((index, result)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(sender);
            while let Ok((index, result)) = receiver.recv() {
                if let Some(slot) = slots.get_mut(index) {
                    *slot = Some(result);
                }
            }
        });

        // A vacant slot means the worker died before it reported a result.
        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    CallMethodResult::status_only(StatusCode::BadInternalError)
                })
            })
            .collect()
    }

    /// Evaluates one request and records audit and metric events.
    fn evaluate_one(
        &self,
        session: &SessionContext,
        request: &CallMethodRequest,
    ) -> CallMethodResult {
        let started = Instant::now();
        let dispatcher = CallDispatcher::new(&self.space, self.access.as_ref());
        let result = dispatcher.dispatch(session, request);
        self.observe(session, request, &result, started);
        result
    }

    /// Emits the audit event and metric observations for one evaluation.
    fn observe(
        &self,
        session: &SessionContext,
        request: &CallMethodRequest,
        result: &CallMethodResult,
        started: Instant,
    ) {
        let event = CallAuditEvent::new(CallAuditEventParams {
            session_id: session.session_id.clone(),
            object_id: request.object_id.clone(),
            method_id: request.method_id.clone(),
            status: result.status_code,
            input_count: request.input_arguments.len(),
        });
        self.audit.record(&event);
        let metric = CallMetricEvent {
            outcome: CallOutcome::from_status(result.status_code),
            status: result.status_code,
        };
        self.metrics.record_call(metric.clone());
        self.metrics.record_latency(metric, started.elapsed());
    }
}
