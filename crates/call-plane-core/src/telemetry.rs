// crates/call-plane-core/src/telemetry.rs
// ============================================================================
// Module: Call Plane Telemetry
// Description: Structured audit events and metric hooks for call evaluation.
// Purpose: Emit per-call observability without hard dependencies.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines audit event payloads, audit sinks, and a thin metrics
//! interface for method-call evaluation. It is intentionally
//! dependency-light so deployments can route events to their preferred
//! logging pipeline without redesign. Server-misconfiguration outcomes are
//! flagged distinctly, since they indicate a bug in address-space
//! construction rather than a caller error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::identifiers::NodeId;
use crate::core::identifiers::SessionId;
use crate::core::status::StatusCode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default latency buckets in milliseconds for call-evaluation histograms.
pub const CALL_LATENCY_BUCKETS_MS: &[u64] =
    &[1, 2, 5, 10, 25, 50, 100, 250, 500, 1_000, 2_500, 5_000, 10_000, 30_000];

// ============================================================================
// SECTION: Outcome Labels
// ============================================================================

/// Call evaluation outcome classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CallOutcome {
    /// Evaluation reached the handler and returned a good status.
    Ok,
    /// Evaluation terminated with a non-good status.
    Error,
}

impl CallOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }

    /// Classifies a terminal status code.
    #[must_use]
    pub const fn from_status(status: StatusCode) -> Self {
        if status.is_good() { Self::Ok } else { Self::Error }
    }
}

// ============================================================================
// SECTION: Audit Events
// ============================================================================

/// Audit event payload for one method-call evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct CallAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Session identifier of the caller.
    pub session_id: SessionId,
    /// Identifier of the containing object.
    pub object_id: NodeId,
    /// Identifier of the invoked method.
    pub method_id: NodeId,
    /// Terminal status code of the evaluation.
    pub status: StatusCode,
    /// Evaluation outcome classification.
    pub outcome: CallOutcome,
    /// True when the status denotes a server-configuration defect.
    pub misconfiguration: bool,
    /// Number of supplied input arguments.
    pub input_count: usize,
}

/// Inputs required to construct a call audit event.
pub struct CallAuditEventParams {
    /// Session identifier of the caller.
    pub session_id: SessionId,
    /// Identifier of the containing object.
    pub object_id: NodeId,
    /// Identifier of the invoked method.
    pub method_id: NodeId,
    /// Terminal status code of the evaluation.
    pub status: StatusCode,
    /// Number of supplied input arguments.
    pub input_count: usize,
}

impl CallAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: CallAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "method_call",
            timestamp_ms,
            session_id: params.session_id,
            object_id: params.object_id,
            method_id: params.method_id,
            status: params.status,
            outcome: CallOutcome::from_status(params.status),
            misconfiguration: params.status.is_misconfiguration(),
            input_count: params.input_count,
        }
    }
}

// ============================================================================
// SECTION: Audit Sinks
// ============================================================================

/// Audit sink for call evaluation events.
pub trait CallAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &CallAuditEvent);
}

/// No-op audit sink.
pub struct CallNoopAuditSink;

impl CallAuditSink for CallNoopAuditSink {
    fn record(&self, _event: &CallAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct CallStderrAuditSink;

impl CallAuditSink for CallStderrAuditSink {
    fn record(&self, event: &CallAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct CallFileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl CallFileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl CallAuditSink for CallFileAuditSink {
    fn record(&self, event: &CallAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

// ============================================================================
// SECTION: Metrics
// ============================================================================

/// Call evaluation metric event payload.
#[derive(Debug, Clone)]
pub struct CallMetricEvent {
    /// Evaluation outcome classification.
    pub outcome: CallOutcome,
    /// Terminal status code of the evaluation.
    pub status: StatusCode,
}

/// Metrics sink for call evaluations and latencies.
pub trait CallMetrics: Send + Sync {
    /// Records an evaluation counter event.
    fn record_call(&self, event: CallMetricEvent);
    /// Records a latency observation for the evaluation.
    fn record_latency(&self, event: CallMetricEvent, latency: Duration);
}

/// No-op metrics sink.
///
/// # Invariants
/// - Metrics are intentionally discarded.
pub struct NoopMetrics;

impl CallMetrics for NoopMetrics {
    fn record_call(&self, _event: CallMetricEvent) {}

    fn record_latency(&self, _event: CallMetricEvent, _latency: Duration) {}
}
