// crates/call-plane-core/src/lib.rs
// ============================================================================
// Module: Call Plane Core
// Description: Method-invocation core for an information-model server.
// Purpose: Resolve, validate, and invoke bound method handlers per request.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Call Plane Core implements the synchronous method-invocation service of
//! an industrial-automation information-model server: it resolves a
//! caller-supplied object/method identifier pair against an address-space
//! graph, validates type, binding, and authorization state in a fixed,
//! observable order, invokes the natively bound handler, and returns a
//! typed, per-request status outcome. Wire encoding, session establishment,
//! and address-space mutation beyond quiescent-phase construction are
//! collaborator concerns and stay outside this crate.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;
pub mod space;
pub mod telemetry;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::ArgumentSpec;
pub use crate::core::CallMethodRequest;
pub use crate::core::CallMethodResult;
pub use crate::core::DataTypeId;
pub use crate::core::Guid;
pub use crate::core::IdentifierKind;
pub use crate::core::MethodNode;
pub use crate::core::Node;
pub use crate::core::NodeClass;
pub use crate::core::NodeContext;
pub use crate::core::NodeId;
pub use crate::core::PlainNode;
pub use crate::core::Reference;
pub use crate::core::ReferenceKind;
pub use crate::core::SessionId;
pub use crate::core::StatusCode;
pub use crate::core::ValueRank;
pub use crate::core::Variant;
pub use crate::core::VariantValue;
pub use interfaces::AccessDecider;
pub use interfaces::AttributeAccess;
pub use interfaces::HandlerOutcome;
pub use interfaces::InvocationContext;
pub use interfaces::MethodHandler;
pub use interfaces::SessionContext;
pub use runtime::CallDispatcher;
pub use runtime::CallService;
pub use runtime::CallServiceBuilder;
pub use runtime::CallServiceError;
pub use runtime::ExecutionMode;
pub use space::AddressSpace;
pub use space::AddressSpaceBuilder;
pub use space::SpaceError;
pub use telemetry::CALL_LATENCY_BUCKETS_MS;
pub use telemetry::CallAuditEvent;
pub use telemetry::CallAuditEventParams;
pub use telemetry::CallAuditSink;
pub use telemetry::CallFileAuditSink;
pub use telemetry::CallMetricEvent;
pub use telemetry::CallMetrics;
pub use telemetry::CallNoopAuditSink;
pub use telemetry::CallOutcome;
pub use telemetry::CallStderrAuditSink;
pub use telemetry::NoopMetrics;
