// crates/call-plane-core/examples/minimal.rs
// ============================================================================
// Module: Call Plane Minimal Example
// Description: Minimal end-to-end method call against an in-memory space.
// Purpose: Demonstrate space construction, handler binding, and dispatch.
// Dependencies: call-plane-core
// ============================================================================

//! ## Overview
//! Builds a two-node address space, binds a doubling handler to a method
//! node, and evaluates a small batch including one failing request.

use std::sync::Arc;

use call_plane_core::AddressSpaceBuilder;
use call_plane_core::ArgumentSpec;
use call_plane_core::CallMethodRequest;
use call_plane_core::CallService;
use call_plane_core::DataTypeId;
use call_plane_core::HandlerOutcome;
use call_plane_core::InvocationContext;
use call_plane_core::MethodHandler;
use call_plane_core::MethodNode;
use call_plane_core::NodeId;
use call_plane_core::ReferenceKind;
use call_plane_core::SessionContext;
use call_plane_core::StatusCode;
use call_plane_core::Variant;
use call_plane_core::VariantValue;
use serde_json::json;

/// Error type for example preconditions.
#[derive(Debug)]
struct ExampleError(&'static str);

impl std::fmt::Display for ExampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ExampleError {}

/// Handler that doubles its single numeric input.
struct DoubleHandler;

impl MethodHandler for DoubleHandler {
    fn invoke(&self, _ctx: &InvocationContext<'_>, inputs: &[Variant]) -> HandlerOutcome {
        let doubled = match inputs.first().map(|input| &input.value) {
            Some(VariantValue::Scalar(value)) => {
                value.as_i64().map_or(0, |number| number * 2)
            }
            _ => 0,
        };
        HandlerOutcome::good(vec![Variant::scalar(int32_type(), json!(doubled))])
    }
}

/// Data type identifier used for the example arguments.
fn int32_type() -> DataTypeId {
    DataTypeId::numeric(0, 6)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let folder = NodeId::numeric(0, 85);
    let double = NodeId::text(1, "double");

    let mut builder = AddressSpaceBuilder::new();
    builder.add_object(folder.clone(), "Objects")?;
    builder.add_method(
        MethodNode::new(double.clone(), "Double")
            .with_input_arguments(vec![ArgumentSpec::scalar("value", int32_type())])
            .with_output_arguments(vec![ArgumentSpec::scalar("doubled", int32_type())])
            .with_handler(Arc::new(DoubleHandler)),
    )?;
    builder.link(&folder, ReferenceKind::HasComponent, &double)?;
    let space = Arc::new(builder.build());

    let service = CallService::builder().space(space).build()?;
    let session = SessionContext::new("example-session");
    let requests = vec![
        CallMethodRequest::new(folder.clone(), double)
            .with_input_arguments(vec![Variant::scalar(int32_type(), json!(21))]),
        CallMethodRequest::new(folder, NodeId::numeric(1, 60_000)),
    ];

    let results = service.call(&session, &requests)?;
    if results.len() != requests.len() {
        return Err(Box::new(ExampleError("result batch length must mirror requests")));
    }
    let doubled = results
        .first()
        .filter(|result| result.status_code.is_good())
        .and_then(|result| result.output_arguments.first())
        .ok_or(ExampleError("missing output argument"))?;
    if doubled.value != VariantValue::Scalar(json!(42)) {
        return Err(Box::new(ExampleError("unexpected doubled value")));
    }
    let missing = results.get(1).ok_or(ExampleError("missing second result"))?;
    if missing.status_code != StatusCode::BadNodeIdUnknown {
        return Err(Box::new(ExampleError("unknown method must be rejected")));
    }
    Ok(())
}
