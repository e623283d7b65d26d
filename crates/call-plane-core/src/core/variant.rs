// crates/call-plane-core/src/core/variant.rs
// ============================================================================
// Module: Call Plane Variants
// Description: Dynamically typed argument values and shape declarations.
// Purpose: Carry method arguments opaquely with a comparable data-type tag.
// Dependencies: crate::core::identifiers, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`Variant`] carries a concrete data-type tag and either a scalar or an
//! array payload. Payloads are opaque to this core beyond the type tag and
//! the scalar/array kind; interpretation belongs to the bound handler and to
//! the (out-of-scope) argument codec. [`ArgumentSpec`] declares one element
//! of a method's expected input or output shape.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::DataTypeId;

// ============================================================================
// SECTION: Value Rank
// ============================================================================

/// Declared shape of an argument value.
///
/// # Invariants
/// - `rank` is always >= 1 for array shapes.
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ValueRank {
    /// Single scalar value.
    Scalar,
    /// Array value with the declared number of dimensions.
    Array {
        /// Number of array dimensions (>= 1).
        rank: u8,
    },
}

impl ValueRank {
    /// Creates an array rank, clamping the dimension count to at least one.
    #[must_use]
    pub const fn array(rank: u8) -> Self {
        Self::Array {
            rank: if rank == 0 { 1 } else { rank },
        }
    }

    /// Returns true when the rank declares a scalar shape.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        matches!(self, Self::Scalar)
    }
}

// ============================================================================
// SECTION: Variant
// ============================================================================

/// Scalar or array payload of a variant.
///
/// # Invariants
/// - Payload contents are opaque to this core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantValue {
    /// Single opaque scalar payload.
    Scalar(Value),
    /// One-dimensional sequence of opaque payloads.
    Array(Vec<Value>),
}

impl VariantValue {
    /// Returns true when the payload is a scalar.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }
}

/// Dynamically typed value carrying a concrete data-type tag.
///
/// # Invariants
/// - `data_type` names the concrete type of every payload element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Concrete data-type tag for the payload.
    pub data_type: DataTypeId,
    /// Scalar or array payload.
    pub value: VariantValue,
}

impl Variant {
    /// Creates a scalar variant.
    #[must_use]
    pub const fn scalar(data_type: DataTypeId, value: Value) -> Self {
        Self {
            data_type,
            value: VariantValue::Scalar(value),
        }
    }

    /// Creates a one-dimensional array variant.
    #[must_use]
    pub const fn array(data_type: DataTypeId, elements: Vec<Value>) -> Self {
        Self {
            data_type,
            value: VariantValue::Array(elements),
        }
    }

    /// Returns true when the payload shape matches the declared rank.
    #[must_use]
    pub const fn matches_rank(&self, rank: ValueRank) -> bool {
        match rank {
            ValueRank::Scalar => self.value.is_scalar(),
            ValueRank::Array {
                ..
            } => !self.value.is_scalar(),
        }
    }
}

// ============================================================================
// SECTION: Argument Specification
// ============================================================================

/// Declared name, type, and shape for one input or output slot of a method.
///
/// # Invariants
/// - `data_type` and `value_rank` together define the accepted shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    /// Argument name.
    pub name: String,
    /// Declared concrete data type.
    pub data_type: DataTypeId,
    /// Declared scalar or array shape.
    pub value_rank: ValueRank,
    /// Human-readable description.
    pub description: String,
}

impl ArgumentSpec {
    /// Creates a scalar argument specification.
    #[must_use]
    pub fn scalar(name: impl Into<String>, data_type: DataTypeId) -> Self {
        Self {
            name: name.into(),
            data_type,
            value_rank: ValueRank::Scalar,
            description: String::new(),
        }
    }

    /// Creates a one-dimensional array argument specification.
    #[must_use]
    pub fn array(name: impl Into<String>, data_type: DataTypeId) -> Self {
        Self {
            name: name.into(),
            data_type,
            value_rank: ValueRank::array(1),
            description: String::new(),
        }
    }

    /// Replaces the argument description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns true when the variant matches this declaration.
    ///
    /// A match requires an equal data-type tag and a payload shape agreeing
    /// with the declared rank. Dimension counts beyond scalar-versus-array
    /// are the argument codec's concern.
    #[must_use]
    pub fn accepts(&self, variant: &Variant) -> bool {
        variant.data_type == self.data_type && variant.matches_rank(self.value_rank)
    }
}
