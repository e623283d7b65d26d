// crates/call-plane-core/src/core/node.rs
// ============================================================================
// Module: Call Plane Node Model
// Description: Graph vertices, classifications, references, and method nodes.
// Purpose: Model address-space entities with attribute and binding inspection.
// Dependencies: crate::core::{identifiers, variant}, crate::interfaces, serde
// ============================================================================

//! ## Overview
//! Nodes are the vertices of the address-space graph, polymorphic over
//! classification. A [`MethodNode`] is the only invocable classification: it
//! carries the boolean gating attributes, the declared argument signatures,
//! and the optional bound invocation handler. The handler is set exactly once
//! at construction and treated as read-only afterwards.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::NodeId;
use crate::core::variant::ArgumentSpec;
use crate::interfaces::MethodHandler;

// ============================================================================
// SECTION: Classifications
// ============================================================================

/// Node classification within the address space.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeClass {
    /// Object instance node.
    Object,
    /// Variable instance node.
    Variable,
    /// Method node (the invocable classification).
    Method,
    /// Object type node.
    ObjectType,
    /// Variable type node.
    VariableType,
    /// Reference type node.
    ReferenceType,
    /// Data type node.
    DataType,
    /// View node.
    View,
}

/// Reference classification between two nodes.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Hierarchical organization reference.
    Organizes,
    /// Hierarchical component containment.
    HasComponent,
    /// Hierarchical component containment with significant order.
    HasOrderedComponent,
    /// Property containment.
    HasProperty,
    /// Instance-to-type relationship.
    HasTypeDefinition,
    /// Type-to-subtype relationship.
    HasSubtype,
}

/// One directed edge of the address-space graph.
///
/// # Invariants
/// - Insertion order is preserved for enumeration; it is not semantically
///   significant for lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Reference classification.
    pub kind: ReferenceKind,
    /// Identifier of the referenced node.
    pub target: NodeId,
    /// Direction flag: true for forward, false for inverse.
    pub forward: bool,
}

// ============================================================================
// SECTION: Node Context
// ============================================================================

/// Caller-opaque context value attached to a node at construction.
///
/// Handed to the bound handler for the object and method nodes of an
/// invocation; never interpreted by this core.
pub type NodeContext = Arc<dyn Any + Send + Sync>;

// ============================================================================
// SECTION: Plain Node
// ============================================================================

/// Non-method node of any classification.
///
/// # Invariants
/// - `node_class` is never [`NodeClass::Method`]; the space builder rejects
///   plain nodes declared with the method classification.
#[derive(Clone)]
pub struct PlainNode {
    /// Node identifier.
    id: NodeId,
    /// Node classification.
    node_class: NodeClass,
    /// Browse name for enumeration and diagnostics.
    browse_name: String,
    /// Outgoing and incoming references, insertion-ordered.
    references: Vec<Reference>,
    /// Caller-opaque node context.
    context: Option<NodeContext>,
}

impl PlainNode {
    /// Creates a plain node with the given classification.
    #[must_use]
    pub fn new(id: NodeId, node_class: NodeClass, browse_name: impl Into<String>) -> Self {
        Self {
            id,
            node_class,
            browse_name: browse_name.into(),
            references: Vec::new(),
            context: None,
        }
    }

    /// Attaches a caller-opaque context value.
    #[must_use]
    pub fn with_context(mut self, context: NodeContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Returns the node identifier.
    #[must_use]
    pub const fn id(&self) -> &NodeId {
        &self.id
    }

    /// Returns the node classification.
    #[must_use]
    pub const fn node_class(&self) -> NodeClass {
        self.node_class
    }

    /// Returns the browse name.
    #[must_use]
    pub fn browse_name(&self) -> &str {
        &self.browse_name
    }
}

// ============================================================================
// SECTION: Method Node
// ============================================================================

/// Method-classed node with invocation semantics.
///
/// # Invariants
/// - `executable == false` makes the method never invocable regardless of
///   `user_executable`.
/// - The handler is set at most once, at construction, and never reassigned.
#[derive(Clone)]
pub struct MethodNode {
    /// Node identifier.
    id: NodeId,
    /// Browse name for enumeration and diagnostics.
    browse_name: String,
    /// Outgoing and incoming references, insertion-ordered.
    references: Vec<Reference>,
    /// Caller-opaque node context.
    context: Option<NodeContext>,
    /// Server-wide executable attribute.
    executable: bool,
    /// Session-relative executable attribute, pre-resolved by the builder.
    user_executable: bool,
    /// Bound invocation handler, if any.
    handler: Option<Arc<dyn MethodHandler>>,
    /// Declared input argument signature.
    input_arguments: Vec<ArgumentSpec>,
    /// Declared output argument signature.
    output_arguments: Vec<ArgumentSpec>,
}

impl MethodNode {
    /// Creates a method node with both gating attributes enabled and no
    /// handler bound.
    #[must_use]
    pub fn new(id: NodeId, browse_name: impl Into<String>) -> Self {
        Self {
            id,
            browse_name: browse_name.into(),
            references: Vec::new(),
            context: None,
            executable: true,
            user_executable: true,
            handler: None,
            input_arguments: Vec::new(),
            output_arguments: Vec::new(),
        }
    }

    /// Sets the server-wide executable attribute.
    #[must_use]
    pub const fn with_executable(mut self, executable: bool) -> Self {
        self.executable = executable;
        self
    }

    /// Sets the pre-resolved session-relative executable attribute.
    #[must_use]
    pub const fn with_user_executable(mut self, user_executable: bool) -> Self {
        self.user_executable = user_executable;
        self
    }

    /// Binds the invocation handler.
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn MethodHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Declares the input argument signature.
    #[must_use]
    pub fn with_input_arguments(mut self, arguments: Vec<ArgumentSpec>) -> Self {
        self.input_arguments = arguments;
        self
    }

    /// Declares the output argument signature.
    #[must_use]
    pub fn with_output_arguments(mut self, arguments: Vec<ArgumentSpec>) -> Self {
        self.output_arguments = arguments;
        self
    }

    /// Attaches a caller-opaque context value.
    #[must_use]
    pub fn with_context(mut self, context: NodeContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Returns the node identifier.
    #[must_use]
    pub const fn id(&self) -> &NodeId {
        &self.id
    }

    /// Returns the browse name.
    #[must_use]
    pub fn browse_name(&self) -> &str {
        &self.browse_name
    }

    /// Returns the server-wide executable attribute.
    #[must_use]
    pub const fn executable(&self) -> bool {
        self.executable
    }

    /// Returns the pre-resolved session-relative executable attribute.
    #[must_use]
    pub const fn user_executable(&self) -> bool {
        self.user_executable
    }

    /// Returns the bound invocation handler, if any.
    #[must_use]
    pub fn handler(&self) -> Option<&Arc<dyn MethodHandler>> {
        self.handler.as_ref()
    }

    /// Returns the declared input argument signature.
    #[must_use]
    pub fn input_arguments(&self) -> &[ArgumentSpec] {
        &self.input_arguments
    }

    /// Returns the declared output argument signature.
    #[must_use]
    pub fn output_arguments(&self) -> &[ArgumentSpec] {
        &self.output_arguments
    }
}

// ============================================================================
// SECTION: Node
// ============================================================================

/// Address-space vertex, polymorphic over classification.
#[derive(Clone)]
pub enum Node {
    /// Method-classed node with invocation semantics.
    Method(MethodNode),
    /// Node of any other classification.
    Plain(PlainNode),
}

impl Node {
    /// Returns the node identifier.
    #[must_use]
    pub const fn id(&self) -> &NodeId {
        match self {
            Self::Method(node) => node.id(),
            Self::Plain(node) => node.id(),
        }
    }

    /// Returns the node classification.
    #[must_use]
    pub const fn node_class(&self) -> NodeClass {
        match self {
            Self::Method(_) => NodeClass::Method,
            Self::Plain(node) => node.node_class(),
        }
    }

    /// Returns the browse name.
    #[must_use]
    pub fn browse_name(&self) -> &str {
        match self {
            Self::Method(node) => node.browse_name(),
            Self::Plain(node) => node.browse_name(),
        }
    }

    /// Returns the node references in insertion order.
    #[must_use]
    pub fn references(&self) -> &[Reference] {
        match self {
            Self::Method(node) => &node.references,
            Self::Plain(node) => &node.references,
        }
    }

    /// Returns the caller-opaque node context, if any.
    #[must_use]
    pub const fn context(&self) -> Option<&NodeContext> {
        match self {
            Self::Method(node) => node.context.as_ref(),
            Self::Plain(node) => node.context.as_ref(),
        }
    }

    /// Appends a reference, preserving insertion order.
    pub(crate) fn push_reference(&mut self, reference: Reference) {
        match self {
            Self::Method(node) => node.references.push(reference),
            Self::Plain(node) => node.references.push(reference),
        }
    }
}
