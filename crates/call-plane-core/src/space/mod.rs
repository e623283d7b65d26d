// crates/call-plane-core/src/space/mod.rs
// ============================================================================
// Module: Call Plane Address Space
// Description: Read-indexed node graph with quiescent-phase construction.
// Purpose: Own all nodes and serve concurrent lookup and reference queries.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The address space is an index keyed by the structural node identifier
//! rather than a pointer graph; nodes are arena-owned by the space and
//! referenced from elsewhere only by identifier. Lookup is a pure read with
//! no side effects; absence of a match is "no value", never an error at this
//! layer. The space is immutable once built, so arbitrarily many dispatch
//! evaluations may read it concurrently. Construction is confined to the
//! builder, before the service begins evaluating calls; the full mutation
//! API of the information model is a separate collaborator's concern.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;

use thiserror::Error;

use crate::core::identifiers::NodeId;
use crate::core::node::MethodNode;
use crate::core::node::Node;
use crate::core::node::NodeClass;
use crate::core::node::PlainNode;
use crate::core::node::Reference;
use crate::core::node::ReferenceKind;

// ============================================================================
// SECTION: Space Errors
// ============================================================================

/// Errors reported by the address-space builder.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SpaceError {
    /// A node with the same identifier is already registered.
    #[error("duplicate node id: {0}")]
    DuplicateNodeId(NodeId),
    /// A plain node was declared with the method classification.
    #[error("node class Method is reserved for method nodes: {0}")]
    MethodClassReserved(NodeId),
    /// A reference names a source node that is not registered.
    #[error("unknown reference source: {0}")]
    UnknownReferenceSource(NodeId),
    /// A reference names a target node that is not registered.
    #[error("unknown reference target: {0}")]
    UnknownReferenceTarget(NodeId),
}

// ============================================================================
// SECTION: Address Space
// ============================================================================

/// Read-indexed graph of all nodes, owned independently of the service.
///
/// # Invariants
/// - Node identifiers are unique within the space.
/// - The space is immutable after `build`; lookup never observes a partial
///   graph.
pub struct AddressSpace {
    /// Node index keyed by structural identifier.
    nodes: HashMap<NodeId, Node>,
}

impl AddressSpace {
    /// Resolves a node by identifier.
    ///
    /// Absence of a match is not an error condition at this layer; it
    /// becomes a status code only in the dispatcher.
    #[must_use]
    pub fn lookup(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Enumerates a node's forward references in insertion order.
    ///
    /// An unknown node yields an empty sequence. When `kind` is provided,
    /// only references of that classification are returned.
    #[must_use]
    pub fn references_of(
        &self,
        id: &NodeId,
        kind: Option<ReferenceKind>,
    ) -> Vec<(ReferenceKind, NodeId)> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };
        node.references()
            .iter()
            .filter(|reference| reference.forward)
            .filter(|reference| kind.is_none_or(|kind| reference.kind == kind))
            .map(|reference| (reference.kind, reference.target.clone()))
            .collect()
    }

    /// Returns the number of registered nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true when the space holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ============================================================================
// SECTION: Address Space Builder
// ============================================================================

/// Quiescent-phase builder for an address space.
///
/// # Invariants
/// - Registration is fail-closed: duplicate identifiers, reserved
///   classifications, and dangling references are rejected eagerly.
#[derive(Default)]
pub struct AddressSpaceBuilder {
    /// Node index under construction.
    nodes: HashMap<NodeId, Node>,
}

impl AddressSpaceBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an object node.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::DuplicateNodeId`] when the identifier is taken.
    pub fn add_object(
        &mut self,
        id: NodeId,
        browse_name: impl Into<String>,
    ) -> Result<(), SpaceError> {
        self.add_plain(PlainNode::new(id, NodeClass::Object, browse_name))
    }

    /// Registers a non-method node of any classification.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::MethodClassReserved`] when the node declares
    /// the method classification, or [`SpaceError::DuplicateNodeId`] when
    /// the identifier is taken.
    pub fn add_plain(&mut self, node: PlainNode) -> Result<(), SpaceError> {
        if node.node_class() == NodeClass::Method {
            return Err(SpaceError::MethodClassReserved(node.id().clone()));
        }
        self.insert(Node::Plain(node))
    }

    /// Registers a method node.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::DuplicateNodeId`] when the identifier is taken.
    pub fn add_method(&mut self, node: MethodNode) -> Result<(), SpaceError> {
        self.insert(Node::Method(node))
    }

    /// Wires a forward reference from `source` to `target` and the inverse
    /// entry on the target.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::UnknownReferenceSource`] or
    /// [`SpaceError::UnknownReferenceTarget`] when either end is not
    /// registered.
    pub fn link(
        &mut self,
        source: &NodeId,
        kind: ReferenceKind,
        target: &NodeId,
    ) -> Result<(), SpaceError> {
        if !self.nodes.contains_key(source) {
            return Err(SpaceError::UnknownReferenceSource(source.clone()));
        }
        if !self.nodes.contains_key(target) {
            return Err(SpaceError::UnknownReferenceTarget(target.clone()));
        }
        if let Some(node) = self.nodes.get_mut(source) {
            node.push_reference(Reference {
                kind,
                target: target.clone(),
                forward: true,
            });
        }
        if let Some(node) = self.nodes.get_mut(target) {
            node.push_reference(Reference {
                kind,
                target: source.clone(),
                forward: false,
            });
        }
        Ok(())
    }

    /// Finalizes the space, making it immutable.
    #[must_use]
    pub fn build(self) -> AddressSpace {
        AddressSpace {
            nodes: self.nodes,
        }
    }

    /// Inserts a node, rejecting duplicate identifiers.
    fn insert(&mut self, node: Node) -> Result<(), SpaceError> {
        let id = node.id().clone();
        if self.nodes.contains_key(&id) {
            return Err(SpaceError::DuplicateNodeId(id));
        }
        self.nodes.insert(id, node);
        Ok(())
    }
}
