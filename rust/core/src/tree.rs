// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The flattened element tree.
//!
//! [`TreeIndex`] stores every node in one array, in the depth-first order of
//! the flatten that produced it. Because of that order, the subtree of a node
//! is always the contiguous run `index..subtree_end`, which keeps the
//! leaf and descendant queries in [`crate::traversal`] linear in subtree size
//! without any pointer chasing.
//!
//! Leaves and branches are distinct variants of [`NodeKind`]; a branch is
//! never recognised by "has no children".

use rustc_hash::FxHashMap;

use crate::element::{Element, ElementId, ObjectId};
use crate::error::{Error, Result};
use crate::keys::{NodeIndex, TreeGeneration};

/// Branch or leaf payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A group (category, family, type, ...). Children are ordered.
    Branch { children: Vec<NodeIndex> },
    /// Exactly one element.
    Leaf { element: Element },
}

/// One entry of the flattened tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub index: NodeIndex,
    /// `None` for top-level nodes (children of the synthetic root).
    pub parent: Option<NodeIndex>,
    /// Zero for top-level nodes.
    pub depth: u32,
    /// Group key for branches, `"name [id]"` for leaves.
    pub title: String,
    pub kind: NodeKind,
    /// Exclusive end of this node's subtree in flatten order.
    pub(crate) subtree_end: NodeIndex,
}

impl TreeNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Child indices, empty for leaves.
    pub fn children(&self) -> &[NodeIndex] {
        match &self.kind {
            NodeKind::Branch { children } => children,
            NodeKind::Leaf { .. } => &[],
        }
    }

    /// The wrapped element, `None` for branches.
    pub fn element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Leaf { element } => Some(element),
            NodeKind::Branch { .. } => None,
        }
    }

    /// Parent index with `-1` for top-level nodes.
    pub fn parent_raw(&self) -> i64 {
        self.parent
            .map(|p| i64::from(p.0))
            .unwrap_or(NodeIndex::ROOT_SENTINEL)
    }
}

/// Flattened, indexable element tree.
///
/// Built by [`TreeBuilder`](crate::TreeBuilder). Indices are only valid for
/// the instance that produced them.
#[derive(Debug, Clone)]
pub struct TreeIndex {
    pub(crate) nodes: Vec<TreeNode>,
    pub(crate) roots: Vec<NodeIndex>,
    pub(crate) by_element: FxHashMap<ElementId, NodeIndex>,
    pub(crate) by_object: FxHashMap<ObjectId, NodeIndex>,
    pub(crate) generation: TreeGeneration,
    pub(crate) levels: usize,
}

impl TreeIndex {
    /// Creates a tree with no nodes.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            by_element: FxHashMap::default(),
            by_object: FxHashMap::default(),
            generation: TreeGeneration::next(),
            levels: 0,
        }
    }

    /// Number of nodes (branches and leaves).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of leaves, equal to the number of elements in the tree.
    pub fn leaf_count(&self) -> usize {
        self.by_element.len()
    }

    /// Number of grouping levels above the leaves.
    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn generation(&self) -> TreeGeneration {
        self.generation
    }

    /// Top-level nodes in display order.
    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    /// All nodes in flatten order.
    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> + '_ {
        self.nodes.iter()
    }

    pub fn contains(&self, index: NodeIndex) -> bool {
        index.as_usize() < self.nodes.len()
    }

    /// Returns the node, or `None` for an index outside this tree.
    pub fn node(&self, index: NodeIndex) -> Option<&TreeNode> {
        self.nodes.get(index.as_usize())
    }

    /// Returns the node, or [`Error::InvalidNode`] for an index outside this tree.
    pub fn try_node(&self, index: NodeIndex) -> Result<&TreeNode> {
        self.node(index).ok_or(Error::InvalidNode {
            index,
            len: self.nodes.len(),
        })
    }

    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        self.node(index).map(TreeNode::children).unwrap_or(&[])
    }

    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.node(index).and_then(|n| n.parent)
    }

    pub fn title(&self, index: NodeIndex) -> Option<&str> {
        self.node(index).map(|n| n.title.as_str())
    }

    /// The element wrapped by a leaf.
    pub fn element(&self, index: NodeIndex) -> Option<&Element> {
        self.node(index).and_then(TreeNode::element)
    }

    /// Leaf node holding the given element.
    pub fn node_for_element(&self, id: ElementId) -> Option<NodeIndex> {
        self.by_element.get(&id).copied()
    }

    /// Leaf node holding the element whose scene object is `object`.
    pub fn node_for_object(&self, object: ObjectId) -> Option<NodeIndex> {
        self.by_object.get(&object).copied()
    }

    /// Like [`node_for_element`](Self::node_for_element) but reports unknown ids.
    pub fn try_node_for_element(&self, id: ElementId) -> Result<NodeIndex> {
        self.node_for_element(id).ok_or(Error::UnknownElement(id))
    }

    /// Validates an index coming from a caller.
    ///
    /// Stale handles are a programming error: debug builds stop here, release
    /// builds get `None` and the query degrades to an empty result.
    pub(crate) fn checked(&self, index: NodeIndex) -> Option<&TreeNode> {
        let node = self.node(index);
        debug_assert!(
            node.is_some(),
            "node {index} does not belong to this tree ({} nodes)",
            self.nodes.len()
        );
        node
    }
}

impl Default for TreeIndex {
    fn default() -> Self {
        Self::empty()
    }
}
