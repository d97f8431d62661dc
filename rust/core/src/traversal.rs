// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structural queries over a [`TreeIndex`].
//!
//! Upward queries walk parent links (O(depth)); downward queries scan the
//! node's contiguous subtree run (O(subtree size)). None of them touch
//! anything outside the tree.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::element::{Element, ElementId, ObjectId};
use crate::keys::NodeIndex;
use crate::tree::{TreeIndex, TreeNode};

/// Ancestor chain of a node, innermost first.
pub type Ancestors = SmallVec<[NodeIndex; 4]>;

impl TreeIndex {
    /// The node itself, its parent, grandparent, ... up to the top-level node.
    ///
    /// The synthetic root is not included, so the length equals the node's
    /// depth plus one.
    pub fn ancestors(&self, index: NodeIndex) -> Ancestors {
        let mut chain = Ancestors::new();
        let Some(mut node) = self.checked(index) else {
            return chain;
        };
        loop {
            chain.push(node.index);
            match node.parent.and_then(|p| self.node(p)) {
                Some(parent) => node = parent,
                None => break,
            }
        }
        chain
    }

    /// All descendants of a node including itself, in depth-first order.
    pub fn subtree(&self, index: NodeIndex) -> &[TreeNode] {
        match self.checked(index) {
            Some(node) => &self.nodes[index.as_usize()..node.subtree_end.as_usize()],
            None => &[],
        }
    }

    /// Leaf descendants in depth-first order. A leaf returns itself.
    pub fn leafs(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.subtree(index)
            .iter()
            .filter(|n| n.is_leaf())
            .map(|n| n.index)
            .collect()
    }

    /// Elements of all leaf descendants, in depth-first order.
    pub fn leaf_elements(&self, index: NodeIndex) -> Vec<&Element> {
        self.subtree(index)
            .iter()
            .filter_map(TreeNode::element)
            .collect()
    }

    /// Scene objects of all leaf descendants, in depth-first order.
    pub fn leaf_objects(&self, index: NodeIndex) -> Vec<ObjectId> {
        self.subtree(index)
            .iter()
            .filter_map(|n| n.element().map(|e| e.object))
            .collect()
    }

    /// All node indices in `[min(a, b), max(a, b)]`.
    ///
    /// This is an index range, not a structural one: it matches what the
    /// user sees only when the tree between `a` and `b` is fully expanded.
    pub fn range(&self, a: NodeIndex, b: NodeIndex) -> Vec<NodeIndex> {
        if self.checked(a).is_none() || self.checked(b).is_none() {
            return Vec::new();
        }
        let (lo, hi) = if a <= b { (a.0, b.0) } else { (b.0, a.0) };
        (lo..=hi).map(NodeIndex).collect()
    }

    /// Nodes that must be expanded to reveal the given elements.
    ///
    /// Each element's leaf and its ancestors are collected once; shared
    /// ancestors are not repeated. The result is sorted by index. Unknown
    /// elements are skipped.
    pub fn selection_cover<I>(&self, ids: I) -> Vec<NodeIndex>
    where
        I: IntoIterator<Item = ElementId>,
    {
        self.cover_leaves(ids.into_iter().filter_map(|id| self.node_for_element(id)))
    }

    /// [`selection_cover`](Self::selection_cover) keyed by scene object.
    pub fn selection_cover_objects<I>(&self, objects: I) -> Vec<NodeIndex>
    where
        I: IntoIterator<Item = ObjectId>,
    {
        self.cover_leaves(objects.into_iter().filter_map(|o| self.node_for_object(o)))
    }

    fn cover_leaves(&self, leaves: impl Iterator<Item = NodeIndex>) -> Vec<NodeIndex> {
        let mut seen: FxHashSet<NodeIndex> = FxHashSet::default();
        let mut cover = Vec::new();
        for leaf in leaves {
            let mut current = Some(leaf);
            while let Some(index) = current {
                // Everything above an already visited node is visited too.
                if !seen.insert(index) {
                    break;
                }
                cover.push(index);
                current = self.parent(index);
            }
        }
        cover.sort_unstable();
        cover
    }

    /// Whether `ancestor` lies on the parent chain of `index` (or is it).
    pub fn is_ancestor(&self, ancestor: NodeIndex, index: NodeIndex) -> bool {
        match (self.node(ancestor), self.node(index)) {
            (Some(a), Some(_)) => ancestor <= index && index < a.subtree_end,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::{GroupKey, TreeBuilder};
    use crate::testing::sample_elements;

    fn tree() -> TreeIndex {
        TreeBuilder::new()
            .group_by_all(GroupKey::standard())
            .build(&sample_elements())
            .unwrap()
    }

    #[test]
    fn ancestors_end_at_top_level() {
        let tree = tree();
        for node in tree.nodes() {
            let chain = tree.ancestors(node.index);
            assert_eq!(chain[0], node.index);
            assert_eq!(chain.len(), node.depth as usize + 1);
            let last = *chain.last().unwrap();
            assert_eq!(tree.node(last).unwrap().parent, None);
        }
    }

    #[test]
    fn leaf_is_its_own_leaf_set() {
        let tree = tree();
        let leaf = tree.node_for_element(ElementId(4)).unwrap();
        assert_eq!(tree.leafs(leaf), vec![leaf]);
        assert_eq!(tree.leaf_objects(leaf), vec![ObjectId(4)]);
    }

    #[test]
    fn branch_leaves_are_union_of_children() {
        let tree = tree();
        for node in tree.nodes().filter(|n| !n.is_leaf()) {
            let leaves = tree.leafs(node.index);
            assert!(!leaves.is_empty());
            let from_children: Vec<NodeIndex> = node
                .children()
                .iter()
                .flat_map(|&c| tree.leafs(c))
                .collect();
            assert_eq!(leaves, from_children);
        }
    }

    #[test]
    fn top_level_leaves_cover_every_element() {
        let tree = tree();
        let total: usize = tree.roots().iter().map(|&r| tree.leafs(r).len()).sum();
        assert_eq!(total, sample_elements().len());
    }

    #[test]
    fn range_is_order_independent() {
        let tree = tree();
        let forward = tree.range(NodeIndex(2), NodeIndex(5));
        let backward = tree.range(NodeIndex(5), NodeIndex(2));
        assert_eq!(forward, backward);
        assert_eq!(forward, vec![NodeIndex(2), NodeIndex(3), NodeIndex(4), NodeIndex(5)]);
        assert_eq!(tree.range(NodeIndex(3), NodeIndex(3)), vec![NodeIndex(3)]);
    }

    #[test]
    fn cover_shares_ancestors() {
        let tree = tree();
        // Elements 1 and 2 share category, family and type.
        let cover = tree.selection_cover([ElementId(1), ElementId(2)]);
        let a1 = tree.ancestors(tree.node_for_element(ElementId(1)).unwrap());
        let a2 = tree.ancestors(tree.node_for_element(ElementId(2)).unwrap());
        assert_eq!(&a1[1..], &a2[1..]);
        // Two leaves plus one shared chain of three branches.
        assert_eq!(cover.len(), 5);
        let unique: FxHashSet<_> = cover.iter().collect();
        assert_eq!(unique.len(), cover.len());
    }

    #[test]
    fn cover_skips_unknown_elements() {
        let tree = tree();
        assert!(tree.selection_cover([ElementId(404)]).is_empty());
        let by_object = tree.selection_cover_objects([ObjectId(5)]);
        assert_eq!(by_object.len(), 4);
    }

    #[test]
    fn ancestry_check() {
        let tree = tree();
        let leaf = tree.node_for_element(ElementId(3)).unwrap();
        let top = *tree.ancestors(leaf).last().unwrap();
        assert!(tree.is_ancestor(top, leaf));
        assert!(tree.is_ancestor(leaf, leaf));
        assert!(!tree.is_ancestor(leaf, top));
    }
}
