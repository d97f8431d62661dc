// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Translation between tree nodes and scene selections.
//!
//! Scene selection is always leaf level: clicking a group selects the
//! objects of every element below it, never the group itself. The reverse
//! direction turns a scene selection into the set of nodes that must be
//! expanded to show it.

use rustc_hash::FxHashSet;

use crate::element::{Element, ObjectId};
use crate::keys::NodeIndex;
use crate::tree::TreeIndex;

/// Default window for two clicks on the same node to count as a double click.
pub const DOUBLE_CLICK_MS: f64 = 200.0;

/// Leaf elements under a node.
pub fn expand(tree: &TreeIndex, node: NodeIndex) -> Vec<&Element> {
    tree.leaf_elements(node)
}

/// Scene objects of the leaf elements under a node.
pub fn expand_objects(tree: &TreeIndex, node: NodeIndex) -> Vec<ObjectId> {
    tree.leaf_objects(node)
}

/// Scene objects under several nodes, without duplicates, in first-seen order.
pub fn expand_all<I>(tree: &TreeIndex, nodes: I) -> Vec<ObjectId>
where
    I: IntoIterator<Item = NodeIndex>,
{
    let mut seen = FxHashSet::default();
    let mut objects = Vec::new();
    for node in nodes {
        for object in tree.leaf_objects(node) {
            if seen.insert(object) {
                objects.push(object);
            }
        }
    }
    objects
}

/// Nodes to expand so that every selected object is visible in the tree.
pub fn collapse(tree: &TreeIndex, objects: &[ObjectId]) -> Vec<NodeIndex> {
    tree.selection_cover_objects(objects.iter().copied())
}

/// A node is selected when every object below it is.
pub fn is_node_selected(
    tree: &TreeIndex,
    node: NodeIndex,
    selection: &FxHashSet<ObjectId>,
) -> bool {
    let objects = tree.leaf_objects(node);
    !objects.is_empty() && objects.iter().all(|o| selection.contains(o))
}

/// Keyboard modifiers held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Ctrl on Windows/Linux, Cmd on macOS.
    pub toggle: bool,
    /// Shift.
    pub range: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        toggle: false,
        range: false,
    };
    pub const TOGGLE: Modifiers = Modifiers {
        toggle: true,
        range: false,
    };
    pub const RANGE: Modifiers = Modifiers {
        toggle: false,
        range: true,
    };
}

/// What a click on a tree node asks the viewer to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Replace the viewer selection with these objects.
    Select(Vec<ObjectId>),
    /// Add these objects to the viewer selection.
    Add(Vec<ObjectId>),
    /// Remove these objects from the viewer selection.
    Remove(Vec<ObjectId>),
    /// Double click: frame the camera on these objects, selection unchanged.
    Frame(Vec<ObjectId>),
}

/// Click gesture state: focus anchor and last click for double-click
/// detection.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    anchor: Option<NodeIndex>,
    last: Option<(NodeIndex, f64)>,
    double_click_ms: f64,
}

impl ClickTracker {
    pub fn new(double_click_ms: f64) -> Self {
        Self {
            anchor: None,
            last: None,
            double_click_ms,
        }
    }

    /// Most recently clicked node.
    pub fn anchor(&self) -> Option<NodeIndex> {
        self.anchor
    }

    /// Forgets the anchor, e.g. after the tree was rebuilt.
    pub fn reset(&mut self) {
        self.anchor = None;
        self.last = None;
    }

    /// Applies the click-modifier selection algebra.
    ///
    /// - plain click: the node's objects;
    /// - toggle on a selected node: remove the node's objects;
    /// - toggle on an unselected node: add the node's objects not yet selected;
    /// - range: the objects of every node between the anchor and this node.
    ///
    /// A second click on the same node within the double-click window frames
    /// the camera instead.
    pub fn click(
        &mut self,
        tree: &TreeIndex,
        node: NodeIndex,
        modifiers: Modifiers,
        now_ms: f64,
        selection: &[ObjectId],
    ) -> ClickOutcome {
        if let Some((last, at)) = self.last {
            if last == node && now_ms - at <= self.double_click_ms {
                self.last = None;
                self.anchor = Some(node);
                return ClickOutcome::Frame(expand_objects(tree, node));
            }
        }
        self.last = Some((node, now_ms));
        let anchor = self.anchor.replace(node);

        if modifiers.range {
            let from = anchor.filter(|&a| tree.contains(a)).unwrap_or(node);
            return ClickOutcome::Select(expand_all(tree, tree.range(from, node)));
        }
        if modifiers.toggle {
            let current: FxHashSet<ObjectId> = selection.iter().copied().collect();
            let own = expand_objects(tree, node);
            if is_node_selected(tree, node, &current) {
                return ClickOutcome::Remove(own);
            }
            return ClickOutcome::Add(own.into_iter().filter(|o| !current.contains(o)).collect());
        }
        ClickOutcome::Select(expand_objects(tree, node))
    }
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(DOUBLE_CLICK_MS)
    }
}
