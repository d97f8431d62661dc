// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tri-state visibility per tree node.
//!
//! Leaves mirror the visible flag of their scene object. A branch is
//! [`Visibility::Visible`] when every child is, [`Visibility::Hidden`] when
//! every child is, and [`Visibility::Mixed`] otherwise.
//!
//! The cache is recomputed only on [`VisibilityAggregator::update`], which
//! callers trigger from the viewer's visibility-changed event. Reads between
//! two updates may lag the render state.

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::keys::{NodeIndex, TreeGeneration};
use crate::tree::{NodeKind, TreeIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    Visible,
    Hidden,
    Mixed,
}

impl Visibility {
    pub fn from_flag(visible: bool) -> Self {
        if visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }

    /// Aggregate of two sibling states.
    pub fn combine(self, other: Visibility) -> Visibility {
        if self == other {
            self
        } else {
            Visibility::Mixed
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Visible => "visible",
            Visibility::Hidden => "hidden",
            Visibility::Mixed => "mixed",
        }
    }
}

/// Cached visibility for every node of one tree instance.
#[derive(Debug, Clone, Default)]
pub struct VisibilityAggregator {
    states: Vec<Visibility>,
    generation: Option<TreeGeneration>,
}

impl VisibilityAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes every node bottom-up.
    ///
    /// Flatten order puts children after their parent, so one reverse pass
    /// sees every child before its parent and computes each node once.
    pub fn update<F>(&mut self, tree: &TreeIndex, visible_of: F)
    where
        F: Fn(&Element) -> bool,
    {
        let mut states = vec![Visibility::Visible; tree.len()];
        for node in tree.nodes.iter().rev() {
            states[node.index.as_usize()] = match &node.kind {
                NodeKind::Leaf { element } => Visibility::from_flag(visible_of(element)),
                NodeKind::Branch { children } => children
                    .iter()
                    .map(|c| states[c.as_usize()])
                    .reduce(Visibility::combine)
                    .unwrap_or(Visibility::Visible),
            };
        }
        self.states = states;
        self.generation = Some(tree.generation());
    }

    /// Drops the cache, e.g. when the tree it was computed for is replaced.
    pub fn invalidate(&mut self) {
        self.states.clear();
        self.generation = None;
    }

    /// Whether the cache belongs to `tree`.
    pub fn is_fresh_for(&self, tree: &TreeIndex) -> bool {
        self.generation == Some(tree.generation())
    }

    /// Cached state of a node, `None` before the first update.
    pub fn get(&self, index: NodeIndex) -> Option<Visibility> {
        self.states.get(index.as_usize()).copied()
    }

    /// Cached state of a node of `tree`; `None` if the cache belongs to
    /// another tree instance.
    pub fn get_for(&self, tree: &TreeIndex, index: NodeIndex) -> Option<Visibility> {
        if self.is_fresh_for(tree) {
            self.get(index)
        } else {
            None
        }
    }
}
