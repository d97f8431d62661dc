// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node handles for the flattened element tree.
//!
//! A [`NodeIndex`] is assigned by the depth-first flatten and is only
//! meaningful for the tree instance that produced it. Regrouping or
//! reloading creates a new instance with a new [`TreeGeneration`].

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Index of a node in a [`TreeIndex`](crate::TreeIndex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Parent value used by the JavaScript surface for top-level nodes.
    pub const ROOT_SENTINEL: i64 = -1;

    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn from_usize(i: usize) -> Self {
        NodeIndex(i as u32)
    }
}

impl std::fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Process-unique id of one tree build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeGeneration(u64);

impl TreeGeneration {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        TreeGeneration(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}
