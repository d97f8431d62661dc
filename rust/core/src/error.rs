// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for tree and session operations.

use crate::element::{ElementId, ObjectId};
use crate::keys::NodeIndex;

/// Result type alias for shell operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying an element tree.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A node index from a different (or discarded) tree instance.
    #[error("node {index} is not part of this tree ({len} nodes)")]
    InvalidNode { index: NodeIndex, len: usize },

    /// An element that is not a leaf of the current tree.
    #[error("element {0} is not part of this tree")]
    UnknownElement(ElementId),

    /// A tree needs at least one grouping level.
    #[error("tree builder needs at least one group key")]
    NoGroupKeys,

    /// The same element id appeared twice in the input list.
    #[error("duplicate element id {0}")]
    DuplicateElement(ElementId),

    /// Two elements point at the same scene object.
    #[error("scene object {0} is referenced by more than one element")]
    DuplicateObject(ObjectId),

    /// Settings could not be decoded.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Unknown change-source tag.
    #[error("unknown change source: {0:?}")]
    UnknownSource(String),
}
