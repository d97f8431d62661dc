// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BIM-Shell Core
//!
//! Element tree, visibility, selection and isolation state for the panels
//! that sit on top of a WebGL BIM viewer.
//!
//! ## Overview
//!
//! - **Grouping**: [`TreeBuilder`] turns a flat element list into a
//!   category → family → type tree and flattens it into a [`TreeIndex`]
//! - **Queries**: ancestors, leaves, index ranges and selection covers on
//!   [`TreeIndex`]
//! - **Visibility**: [`VisibilityAggregator`] caches a tri-state
//!   [`Visibility`] per node
//! - **Selection**: [`selection`] maps tree clicks to scene selections and back
//! - **Isolation**: [`IsolationController`] owns the session's isolated set
//! - **Search**: [`SearchFilter`] debounces the search box
//!
//! The viewer engine is reached only through the [`Scene`] trait.
//! [`ViewerSession`] bundles everything for one loaded document.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use bim_shell_core::{
//!     ChangeSource, DocumentId, Element, ElementId, InMemoryScene, ObjectId, ShellConfig,
//!     ViewerSession, Visibility,
//! };
//!
//! let elements: Arc<[Element]> = vec![
//!     Element {
//!         id: ElementId(1),
//!         name: "Wall".into(),
//!         category: "Walls".into(),
//!         family: "Basic Wall".into(),
//!         family_type: "200mm".into(),
//!         object: ObjectId(1),
//!         document: DocumentId(0),
//!     },
//!     Element {
//!         id: ElementId(2),
//!         name: "Door".into(),
//!         category: "Doors".into(),
//!         family: "Single".into(),
//!         family_type: "900".into(),
//!         object: ObjectId(2),
//!         document: DocumentId(0),
//!     },
//! ]
//! .into();
//!
//! let mut scene = InMemoryScene::new();
//! scene.insert(ObjectId(1), DocumentId(0), None);
//! scene.insert(ObjectId(2), DocumentId(0), None);
//!
//! let mut session = ViewerSession::new(ShellConfig::default());
//! session.set_elements(elements).unwrap();
//!
//! let doors = session.tree().roots()[0];
//! session.isolate_node(&mut scene, doors, ChangeSource::Tree);
//! assert_eq!(session.visibility(doors), Some(Visibility::Visible));
//! assert_eq!(scene.visible_objects(), vec![ObjectId(2)]);
//! ```

pub mod config;
pub mod element;
pub mod error;
pub mod grouping;
pub mod isolation;
pub mod keys;
pub mod ordering;
pub mod request;
pub mod scene;
pub mod search;
pub mod selection;
pub mod session;
pub mod source;
pub mod traversal;
pub mod tree;
pub mod visibility;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ShellConfig;
pub use element::{Attribute, DocumentId, Element, ElementId, ObjectId};
pub use error::{Error, Result};
pub use grouping::{GroupKey, TreeBuilder};
pub use isolation::{IsolationChange, IsolationController, IsolationOptions, SubscriptionId};
pub use keys::{NodeIndex, TreeGeneration};
pub use request::{RequestGuard, RequestTicket};
pub use scene::{Bounds, InMemoryScene, MaterialOverride, Scene};
pub use search::SearchFilter;
pub use selection::{ClickOutcome, ClickTracker, Modifiers};
pub use session::ViewerSession;
pub use source::ChangeSource;
pub use traversal::Ancestors;
pub use tree::{NodeKind, TreeIndex, TreeNode};
pub use visibility::{Visibility, VisibilityAggregator};
