// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grouping of flat element lists into a multi-level tree.
//!
//! A build runs in four passes:
//!
//! 1. all elements start in one synthetic root bucket;
//! 2. each [`GroupKey`] in turn splits every element bucket into keyed
//!    sub-buckets, giving a map-of-maps as deep as the key list;
//! 3. every level is sorted once (group titles by [`KeyOrder`], leaf
//!    elements by the leaf order);
//! 4. the nested buckets are flattened depth-first into a [`TreeIndex`].
//!
//! No partially built tree is ever observable: [`TreeBuilder::build`]
//! returns the finished index or an error.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::element::{Attribute, Element};
use crate::error::{Error, Result};
use crate::keys::{NodeIndex, TreeGeneration};
use crate::ordering::{natural_cmp, KeyOrder};
use crate::tree::{NodeKind, TreeIndex, TreeNode};

/// Title used for elements whose selector returned an empty string.
pub const DEFAULT_EMPTY_TITLE: &str = "Unspecified";

type Selector = Arc<dyn Fn(&Element) -> String + Send + Sync>;

/// Comparator for elements within one leaf group.
pub type LeafOrder = Arc<dyn Fn(&Element, &Element) -> Ordering + Send + Sync>;

/// One level of grouping: a named function from element to group key.
#[derive(Clone)]
pub struct GroupKey {
    name: Cow<'static, str>,
    select: Selector,
}

impl GroupKey {
    /// Groups by an arbitrary function of the element.
    pub fn custom<F>(name: impl Into<String>, select: F) -> Self
    where
        F: Fn(&Element) -> String + Send + Sync + 'static,
    {
        Self {
            name: Cow::Owned(name.into()),
            select: Arc::new(select),
        }
    }

    /// Groups by one element attribute.
    pub fn attribute(attribute: Attribute) -> Self {
        Self {
            name: Cow::Borrowed(attribute.as_str()),
            select: Arc::new(move |e: &Element| e.attribute(attribute).into_owned()),
        }
    }

    pub fn category() -> Self {
        Self::attribute(Attribute::Category)
    }

    pub fn family() -> Self {
        Self::attribute(Attribute::Family)
    }

    pub fn family_type() -> Self {
        Self::attribute(Attribute::FamilyType)
    }

    /// The standard category → family → type hierarchy.
    pub fn standard() -> Vec<GroupKey> {
        vec![Self::category(), Self::family(), Self::family_type()]
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluates the selector on one element.
    pub fn key_of(&self, element: &Element) -> String {
        (self.select)(element)
    }
}

impl std::fmt::Debug for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupKey").field("name", &self.name).finish()
    }
}

/// Default leaf order: natural order of the name, then id.
pub fn name_then_id(a: &Element, b: &Element) -> Ordering {
    natural_cmp(&a.name, &b.name).then_with(|| a.id.cmp(&b.id))
}

/// Builder for [`TreeIndex`].
///
/// # Example
///
/// ```
/// use bim_shell_core::{Element, ElementId, GroupKey, ObjectId, TreeBuilder};
///
/// let wall = Element {
///     id: ElementId(1),
///     name: "Wall".into(),
///     category: "Walls".into(),
///     family: "Basic Wall".into(),
///     family_type: "200mm".into(),
///     object: ObjectId(1),
///     document: Default::default(),
/// };
///
/// let tree = TreeBuilder::new()
///     .group_by(GroupKey::category())
///     .group_by(GroupKey::family())
///     .build(&[wall])
///     .unwrap();
///
/// // Walls > Basic Wall > Wall [1]
/// assert_eq!(tree.len(), 3);
/// ```
#[derive(Clone)]
pub struct TreeBuilder {
    keys: Vec<GroupKey>,
    order: KeyOrder,
    leaf_order: LeafOrder,
    empty_title: String,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            order: KeyOrder::default(),
            leaf_order: Arc::new(name_then_id),
            empty_title: DEFAULT_EMPTY_TITLE.to_string(),
        }
    }

    /// Appends one grouping level.
    pub fn group_by(mut self, key: GroupKey) -> Self {
        self.keys.push(key);
        self
    }

    /// Appends several grouping levels.
    pub fn group_by_all(mut self, keys: impl IntoIterator<Item = GroupKey>) -> Self {
        self.keys.extend(keys);
        self
    }

    /// Group titles that sort before all others, in the given order.
    pub fn priority<I, S>(mut self, priority: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order = KeyOrder::new(priority);
        self
    }

    /// Replaces the comparator used for elements within one group.
    pub fn leaf_order<F>(mut self, order: F) -> Self
    where
        F: Fn(&Element, &Element) -> Ordering + Send + Sync + 'static,
    {
        self.leaf_order = Arc::new(order);
        self
    }

    /// Title for groups whose key is empty.
    pub fn empty_title(mut self, title: impl Into<String>) -> Self {
        self.empty_title = title.into();
        self
    }

    pub fn keys(&self) -> &[GroupKey] {
        &self.keys
    }

    /// Groups, sorts and flattens `elements`.
    pub fn build(&self, elements: &[Element]) -> Result<TreeIndex> {
        if self.keys.is_empty() {
            return Err(Error::NoGroupKeys);
        }

        let mut root = Bucket::Elements(elements.iter().collect());
        for key in &self.keys {
            root = root.partition(key, &self.empty_title);
        }
        root.sort(&self.order, self.leaf_order.as_ref());

        let mut flat = Flattener {
            nodes: Vec::with_capacity(elements.len() * 2),
            by_element: FxHashMap::default(),
            by_object: FxHashMap::default(),
        };
        let roots = match root {
            Bucket::Groups(groups) => {
                let mut roots = Vec::with_capacity(groups.len());
                for (title, bucket) in groups {
                    roots.push(flat.branch(title, bucket, None, 0)?);
                }
                roots
            }
            // Unreachable with at least one key: the first partition always
            // turns the root into groups.
            Bucket::Elements(_) => Vec::new(),
        };

        tracing::debug!(
            elements = elements.len(),
            nodes = flat.nodes.len(),
            levels = self.keys.len(),
            "element tree built"
        );

        Ok(TreeIndex {
            nodes: flat.nodes,
            roots,
            by_element: flat.by_element,
            by_object: flat.by_object,
            generation: TreeGeneration::next(),
            levels: self.keys.len(),
        })
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TreeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeBuilder")
            .field("keys", &self.keys)
            .field("order", &self.order)
            .field("empty_title", &self.empty_title)
            .finish()
    }
}

/// Intermediate map-of-maps. Groups keep first-seen order until sorted.
enum Bucket<'a> {
    Elements(Vec<&'a Element>),
    Groups(Vec<(String, Bucket<'a>)>),
}

impl<'a> Bucket<'a> {
    fn partition(self, key: &GroupKey, empty_title: &str) -> Bucket<'a> {
        match self {
            Bucket::Elements(elements) => {
                let mut slots: FxHashMap<String, usize> = FxHashMap::default();
                let mut groups: Vec<(String, Vec<&'a Element>)> = Vec::new();
                for element in elements {
                    let mut title = key.key_of(element);
                    if title.trim().is_empty() {
                        title = empty_title.to_string();
                    }
                    match slots.get(&title) {
                        Some(&slot) => groups[slot].1.push(element),
                        None => {
                            slots.insert(title.clone(), groups.len());
                            groups.push((title, vec![element]));
                        }
                    }
                }
                Bucket::Groups(
                    groups
                        .into_iter()
                        .map(|(title, elements)| (title, Bucket::Elements(elements)))
                        .collect(),
                )
            }
            Bucket::Groups(groups) => Bucket::Groups(
                groups
                    .into_iter()
                    .map(|(title, bucket)| (title, bucket.partition(key, empty_title)))
                    .collect(),
            ),
        }
    }

    fn sort(
        &mut self,
        order: &KeyOrder,
        leaf_order: &(dyn Fn(&Element, &Element) -> Ordering + Send + Sync),
    ) {
        match self {
            Bucket::Elements(elements) => elements.sort_by(|a, b| leaf_order(*a, *b)),
            Bucket::Groups(groups) => {
                groups.sort_by(|(a, _), (b, _)| order.compare(a, b));
                for (_, bucket) in groups.iter_mut() {
                    bucket.sort(order, leaf_order);
                }
            }
        }
    }
}

struct Flattener {
    nodes: Vec<TreeNode>,
    by_element: FxHashMap<crate::ElementId, NodeIndex>,
    by_object: FxHashMap<crate::ObjectId, NodeIndex>,
}

impl Flattener {
    fn push(
        &mut self,
        parent: Option<NodeIndex>,
        depth: u32,
        title: String,
        kind: NodeKind,
    ) -> NodeIndex {
        let index = NodeIndex::from_usize(self.nodes.len());
        self.nodes.push(TreeNode {
            index,
            parent,
            depth,
            title,
            kind,
            subtree_end: NodeIndex(index.0 + 1),
        });
        index
    }

    fn branch(
        &mut self,
        title: String,
        bucket: Bucket<'_>,
        parent: Option<NodeIndex>,
        depth: u32,
    ) -> Result<NodeIndex> {
        let index = self.push(parent, depth, title, NodeKind::Branch { children: Vec::new() });

        let mut children = Vec::new();
        match bucket {
            Bucket::Groups(groups) => {
                children.reserve(groups.len());
                for (title, child) in groups {
                    children.push(self.branch(title, child, Some(index), depth + 1)?);
                }
            }
            Bucket::Elements(elements) => {
                children.reserve(elements.len());
                for element in elements {
                    children.push(self.leaf(element, index, depth + 1)?);
                }
            }
        }

        let end = NodeIndex::from_usize(self.nodes.len());
        let node = &mut self.nodes[index.as_usize()];
        node.subtree_end = end;
        node.kind = NodeKind::Branch { children };
        Ok(index)
    }

    fn leaf(&mut self, element: &Element, parent: NodeIndex, depth: u32) -> Result<NodeIndex> {
        if self.by_element.contains_key(&element.id) {
            return Err(Error::DuplicateElement(element.id));
        }
        if self.by_object.contains_key(&element.object) {
            return Err(Error::DuplicateObject(element.object));
        }
        let index = self.push(
            Some(parent),
            depth,
            element.label(),
            NodeKind::Leaf {
                element: element.clone(),
            },
        );
        self.by_element.insert(element.id, index);
        self.by_object.insert(element.object, index);
        Ok(index)
    }
}
