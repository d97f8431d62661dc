// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tree queries and the viewer-to-tree event entry points.

use bim_shell_core::{ClickOutcome, Element, ElementId, Modifiers, NodeIndex, ObjectId, TreeIndex};
use rustc_hash::FxHashSet;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use super::ShellAPI;
use crate::error::ApiError;
use crate::utils::to_object_ids;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeJs<'a> {
    index: u32,
    /// `-1` for top-level nodes.
    parent: i64,
    depth: u32,
    title: &'a str,
    is_leaf: bool,
    children: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    element: Option<&'a Element>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visibility: Option<&'static str>,
}

#[derive(Serialize)]
struct ClickJs {
    kind: &'static str,
    objects: Vec<u32>,
}

fn raw(nodes: impl IntoIterator<Item = NodeIndex>) -> Vec<u32> {
    nodes.into_iter().map(|n| n.0).collect()
}

fn checked(tree: &TreeIndex, index: u32) -> Result<NodeIndex, ApiError> {
    let node = NodeIndex(index);
    tree.try_node(node)?;
    Ok(node)
}

#[wasm_bindgen]
impl ShellAPI {
    /// Top-level node indices in display order.
    pub fn roots(&self) -> Result<Vec<u32>, JsValue> {
        Ok(self.shared.read(|s| raw(s.tree().roots().iter().copied()))?)
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> Result<usize, JsValue> {
        Ok(self.shared.read(|s| s.tree().len())?)
    }

    pub fn levels(&self) -> Result<usize, JsValue> {
        Ok(self.shared.read(|s| s.tree().levels())?)
    }

    /// Node as `{ index, parent, depth, title, isLeaf, children, element?, visibility? }`.
    pub fn node(&self, index: u32) -> Result<JsValue, JsValue> {
        let value = self.shared.read(|s| {
            let tree = s.tree();
            let node = tree.try_node(NodeIndex(index))?;
            let js = NodeJs {
                index,
                parent: node.parent_raw(),
                depth: node.depth,
                title: &node.title,
                is_leaf: node.is_leaf(),
                children: raw(node.children().iter().copied()),
                element: node.element(),
                visibility: s.visibility(node.index).map(|v| v.as_str()),
            };
            serde_wasm_bindgen::to_value(&js).map_err(ApiError::from)
        })?;
        Ok(value?)
    }

    pub fn children(&self, index: u32) -> Result<Vec<u32>, JsValue> {
        let children = self.shared.read(|s| {
            let node = checked(s.tree(), index)?;
            Ok::<_, ApiError>(raw(s.tree().children(node).iter().copied()))
        })?;
        Ok(children?)
    }

    /// Ancestors nearest first.
    pub fn ancestors(&self, index: u32) -> Result<Vec<u32>, JsValue> {
        let ancestors = self.shared.read(|s| {
            let node = checked(s.tree(), index)?;
            Ok::<_, ApiError>(raw(s.tree().ancestors(node)))
        })?;
        Ok(ancestors?)
    }

    /// Leaf node indices under `index`.
    pub fn leafs(&self, index: u32) -> Result<Vec<u32>, JsValue> {
        let leafs = self.shared.read(|s| {
            let node = checked(s.tree(), index)?;
            Ok::<_, ApiError>(raw(s.tree().leafs(node)))
        })?;
        Ok(leafs?)
    }

    /// Viewer object ids under `index`.
    #[wasm_bindgen(js_name = leafObjects)]
    pub fn leaf_objects(&self, index: u32) -> Result<Vec<u32>, JsValue> {
        let objects = self.shared.read(|s| {
            let node = checked(s.tree(), index)?;
            Ok::<_, ApiError>(s.tree().leaf_objects(node).into_iter().map(|o| o.0).collect())
        })?;
        Ok(objects?)
    }

    /// Nodes from `a` to `b` inclusive, in flatten order.
    pub fn range(&self, a: u32, b: u32) -> Result<Vec<u32>, JsValue> {
        let nodes = self.shared.read(|s| {
            let a = checked(s.tree(), a)?;
            let b = checked(s.tree(), b)?;
            Ok::<_, ApiError>(raw(s.tree().range(a, b)))
        })?;
        Ok(nodes?)
    }

    /// Leaf nodes of the given element ids plus their ancestor chains, each
    /// node once: the nodes to expand so the elements show in the tree.
    #[wasm_bindgen(js_name = selectionCover)]
    pub fn selection_cover(&self, elements: Vec<u32>) -> Result<Vec<u32>, JsValue> {
        Ok(self
            .shared
            .read(|s| raw(s.tree().selection_cover(elements.into_iter().map(ElementId))))?)
    }

    #[wasm_bindgen(js_name = nodeForElement)]
    pub fn node_for_element(&self, element: u32) -> Result<Option<u32>, JsValue> {
        Ok(self
            .shared
            .read(|s| s.tree().node_for_element(ElementId(element)).map(|n| n.0))?)
    }

    #[wasm_bindgen(js_name = nodeForObject)]
    pub fn node_for_object(&self, object: u32) -> Result<Option<u32>, JsValue> {
        Ok(self
            .shared
            .read(|s| s.tree().node_for_object(ObjectId(object)).map(|n| n.0))?)
    }

    /// `"visible"`, `"hidden"`, `"mixed"`, or `undefined` for a stale index.
    pub fn visibility(&self, index: u32) -> Result<Option<String>, JsValue> {
        Ok(self
            .shared
            .read(|s| s.visibility(NodeIndex(index)).map(|v| v.as_str().to_string()))?)
    }

    /// Call when the viewer reports a visibility change.
    #[wasm_bindgen(js_name = onVisibilityChanged)]
    pub fn on_visibility_changed(&self) -> Result<(), JsValue> {
        Ok(self.shared.with(|s, scene| s.on_visibility_changed(scene))?)
    }

    /// Call when the viewer selection changes. Returns nodes to expand.
    #[wasm_bindgen(js_name = onSelectionChanged)]
    pub fn on_selection_changed(&self) -> Result<Vec<u32>, JsValue> {
        Ok(self.shared.with(|s, scene| raw(s.on_selection_changed(scene)))?)
    }

    /// Handle a click on a tree node.
    ///
    /// Returns `{ kind: "select" | "add" | "remove" | "frame", objects }`; the viewer has
    /// already been updated.
    pub fn click(&self, index: u32, toggle: bool, range: bool) -> Result<JsValue, JsValue> {
        let now = crate::utils::now_ms();
        let modifiers = Modifiers { toggle, range };
        let outcome = self.shared.with(|s, scene| {
            let node = checked(s.tree(), index)?;
            Ok::<_, ApiError>(s.click(scene, node, modifiers, now))
        })??;
        let (kind, objects) = match outcome {
            ClickOutcome::Select(objects) => ("select", objects),
            ClickOutcome::Add(objects) => ("add", objects),
            ClickOutcome::Remove(objects) => ("remove", objects),
            ClickOutcome::Frame(objects) => ("frame", objects),
        };
        let js = ClickJs {
            kind,
            objects: objects.into_iter().map(|o| o.0).collect(),
        };
        Ok(serde_wasm_bindgen::to_value(&js).map_err(ApiError::from)?)
    }

    /// Whether every object under `index` is in `selection`.
    #[wasm_bindgen(js_name = isNodeSelected)]
    pub fn is_node_selected(&self, index: u32, selection: Vec<u32>) -> Result<bool, JsValue> {
        let selection: FxHashSet<ObjectId> = to_object_ids(&selection).into_iter().collect();
        let selected = self.shared.read(|s| {
            let node = checked(s.tree(), index)?;
            let selected = bim_shell_core::selection::is_node_selected(s.tree(), node, &selection);
            Ok::<_, ApiError>(selected)
        })?;
        Ok(selected?)
    }
}
