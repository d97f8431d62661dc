// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Isolation commands.
//!
//! Every command takes the originating surface as a string: `"tree"`,
//! `"search"`, `"contextMenu"`, `"controlBar"` or `"keyboard"`.

use bim_shell_core::{ChangeSource, DocumentId, NodeIndex, ViewerSession};
use wasm_bindgen::prelude::*;

use super::ShellAPI;
use crate::error::ApiError;
use crate::scene::JsScene;
use crate::utils::to_object_ids;

fn source(name: &str) -> Result<ChangeSource, ApiError> {
    Ok(name.parse::<ChangeSource>()?)
}

#[wasm_bindgen]
impl ShellAPI {
    /// Show exactly `objects`, hide everything else.
    pub fn isolate(&self, objects: Vec<u32>, source_name: &str) -> Result<bool, JsValue> {
        let source = source(source_name)?;
        let objects = to_object_ids(&objects);
        Ok(self.shared.with(|s, scene| s.isolate(scene, objects, source))?)
    }

    /// Add `objects` to the visible set.
    pub fn show(&self, objects: Vec<u32>, source_name: &str) -> Result<bool, JsValue> {
        let source = source(source_name)?;
        let objects = to_object_ids(&objects);
        Ok(self.shared.with(|s, scene| s.show(scene, objects, source))?)
    }

    /// Remove `objects` from the visible set.
    pub fn hide(&self, objects: Vec<u32>, source_name: &str) -> Result<bool, JsValue> {
        let source = source(source_name)?;
        let objects = to_object_ids(&objects);
        Ok(self.shared.with(|s, scene| s.hide(scene, objects, source))?)
    }

    #[wasm_bindgen(js_name = isolateNode)]
    pub fn isolate_node(&self, index: u32, source_name: &str) -> Result<bool, JsValue> {
        self.on_node(index, source_name, |s, scene, node, source| {
            s.isolate_node(scene, node, source)
        })
    }

    #[wasm_bindgen(js_name = hideNode)]
    pub fn hide_node(&self, index: u32, source_name: &str) -> Result<bool, JsValue> {
        self.on_node(index, source_name, |s, scene, node, source| {
            s.hide_node(scene, node, source)
        })
    }

    #[wasm_bindgen(js_name = showNode)]
    pub fn show_node(&self, index: u32, source_name: &str) -> Result<bool, JsValue> {
        self.on_node(index, source_name, |s, scene, node, source| {
            s.show_node(scene, node, source)
        })
    }

    /// Toggle between the current isolation and none, restoring the
    /// previous one when nothing is isolated.
    #[wasm_bindgen(js_name = toggleIsolation)]
    pub fn toggle_isolation(&self, source_name: &str) -> Result<bool, JsValue> {
        let source = source(source_name)?;
        Ok(self.shared.with(|s, scene| s.toggle_isolation(scene, source))?)
    }

    #[wasm_bindgen(js_name = clearIsolation)]
    pub fn clear_isolation(&self, source_name: &str) -> Result<bool, JsValue> {
        let source = source(source_name)?;
        Ok(self.shared.with(|s, scene| s.clear_isolation(scene, source))?)
    }

    /// Limit isolation to one loaded document (the viewer's model index);
    /// `undefined` covers every document.
    #[wasm_bindgen(js_name = setScope)]
    pub fn set_scope(&self, document: Option<u32>) -> Result<(), JsValue> {
        Ok(self.shared.with(|s, _| s.set_scope(document.map(DocumentId)))?)
    }

    /// Isolated object ids, or `undefined` when nothing is isolated.
    pub fn isolated(&self) -> Result<Option<Vec<u32>>, JsValue> {
        Ok(self.shared.read(|s| {
            s.isolation().current().map(|set| {
                let mut ids: Vec<u32> = set.iter().map(|o| o.0).collect();
                ids.sort_unstable();
                ids
            })
        })?)
    }

    #[wasm_bindgen(js_name = anyIsolated)]
    pub fn any_isolated(&self) -> Result<bool, JsValue> {
        Ok(self.shared.read(|s| s.isolation().any())?)
    }
}

impl ShellAPI {
    fn on_node(
        &self,
        index: u32,
        source_name: &str,
        op: impl FnOnce(&mut ViewerSession, &mut JsScene, NodeIndex, ChangeSource) -> bool,
    ) -> Result<bool, JsValue> {
        let source = source(source_name)?;
        let changed = self.shared.with(|s, scene| {
            let node = NodeIndex(index);
            s.tree().try_node(node)?;
            Ok::<_, ApiError>(op(s, scene, node, source))
        })??;
        Ok(changed)
    }
}
