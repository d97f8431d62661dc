// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! [`Scene`] backed by a JavaScript viewer object.
//!
//! The viewer is duck-typed: any object exposing the methods below works.
//!
//! ```javascript
//! {
//!   getAllObjects(scope) -> number[],
//!   hasObject(id) -> boolean,
//!   isVisible(id) -> boolean,
//!   setVisible(id, visible),
//!   getSelection() -> number[],
//!   select(ids), addToSelection(ids), removeFromSelection(ids), clearSelection(),
//!   setMaterialOverride(name | null),
//!   getBoundingBox(id) -> [minX, minY, minZ, maxX, maxY, maxZ] | undefined,
//!   frame([minX, minY, minZ, maxX, maxY, maxZ]),
//! }
//! ```
//!
//! Missing methods and thrown exceptions degrade to "nothing": an empty list,
//! `false`, or no effect. Failures are reported on the console.

use bim_shell_core::{Bounds, DocumentId, MaterialOverride, ObjectId, Scene};
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::utils::{ids_from_js, ids_to_js, warn};

pub(crate) struct JsScene {
    viewer: JsValue,
}

impl JsScene {
    pub(crate) fn new(viewer: JsValue) -> Self {
        Self { viewer }
    }

    fn call(&self, name: &str, args: &[JsValue]) -> Option<JsValue> {
        let method = Reflect::get(&self.viewer, &JsValue::from_str(name))
            .ok()
            .and_then(|m| m.dyn_into::<Function>().ok());
        let Some(method) = method else {
            warn(&format!("viewer.{name} is not a function"));
            return None;
        };
        let argv: Array = args.iter().collect();
        match method.apply(&self.viewer, &argv) {
            Ok(value) => Some(value),
            Err(err) => {
                web_sys::console::warn_2(&JsValue::from_str(&format!("viewer.{name} threw")), &err);
                None
            }
        }
    }

    fn call_bool(&self, name: &str, args: &[JsValue]) -> bool {
        self.call(name, args).is_some_and(|v| v.is_truthy())
    }
}

fn id(object: ObjectId) -> JsValue {
    JsValue::from_f64(f64::from(object.0))
}

fn bounds_to_js(bounds: &Bounds) -> JsValue {
    let values = [
        bounds.min.x,
        bounds.min.y,
        bounds.min.z,
        bounds.max.x,
        bounds.max.y,
        bounds.max.z,
    ];
    values.iter().map(|&v| JsValue::from_f64(v)).collect::<Array>().into()
}

fn bounds_from_js(value: &JsValue) -> Option<Bounds> {
    if !Array::is_array(value) {
        return None;
    }
    let values: Vec<f64> = Array::from(value).iter().filter_map(|v| v.as_f64()).collect();
    let [min_x, min_y, min_z, max_x, max_y, max_z]: [f64; 6] = values.try_into().ok()?;
    Some(Bounds::new(
        [min_x, min_y, min_z].into(),
        [max_x, max_y, max_z].into(),
    ))
}

impl Scene for JsScene {
    fn all_objects(&self, scope: Option<DocumentId>) -> Vec<ObjectId> {
        let scope = scope.map_or(JsValue::UNDEFINED, |d| JsValue::from_f64(f64::from(d.0)));
        self.call("getAllObjects", &[scope])
            .map(|v| ids_from_js(&v))
            .unwrap_or_default()
    }

    fn contains(&self, object: ObjectId) -> bool {
        self.call_bool("hasObject", &[id(object)])
    }

    fn is_visible(&self, object: ObjectId) -> bool {
        self.call_bool("isVisible", &[id(object)])
    }

    fn set_visible(&mut self, object: ObjectId, visible: bool) {
        self.call("setVisible", &[id(object), JsValue::from_bool(visible)]);
    }

    fn selection(&self) -> Vec<ObjectId> {
        self.call("getSelection", &[])
            .map(|v| ids_from_js(&v))
            .unwrap_or_default()
    }

    fn select(&mut self, objects: &[ObjectId]) {
        self.call("select", &[ids_to_js(objects)]);
    }

    fn add_to_selection(&mut self, objects: &[ObjectId]) {
        self.call("addToSelection", &[ids_to_js(objects)]);
    }

    fn remove_from_selection(&mut self, objects: &[ObjectId]) {
        self.call("removeFromSelection", &[ids_to_js(objects)]);
    }

    fn clear_selection(&mut self) {
        self.call("clearSelection", &[]);
    }

    fn set_material_override(&mut self, material: Option<MaterialOverride>) {
        let name = match material {
            Some(MaterialOverride::Ghost) => JsValue::from_str("ghost"),
            None => JsValue::NULL,
        };
        self.call("setMaterialOverride", &[name]);
    }

    fn bounding_box(&self, object: ObjectId) -> Option<Bounds> {
        self.call("getBoundingBox", &[id(object)])
            .and_then(|v| bounds_from_js(&v))
    }

    fn frame(&mut self, bounds: Bounds) {
        self.call("frame", &[bounds_to_js(&bounds)]);
    }
}
