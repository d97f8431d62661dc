// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use bim_shell_core::ObjectId;
use wasm_bindgen::prelude::*;

/// Set panic hook for better error messages in the browser
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Milliseconds from `performance.now()`, or 0 outside a window context.
pub(crate) fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

pub(crate) fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

/// Reads a JS array of numbers as object ids. Non-numbers are skipped.
pub(crate) fn ids_from_js(value: &JsValue) -> Vec<ObjectId> {
    if !js_sys::Array::is_array(value) {
        return Vec::new();
    }
    js_sys::Array::from(value)
        .iter()
        .filter_map(|v| v.as_f64())
        .filter(|v| *v >= 0.0 && *v <= f64::from(u32::MAX))
        .map(|v| ObjectId(v as u32))
        .collect()
}

pub(crate) fn ids_to_js(ids: &[ObjectId]) -> JsValue {
    let array = js_sys::Array::new_with_length(ids.len() as u32);
    for (i, id) in ids.iter().enumerate() {
        array.set(i as u32, JsValue::from_f64(f64::from(id.0)));
    }
    array.into()
}

pub(crate) fn to_object_ids(raw: &[u32]) -> Vec<ObjectId> {
    raw.iter().copied().map(ObjectId).collect()
}
