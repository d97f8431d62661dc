// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Debounced search box.
//!
//! Keystrokes go through `setFilter`; a browser timer applies the filter
//! once typing pauses for the configured window. A new keystroke replaces
//! the timer, which cancels the old one.

use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;

use super::{Shared, ShellAPI};
use crate::error::ApiError;
use crate::utils::{now_ms, warn};

fn flush(shared: &Shared) -> Result<bool, ApiError> {
    Ok(shared.with(|s, scene| s.flush_filter(scene))??)
}

#[wasm_bindgen]
impl ShellAPI {
    /// Record a keystroke in the search box.
    #[wasm_bindgen(js_name = setFilter)]
    pub fn set_filter(&self, text: String) -> Result<(), JsValue> {
        let now = now_ms();
        let delay = self.shared.with(|s, _| {
            s.set_filter(text, now);
            s.search_due_ms().map(|due| (due - now).max(0.0))
        })?;

        let timer = delay.map(|delay| {
            let shared = self.shared.clone();
            Timeout::new(delay.ceil() as u32, move || {
                if let Err(err) = flush(&shared) {
                    warn(&format!("search filter failed: {err}"));
                }
            })
        });
        *self.search_timer.borrow_mut() = timer;
        Ok(())
    }

    /// Apply the pending filter immediately, skipping the debounce window.
    #[wasm_bindgen(js_name = flushFilter)]
    pub fn flush_filter(&self) -> Result<bool, JsValue> {
        self.search_timer.borrow_mut().take();
        Ok(flush(&self.shared)?)
    }

    /// Turn isolation-by-search on or off.
    #[wasm_bindgen(js_name = setSearching)]
    pub fn set_searching(&self, searching: bool) -> Result<bool, JsValue> {
        Ok(self.shared.with(|s, scene| s.set_searching(scene, searching))?)
    }

    #[wasm_bindgen(js_name = searchText)]
    pub fn search_text(&self) -> Result<String, JsValue> {
        Ok(self.shared.read(|s| s.search_text().to_string())?)
    }

    #[wasm_bindgen(js_name = isSearching)]
    pub fn is_searching(&self) -> Result<bool, JsValue> {
        Ok(self.shared.read(|s| s.is_searching())?)
    }
}
