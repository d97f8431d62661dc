// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Errors surfaced to JavaScript as rejected calls.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] bim_shell_core::Error),

    #[error("invalid input: {0}")]
    Input(#[from] serde_wasm_bindgen::Error),

    #[error("shell is busy: re-entrant call from a callback")]
    Busy,
}

impl From<ApiError> for JsValue {
    fn from(err: ApiError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
