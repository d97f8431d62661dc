// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JavaScript API for BIM-Shell
//!
//! One [`ShellAPI`] per viewer: it owns the session state and drives the
//! viewer through the duck-typed object passed to the constructor.

mod isolation;
mod search;
mod tree;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use bim_shell_core::{Element, IsolationChange, ShellConfig, ViewerSession};
use gloo_timers::callback::Timeout;
use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::error::ApiError;
use crate::scene::JsScene;

struct Inner {
    session: ViewerSession,
    scene: JsScene,
}

/// State shared with timer callbacks.
#[derive(Clone)]
struct Shared {
    inner: Rc<RefCell<Inner>>,
    /// Isolation changes recorded while `inner` is borrowed.
    events: Rc<RefCell<Vec<IsolationChange>>>,
    listeners: Rc<RefCell<Vec<(u32, Function)>>>,
    tree_listener: Rc<RefCell<Option<Function>>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangeJs {
    source: &'static str,
    active: bool,
    count: usize,
}

impl Shared {
    /// Runs `f` against the session and scene, then delivers queued
    /// isolation events once the borrow is released.
    ///
    /// Any regroup of the tree inside `f` (new elements, an applied filter,
    /// a search reset by an isolation command) renumbers every node, so the
    /// tree listener fires whenever the generation moved.
    fn with<R>(
        &self,
        f: impl FnOnce(&mut ViewerSession, &mut JsScene) -> R,
    ) -> Result<R, ApiError> {
        let (result, regrouped) = {
            let mut inner = self.inner.try_borrow_mut().map_err(|_| ApiError::Busy)?;
            let Inner { session, scene } = &mut *inner;
            let before = session.tree().generation();
            let result = f(session, scene);
            (result, session.tree().generation() != before)
        };
        self.dispatch();
        if regrouped {
            self.notify_tree_changed();
        }
        Ok(result)
    }

    fn read<R>(&self, f: impl FnOnce(&ViewerSession) -> R) -> Result<R, ApiError> {
        let inner = self.inner.try_borrow().map_err(|_| ApiError::Busy)?;
        Ok(f(&inner.session))
    }

    fn dispatch(&self) {
        let events: Vec<IsolationChange> = self.events.borrow_mut().drain(..).collect();
        if events.is_empty() {
            return;
        }
        // Callbacks may subscribe or unsubscribe, so iterate a snapshot.
        let listeners: Vec<Function> =
            self.listeners.borrow().iter().map(|(_, f)| f.clone()).collect();
        for change in events {
            let payload = ChangeJs {
                source: change.source.as_str(),
                active: change.active,
                count: change.count,
            };
            let Ok(value) = serde_wasm_bindgen::to_value(&payload) else {
                continue;
            };
            for listener in &listeners {
                if let Err(err) = listener.call1(&JsValue::NULL, &value) {
                    web_sys::console::error_2(&JsValue::from_str("isolation listener threw"), &err);
                }
            }
        }
    }

    fn notify_tree_changed(&self) {
        let listener = self.tree_listener.borrow().clone();
        if let Some(listener) = listener {
            if let Err(err) = listener.call0(&JsValue::NULL) {
                web_sys::console::error_2(&JsValue::from_str("tree listener threw"), &err);
            }
        }
    }
}

/// Main BIM-Shell API
#[wasm_bindgen]
pub struct ShellAPI {
    shared: Shared,
    next_listener: Cell<u32>,
    search_timer: RefCell<Option<Timeout>>,
}

#[wasm_bindgen]
impl ShellAPI {
    /// Create and initialize the API around a viewer object.
    ///
    /// `config` is optional; see `ShellConfig` for the accepted keys.
    #[wasm_bindgen(constructor)]
    pub fn new(viewer: JsValue, config: JsValue) -> Result<ShellAPI, JsValue> {
        let config: ShellConfig = if config.is_undefined() || config.is_null() {
            ShellConfig::default()
        } else {
            serde_wasm_bindgen::from_value::<ShellConfig>(config)
                .map_err(ApiError::from)?
                .normalized()
        };

        let events: Rc<RefCell<Vec<IsolationChange>>> = Rc::default();
        let mut session = ViewerSession::new(config);
        let queue = Rc::clone(&events);
        session.subscribe(move |change| queue.borrow_mut().push(*change));

        Ok(ShellAPI {
            shared: Shared {
                inner: Rc::new(RefCell::new(Inner {
                    session,
                    scene: JsScene::new(viewer),
                })),
                events,
                listeners: Rc::default(),
                tree_listener: Rc::default(),
            },
            next_listener: Cell::new(1),
            search_timer: RefCell::new(None),
        })
    }

    /// Replace the element list. Returns whether the tree was rebuilt.
    #[wasm_bindgen(js_name = setElements)]
    pub fn set_elements(&self, elements: JsValue) -> Result<bool, JsValue> {
        let elements: Vec<Element> =
            serde_wasm_bindgen::from_value(elements).map_err(ApiError::from)?;
        let elements: Arc<[Element]> = elements.into();
        let rebuilt = self
            .shared
            .with(|session, scene| {
                let rebuilt = session.set_elements(elements)?;
                if rebuilt {
                    session.on_visibility_changed(scene);
                }
                Ok::<_, bim_shell_core::Error>(rebuilt)
            })?
            .map_err(ApiError::from)?;
        Ok(rebuilt)
    }

    /// Number of elements in the current list.
    #[wasm_bindgen(js_name = elementCount)]
    pub fn element_count(&self) -> Result<usize, JsValue> {
        Ok(self.shared.read(|s| s.elements().len())?)
    }

    /// Register `callback(change)` for isolation changes.
    ///
    /// `change` is `{ source, active, count }`. Returns an id for
    /// `unsubscribe`.
    pub fn subscribe(&self, callback: Function) -> u32 {
        let id = self.next_listener.get();
        self.next_listener.set(id.wrapping_add(1));
        self.shared.listeners.borrow_mut().push((id, callback));
        id
    }

    pub fn unsubscribe(&self, id: u32) -> bool {
        let mut listeners = self.shared.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(l, _)| *l != id);
        listeners.len() != before
    }

    /// Register `callback()` for tree rebuilds (element list or filter).
    #[wasm_bindgen(js_name = onTreeChanged)]
    pub fn on_tree_changed(&self, callback: Option<Function>) {
        *self.shared.tree_listener.borrow_mut() = callback;
    }

    /// Start an attribute fetch for `object`. Returns a ticket.
    #[wasm_bindgen(js_name = beginAttributeRequest)]
    pub fn begin_attribute_request(&self, object: u32) -> Result<f64, JsValue> {
        let ticket = self
            .shared
            .with(|s, _| s.begin_attribute_request(bim_shell_core::ObjectId(object)))?;
        Ok(ticket.raw() as f64)
    }

    /// Whether the response for `ticket` is still current.
    #[wasm_bindgen(js_name = acceptAttributeResponse)]
    pub fn accept_attribute_response(&self, ticket: f64, object: u32) -> Result<bool, JsValue> {
        let ticket = bim_shell_core::RequestTicket::from_raw(ticket as u64);
        Ok(self
            .shared
            .read(|s| s.accept_attribute_response(ticket, bim_shell_core::ObjectId(object)))?)
    }

    /// Tear down: cancels the pending filter, drops listeners and forgets
    /// isolation state.
    pub fn close(&self) -> Result<(), JsValue> {
        self.search_timer.borrow_mut().take();
        self.shared.listeners.borrow_mut().clear();
        self.shared.tree_listener.borrow_mut().take();
        self.shared.with(|s, _| s.close())?;
        Ok(())
    }
}
