// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Debounced text filter over element attributes.
//!
//! The filter is clock-agnostic: callers pass timestamps in milliseconds
//! (`performance.now()` in the browser, a monotonic clock elsewhere) and
//! [`SearchFilter::poll`] reports when the last scheduled text is due. Each
//! [`SearchFilter::set_filter`] replaces the pending text and restarts the
//! window, so a burst of keystrokes yields one application.

use crate::element::{Attribute, Element};

/// Default debounce window.
pub const DEBOUNCE_MS: f64 = 200.0;

#[derive(Debug, Clone, PartialEq)]
struct Pending {
    text: String,
    due_ms: f64,
}

/// Search box state.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    applied: String,
    pending: Option<Pending>,
    debounce_ms: f64,
}

impl SearchFilter {
    pub fn new(debounce_ms: f64) -> Self {
        Self {
            applied: String::new(),
            pending: None,
            debounce_ms,
        }
    }

    pub fn debounce_ms(&self) -> f64 {
        self.debounce_ms
    }

    /// The text most recently applied.
    pub fn text(&self) -> &str {
        &self.applied
    }

    /// Whether a filter application is scheduled.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending text becomes due.
    pub fn due_ms(&self) -> Option<f64> {
        self.pending.as_ref().map(|p| p.due_ms)
    }

    /// Schedules `text`, replacing whatever was pending.
    pub fn set_filter(&mut self, text: impl Into<String>, now_ms: f64) {
        self.pending = Some(Pending {
            text: text.into(),
            due_ms: now_ms + self.debounce_ms,
        });
    }

    /// Returns the pending text once its window has elapsed.
    ///
    /// The returned text becomes the applied text. Returns `None` while
    /// nothing is due.
    pub fn poll(&mut self, now_ms: f64) -> Option<String> {
        let due = self.pending.as_ref().is_some_and(|p| now_ms >= p.due_ms);
        if due {
            self.flush()
        } else {
            None
        }
    }

    /// Applies the pending text immediately.
    pub fn flush(&mut self) -> Option<String> {
        let pending = self.pending.take()?;
        self.applied = pending.text.clone();
        Some(pending.text)
    }

    /// Drops the pending text.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Empties the box without waiting for the debounce window.
    pub fn reset(&mut self) {
        self.pending = None;
        self.applied.clear();
    }
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self::new(DEBOUNCE_MS)
    }
}

/// Whether an element matches a search text.
///
/// Whitespace-separated terms must all occur (case-insensitively) in at
/// least one of the element's attributes. Blank text matches everything.
pub fn matches(element: &Element, text: &str) -> bool {
    let haystacks: Vec<String> = Attribute::ALL
        .iter()
        .map(|&a| element.attribute(a).to_lowercase())
        .collect();
    text.split_whitespace()
        .map(str::to_lowercase)
        .all(|term| haystacks.iter().any(|h| h.contains(&term)))
}

/// Elements matching `text`, in input order.
pub fn filter(elements: &[Element], text: &str) -> Vec<Element> {
    if text.trim().is_empty() {
        return elements.to_vec();
    }
    elements
        .iter()
        .filter(|e| matches(e, text))
        .cloned()
        .collect()
}
