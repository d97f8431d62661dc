// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Guard against async responses that arrive after their input changed.
//!
//! Attribute fetches for a selected object resolve on the document
//! collaborator's schedule. Only the response to the most recent request
//! for the most recent input may be applied; everything else is dropped.

/// Ticket handed out for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    /// Numeric form for crossing an FFI boundary.
    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn from_raw(raw: u64) -> Self {
        RequestTicket(raw)
    }
}

/// Tracks the latest requested input.
#[derive(Debug, Clone)]
pub struct RequestGuard<K> {
    latest: Option<(RequestTicket, K)>,
    next: u64,
}

impl<K: PartialEq> RequestGuard<K> {
    pub fn new() -> Self {
        Self {
            latest: None,
            next: 0,
        }
    }

    /// Records `key` as the current input and returns its ticket.
    pub fn begin(&mut self, key: K) -> RequestTicket {
        let ticket = RequestTicket(self.next);
        self.next += 1;
        self.latest = Some((ticket, key));
        ticket
    }

    /// Whether a response for `ticket`/`key` is still current.
    pub fn accept(&self, ticket: RequestTicket, key: &K) -> bool {
        let current = matches!(&self.latest, Some((t, k)) if *t == ticket && k == key);
        if !current {
            tracing::debug!(ticket = ticket.0, "discarding stale response");
        }
        current
    }

    /// Input of the latest request.
    pub fn latest(&self) -> Option<&K> {
        self.latest.as_ref().map(|(_, k)| k)
    }

    /// Invalidates every outstanding ticket.
    pub fn reset(&mut self) {
        self.latest = None;
    }
}

impl<K: PartialEq> Default for RequestGuard<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_request_is_accepted() {
        let mut guard = RequestGuard::new();
        let a = guard.begin("A");
        let b = guard.begin("B");
        assert!(!guard.accept(a, &"A"));
        assert!(guard.accept(b, &"B"));
        assert_eq!(guard.latest(), Some(&"B"));
        assert!(guard.accept(RequestTicket::from_raw(b.raw()), &"B"));
    }

    #[test]
    fn same_key_requested_twice_keeps_latest_ticket() {
        let mut guard = RequestGuard::new();
        let first = guard.begin(7u32);
        let second = guard.begin(7u32);
        assert!(!guard.accept(first, &7));
        assert!(guard.accept(second, &7));
        assert!(!guard.accept(second, &8));
    }

    #[test]
    fn reset_rejects_everything() {
        let mut guard = RequestGuard::new();
        let t = guard.begin(1u32);
        guard.reset();
        assert!(!guard.accept(t, &1));
    }
}
