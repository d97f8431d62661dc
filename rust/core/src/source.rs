// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Origin tags for isolation changes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which part of the UI requested an isolation change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeSource {
    Tree,
    Search,
    ContextMenu,
    ControlBar,
    Keyboard,
}

impl ChangeSource {
    pub const ALL: [ChangeSource; 5] = [
        ChangeSource::Tree,
        ChangeSource::Search,
        ChangeSource::ContextMenu,
        ChangeSource::ControlBar,
        ChangeSource::Keyboard,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChangeSource::Tree => "tree",
            ChangeSource::Search => "search",
            ChangeSource::ContextMenu => "contextMenu",
            ChangeSource::ControlBar => "controlBar",
            ChangeSource::Keyboard => "keyboard",
        }
    }

    /// The search box resets itself when isolation changes from anywhere
    /// other than the search box or the tree it filters.
    pub fn clears_search(self) -> bool {
        !matches!(self, ChangeSource::Search | ChangeSource::Tree)
    }
}

impl std::fmt::Display for ChangeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChangeSource::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::UnknownSource(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_names() {
        for source in ChangeSource::ALL {
            assert_eq!(source.as_str().parse::<ChangeSource>().unwrap(), source);
        }
        assert!("mouse".parse::<ChangeSource>().is_err());
    }

    #[test]
    fn serde_uses_ui_tags() {
        let json = serde_json::to_string(&ChangeSource::ContextMenu).unwrap();
        assert_eq!(json, "\"contextMenu\"");
    }

    #[test]
    fn search_reset_policy() {
        assert!(!ChangeSource::Search.clears_search());
        assert!(!ChangeSource::Tree.clears_search());
        assert!(ChangeSource::ContextMenu.clears_search());
        assert!(ChangeSource::Keyboard.clears_search());
        assert!(ChangeSource::ControlBar.clears_search());
    }
}
