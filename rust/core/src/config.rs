// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session settings.
//!
//! The UI layer owns persistence and hands settings over as JSON;
//! command-line tools read them from `BIM_SHELL_*` environment variables.
//! Every field has a default, so partial documents are fine.

use serde::{Deserialize, Serialize};

use crate::element::Attribute;
use crate::error::Result;
use crate::grouping::{GroupKey, TreeBuilder, DEFAULT_EMPTY_TITLE};
use crate::isolation::IsolationOptions;
use crate::search::DEBOUNCE_MS;
use crate::selection::DOUBLE_CLICK_MS;

/// Settings for one viewer session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShellConfig {
    /// Search debounce window in milliseconds.
    pub debounce_ms: f64,
    /// Double-click window in milliseconds.
    pub double_click_ms: f64,
    /// Ghost the scene while an isolation is active.
    pub ghost_material: bool,
    /// Frame the camera after isolation changes.
    pub reframe: bool,
    /// Tree levels, outermost first.
    pub group_by: Vec<Attribute>,
    /// Group titles that sort before all others.
    pub group_priority: Vec<String>,
    /// Title for elements with an empty group key.
    pub empty_group_title: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEBOUNCE_MS,
            double_click_ms: DOUBLE_CLICK_MS,
            ghost_material: true,
            reframe: true,
            group_by: vec![Attribute::Category, Attribute::Family, Attribute::FamilyType],
            group_priority: Vec::new(),
            empty_group_title: DEFAULT_EMPTY_TITLE.to_string(),
        }
    }
}

impl ShellConfig {
    /// Parses settings stored by the UI layer.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Replaces an empty `groupBy` with the default hierarchy.
    ///
    /// Call after decoding settings through any other deserializer.
    pub fn normalized(mut self) -> Self {
        if self.group_by.is_empty() {
            tracing::warn!("empty groupBy in settings, using the default hierarchy");
            self.group_by = Self::default().group_by;
        }
        self
    }

    /// Loads settings from `BIM_SHELL_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary variable lookup.
    ///
    /// Unparseable values fall back to the default for that field.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let list = |key: &str| -> Option<Vec<String>> {
            lookup(key).map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
        };

        let group_by = list("BIM_SHELL_GROUP_BY")
            .map(|names| names.iter().filter_map(|n| Attribute::from_name(n)).collect::<Vec<_>>())
            .filter(|attrs| !attrs.is_empty())
            .unwrap_or(defaults.group_by);

        Self {
            debounce_ms: lookup("BIM_SHELL_DEBOUNCE_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.debounce_ms),
            double_click_ms: lookup("BIM_SHELL_DOUBLE_CLICK_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.double_click_ms),
            ghost_material: lookup("BIM_SHELL_GHOST_MATERIAL")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.ghost_material),
            reframe: lookup("BIM_SHELL_REFRAME")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.reframe),
            group_by,
            group_priority: list("BIM_SHELL_GROUP_PRIORITY").unwrap_or(defaults.group_priority),
            empty_group_title: lookup("BIM_SHELL_EMPTY_GROUP_TITLE")
                .unwrap_or(defaults.empty_group_title),
        }
    }

    pub fn isolation_options(&self) -> IsolationOptions {
        IsolationOptions {
            ghost_material: self.ghost_material,
            reframe: self.reframe,
        }
    }

    /// Tree builder for the configured hierarchy.
    pub fn tree_builder(&self) -> TreeBuilder {
        TreeBuilder::new()
            .group_by_all(self.group_by.iter().map(|&a| GroupKey::attribute(a)))
            .priority(self.group_priority.iter().cloned())
            .empty_title(self.empty_group_title.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{ "debounceMs": 350, "groupBy": ["family"] }"#;
        let config = ShellConfig::from_json(json).unwrap();
        assert_eq!(config.debounce_ms, 350.0);
        assert_eq!(config.group_by, vec![Attribute::Family]);
        assert_eq!(config.double_click_ms, DOUBLE_CLICK_MS);
        assert!(config.ghost_material);
    }

    #[test]
    fn empty_group_by_uses_default_hierarchy() {
        let config = ShellConfig::from_json(r#"{ "groupBy": [] }"#).unwrap();
        assert_eq!(config.group_by, ShellConfig::default().group_by);

        let mut session = crate::ViewerSession::new(config);
        assert!(session.set_elements(crate::testing::sample_elements().into()).unwrap());
        assert_eq!(session.tree().roots().len(), 2);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(ShellConfig::from_json("{ not json").is_err());
        assert!(ShellConfig::from_json(r#"{ "groupBy": ["level"] }"#).is_err());
    }

    #[test]
    fn lookup_overrides_and_fallbacks() {
        let vars: FxHashMap<&str, &str> = [
            ("BIM_SHELL_DEBOUNCE_MS", "50"),
            ("BIM_SHELL_REFRAME", "false"),
            ("BIM_SHELL_DOUBLE_CLICK_MS", "soon"),
            ("BIM_SHELL_GROUP_BY", "category, familyType, bogus"),
            ("BIM_SHELL_GROUP_PRIORITY", "Walls,Doors"),
        ]
        .into_iter()
        .collect();
        let config = ShellConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.debounce_ms, 50.0);
        assert!(!config.reframe);
        assert_eq!(config.double_click_ms, DOUBLE_CLICK_MS);
        assert_eq!(config.group_by, vec![Attribute::Category, Attribute::FamilyType]);
        assert_eq!(config.group_priority, vec!["Walls", "Doors"]);
        assert_eq!(config.empty_group_title, DEFAULT_EMPTY_TITLE);
    }

    #[test]
    fn builder_follows_config() {
        let config = ShellConfig {
            group_by: vec![Attribute::Category],
            ..ShellConfig::default()
        };
        assert_eq!(config.tree_builder().keys().len(), 1);
        assert_eq!(config.tree_builder().keys()[0].name(), "category");
    }
}
