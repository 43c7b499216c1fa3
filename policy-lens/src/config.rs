//! Engine configuration: the requirement-type allow-list and label keys.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Requirement types that qualify a modifier for the bonus-yields list.
pub const DEFAULT_ALLOWED_REQUIREMENT_TYPES: [&str; 3] = [
    "REQUIREMENT_CITY_IS_TOWN",
    "REQUIREMENT_REQUIREMENTSET_IS_MET",
    "REQUIREMENT_CITY_HAS_PROJECT",
];

/// Settings bound at engine construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "EngineConfig::default_allowed_requirement_types")]
    pub allowed_requirement_types: BTreeSet<String>,
    /// Modifier argument whose value is the modifier's tooltip tag.
    #[serde(default = "EngineConfig::default_tooltip_argument")]
    pub tooltip_argument: String,
    /// `ModifierStrings` context holding the description tag.
    #[serde(default = "EngineConfig::default_description_context")]
    pub description_context: String,
    #[serde(default = "EngineConfig::default_unknown_label")]
    pub unknown_label: String,
}

impl EngineConfig {
    fn default_allowed_requirement_types() -> BTreeSet<String> {
        DEFAULT_ALLOWED_REQUIREMENT_TYPES
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn default_tooltip_argument() -> String {
        "Tooltip".to_string()
    }

    fn default_description_context() -> String {
        "Description".to_string()
    }

    fn default_unknown_label() -> String {
        "<Unknown Modifier>".to_string()
    }

    /// Load configuration from JSON; missing keys keep their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn allows(&self, requirement_type: &str) -> bool {
        self.allowed_requirement_types.contains(requirement_type)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allowed_requirement_types: Self::default_allowed_requirement_types(),
            tooltip_argument: Self::default_tooltip_argument(),
            description_context: Self::default_description_context(),
            unknown_label: Self::default_unknown_label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_town_requirements() {
        let config = EngineConfig::default();
        assert!(config.allows("REQUIREMENT_CITY_IS_TOWN"));
        assert!(config.allows("REQUIREMENT_CITY_HAS_PROJECT"));
        assert!(!config.allows("REQUIREMENT_PLOT_TERRAIN_TYPE_MATCHES"));
        assert_eq!(config.tooltip_argument, "Tooltip");
        assert_eq!(config.description_context, "Description");
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config = EngineConfig::from_json(
            r#"{ "allowed_requirement_types": ["REQUIREMENT_CITY_IS_CAPITAL"] }"#,
        )
        .unwrap();
        assert!(config.allows("REQUIREMENT_CITY_IS_CAPITAL"));
        assert!(!config.allows("REQUIREMENT_CITY_IS_TOWN"));
        assert_eq!(config.unknown_label, "<Unknown Modifier>");
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }
}
