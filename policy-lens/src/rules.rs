//! Active rules (policies / traditions) and the provider that snapshots them.

use serde::{Deserialize, Serialize};
use std::cell::Cell;

use crate::error::RulesError;

/// One currently slotted rule as reported by the host policies model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRule {
    #[serde(rename = "TraditionType", alias = "Tradition", default)]
    pub rule_id: Option<String>,
    #[serde(
        rename = "Name",
        alias = "NameTag",
        alias = "TraditionNameTag",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub name_tag: Option<String>,
    #[serde(
        rename = "LocalizedName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub localized_name: Option<String>,
}

impl ActiveRule {
    #[must_use]
    pub fn new(rule_id: impl Into<String>) -> Self {
        Self {
            rule_id: Some(rule_id.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_name_tag(mut self, tag: impl Into<String>) -> Self {
        self.name_tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn with_localized_name(mut self, name: impl Into<String>) -> Self {
        self.localized_name = Some(name.into());
        self
    }

    /// The rule's type identifier, if present and non-empty.
    #[must_use]
    pub fn rule_id(&self) -> Option<&str> {
        self.rule_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Host model that knows which rules are active.
pub trait ActiveRulesProvider {
    /// Ask the host model to recompute its active list. Hosts without an
    /// explicit refresh keep the default no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the host model failed to refresh.
    fn refresh(&self) -> Result<(), RulesError> {
        Ok(())
    }

    /// Current active rules, or `None` when the model is unavailable.
    fn active_rules(&self) -> Option<Vec<ActiveRule>>;
}

/// Fixed list of active rules, e.g. loaded from a host snapshot.
#[derive(Debug, Default)]
pub struct StaticRules {
    rules: Option<Vec<ActiveRule>>,
    refreshes: Cell<u32>,
}

impl StaticRules {
    #[must_use]
    pub fn new(rules: Vec<ActiveRule>) -> Self {
        Self {
            rules: Some(rules),
            refreshes: Cell::new(0),
        }
    }

    /// A provider whose host model is missing entirely.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Number of times the engine asked for a refresh.
    #[must_use]
    pub fn refresh_count(&self) -> u32 {
        self.refreshes.get()
    }
}

impl ActiveRulesProvider for StaticRules {
    fn refresh(&self) -> Result<(), RulesError> {
        self.refreshes.set(self.refreshes.get() + 1);
        Ok(())
    }

    fn active_rules(&self) -> Option<Vec<ActiveRule>> {
        self.rules.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_rows_accept_host_field_spellings() {
        let rules: Vec<ActiveRule> = serde_json::from_str(
            r#"[
                { "TraditionType": "TRADITION_A", "Name": "LOC_A" },
                { "Tradition": "TRADITION_B", "TraditionNameTag": "LOC_B", "LocalizedName": "Bee" },
                { "NameTag": "LOC_C" }
            ]"#,
        )
        .unwrap();

        assert_eq!(rules[0].rule_id(), Some("TRADITION_A"));
        assert_eq!(rules[0].name_tag.as_deref(), Some("LOC_A"));
        assert_eq!(rules[1].rule_id(), Some("TRADITION_B"));
        assert_eq!(rules[1].localized_name.as_deref(), Some("Bee"));
        assert_eq!(rules[2].rule_id(), None);
    }

    #[test]
    fn empty_rule_id_counts_as_absent() {
        assert_eq!(ActiveRule::new("").rule_id(), None);
    }

    #[test]
    fn static_rules_track_refreshes() {
        let provider = StaticRules::new(vec![ActiveRule::new("R1")]);
        provider.refresh().unwrap();
        provider.refresh().unwrap();
        assert_eq!(provider.refresh_count(), 2);
        assert_eq!(provider.active_rules().map(|r| r.len()), Some(1));
        assert_eq!(StaticRules::unavailable().active_rules(), None);
    }
}
