//! Which modifiers each active rule grants.

use std::collections::HashSet;

use crate::error::RulesError;
use crate::rules::{ActiveRule, ActiveRulesProvider};
use crate::tables::Tables;

#[derive(Clone, Copy)]
pub struct ActiveRuleLinkage<'a> {
    tables: Tables<'a>,
    rules: &'a dyn ActiveRulesProvider,
}

impl<'a> ActiveRuleLinkage<'a> {
    #[must_use]
    pub fn new(tables: Tables<'a>, rules: &'a dyn ActiveRulesProvider) -> Self {
        Self { tables, rules }
    }

    /// Refreshes the host model and snapshots its active rules. A refresh
    /// failure is logged and the current list is used as-is.
    #[must_use]
    pub fn get_active_rules(&self) -> Vec<ActiveRule> {
        self.try_active_rules().unwrap_or_else(|err| {
            log::warn!(target: "policy_lens", "{err}");
            self.rules.active_rules().unwrap_or_default()
        })
    }

    /// Like [`Self::get_active_rules`], but surfaces refresh failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the host model fails to refresh.
    pub fn try_active_rules(&self) -> Result<Vec<ActiveRule>, RulesError> {
        self.rules.refresh()?;
        Ok(self.rules.active_rules().unwrap_or_default())
    }

    /// Unique modifier ids linked to `rule_id`, in first-seen order.
    #[must_use]
    pub fn get_modifier_ids_for_rule(&self, rule_id: &str) -> Vec<String> {
        if rule_id.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        self.tables
            .rule_modifiers()
            .filter(|link| link.rule_type == rule_id)
            .filter_map(|link| link.modifier_id.as_deref())
            .filter(|id| !id.is_empty() && seen.insert(*id))
            .map(ToString::to_string)
            .collect()
    }
}
