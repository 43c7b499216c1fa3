//! Active-rule aggregation and bonus-label derivation.
//!
//! This is the engine's public boundary: both entry points always return a
//! well-formed value, turning every failure below them into missing data.

use serde::Serialize;
use std::collections::HashSet;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::linkage::ActiveRuleLinkage;
use crate::locale::{TextComposer, compose_or_raw, try_compose};
use crate::modifiers::{ModifierResolver, ResolvedModifier};
use crate::rules::{ActiveRule, ActiveRulesProvider};
use crate::tables::{HostTables, Tables};

const UNRESOLVED_MODIFIER: &str = "Modifier not found or failed to resolve";

/// A linked modifier, or the marker left behind when it failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ModifierOutcome {
    Resolved(Box<ResolvedModifier>),
    Unresolved { error: String, id: String },
}

impl ModifierOutcome {
    #[must_use]
    pub fn resolved(&self) -> Option<&ResolvedModifier> {
        match self {
            Self::Resolved(modifier) => Some(modifier),
            Self::Unresolved { .. } => None,
        }
    }
}

/// One active rule with everything it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEntry {
    pub rule_id: String,
    pub name_tag: Option<String>,
    pub localized_name: Option<String>,
    pub modifier_ids: Vec<String>,
    /// Parallel to `modifier_ids`.
    pub modifiers: Vec<ModifierOutcome>,
}

impl RuleEntry {
    /// Display name for the rule: localized name, else the composed name
    /// tag, else the raw tag.
    #[must_use]
    pub fn display_name(&self, composer: Option<&dyn TextComposer>) -> Option<String> {
        if let Some(name) = self.localized_name.as_deref().filter(|n| !n.is_empty()) {
            return Some(name.to_string());
        }
        self.name_tag
            .as_deref()
            .filter(|tag| !tag.is_empty())
            .map(|tag| compose_or_raw(composer, tag))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRules {
    /// Size of the active-rule snapshot, including skipped rules.
    pub active_rule_count: usize,
    pub entries: Vec<RuleEntry>,
}

/// Resolves active rules against the host tables.
///
/// Holds only borrowed host handles; every call reads the tables afresh.
pub struct PolicyEngine<'a> {
    tables: Tables<'a>,
    rules: &'a dyn ActiveRulesProvider,
    composer: Option<&'a dyn TextComposer>,
    config: EngineConfig,
}

impl<'a> PolicyEngine<'a> {
    #[must_use]
    pub fn new(tables: &'a dyn HostTables, rules: &'a dyn ActiveRulesProvider) -> Self {
        Self {
            tables: Tables::new(tables),
            rules,
            composer: None,
            config: EngineConfig::default(),
        }
    }

    #[must_use]
    pub fn with_composer(mut self, composer: &'a dyn TextComposer) -> Self {
        self.composer = Some(composer);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn linkage(&self) -> ActiveRuleLinkage<'a> {
        ActiveRuleLinkage::new(self.tables, self.rules)
    }

    #[must_use]
    pub fn modifier_resolver(&self) -> ModifierResolver<'_> {
        ModifierResolver::new(self.tables, self.composer, &self.config.description_context)
    }

    /// Every active rule with a type, its linked modifier ids and their
    /// resolved modifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if the active-rules model fails to refresh.
    pub fn get_resolved_modifiers_for_active_rules(&self) -> Result<ResolvedRules, EngineError> {
        let linkage = self.linkage();
        let active = linkage.try_active_rules()?;
        let resolver = self.modifier_resolver();

        let entries = active
            .iter()
            .filter_map(|rule| self.entry_for(rule, &linkage, &resolver))
            .collect();

        Ok(ResolvedRules {
            active_rule_count: active.len(),
            entries,
        })
    }

    fn entry_for(
        &self,
        rule: &ActiveRule,
        linkage: &ActiveRuleLinkage<'_>,
        resolver: &ModifierResolver<'_>,
    ) -> Option<RuleEntry> {
        let rule_id = rule.rule_id()?;
        let modifier_ids = linkage.get_modifier_ids_for_rule(rule_id);

        let modifiers = modifier_ids
            .iter()
            .map(|id| match resolver.resolve_modifier_by_id(id) {
                Some(resolved) => ModifierOutcome::Resolved(Box::new(resolved)),
                None => ModifierOutcome::Unresolved {
                    error: UNRESOLVED_MODIFIER.to_string(),
                    id: id.clone(),
                },
            })
            .collect();

        let name_tag = rule.name_tag.clone().filter(|tag| !tag.is_empty());
        let localized_name = rule
            .localized_name
            .clone()
            .filter(|name| !name.is_empty())
            .or_else(|| {
                name_tag
                    .as_deref()
                    .map(|tag| compose_or_raw(self.composer, tag))
            });

        Some(RuleEntry {
            rule_id: rule_id.to_string(),
            name_tag,
            localized_name,
            modifier_ids,
            modifiers,
        })
    }

    /// Deduplicated bonus labels for active-rule modifiers whose subject
    /// requirement set passes the allow-list, in first-seen order.
    ///
    /// Never fails: any error or host panic is logged and yields an empty
    /// list.
    #[must_use]
    pub fn get_display_labels_for_active_rule_modifiers(&self) -> Vec<String> {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.try_display_labels()))
            .unwrap_or_else(|payload| Err(EngineError::Panicked(panic_message(payload.as_ref()))));
        match outcome {
            Ok(labels) => labels,
            Err(err) => {
                log::error!(target: "policy_lens", "resolving active rule modifiers failed: {err}");
                Vec::new()
            }
        }
    }

    fn try_display_labels(&self) -> Result<Vec<String>, EngineError> {
        let data = self.get_resolved_modifiers_for_active_rules()?;

        let mut seen = HashSet::new();
        let mut labels = Vec::new();
        for entry in &data.entries {
            let rule_label = entry.display_name(self.composer);
            for (id, outcome) in entry.modifier_ids.iter().zip(&entry.modifiers) {
                let Some(modifier) = outcome.resolved() else {
                    continue;
                };
                if !self.passes_requirement_filter(modifier) {
                    continue;
                }
                let label = self.label_for(modifier, Some(id), rule_label.as_deref());
                if seen.insert(label.clone()) {
                    labels.push(label);
                }
            }
        }
        Ok(labels)
    }

    /// OR across the subject set's requirements: one allow-listed type is
    /// enough, whatever the set's own test type says.
    #[must_use]
    pub fn passes_requirement_filter(&self, modifier: &ResolvedModifier) -> bool {
        modifier
            .subject_requirement_set
            .as_ref()
            .is_some_and(|set| set.any_requirement(|ty| self.config.allows(ty)))
    }

    /// Label priority: tooltip argument, owning rule's name, modifier id,
    /// placeholder.
    #[must_use]
    pub fn label_for(
        &self,
        modifier: &ResolvedModifier,
        fallback_id: Option<&str>,
        rule_label: Option<&str>,
    ) -> String {
        if let Some(tag) = modifier
            .argument(&self.config.tooltip_argument)
            .map(|arg| arg.value.as_str())
            .filter(|value| !value.is_empty())
        {
            return try_compose(self.composer, tag).unwrap_or_else(|| tag.to_string());
        }

        if let Some(label) = rule_label.filter(|label| !label.is_empty()) {
            return label.to_string();
        }

        Some(modifier.modifier_id())
            .filter(|id| !id.is_empty())
            .or_else(|| fallback_id.filter(|id| !id.is_empty()))
            .map_or_else(|| self.config.unknown_label.clone(), ToString::to_string)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
