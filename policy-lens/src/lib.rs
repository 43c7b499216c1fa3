//! Policy Lens Engine
//!
//! Resolves the modifiers granted by a player's active rules (policies /
//! traditions) out of the host game's relational tables, and reduces them
//! to the deduplicated bonus labels a town-focus tooltip shows.
//!
//! The engine never touches global state: the host hands it a
//! [`HostTables`] implementation, an [`ActiveRulesProvider`] and optionally a
//! [`TextComposer`], and every call reads them afresh.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod linkage;
pub mod locale;
pub mod modifiers;
pub mod requirements;
pub mod rules;
pub mod tables;
pub mod town;

// Re-export commonly used types
pub use aggregate::{ModifierOutcome, PolicyEngine, ResolvedRules, RuleEntry};
pub use config::{DEFAULT_ALLOWED_REQUIREMENT_TYPES, EngineConfig};
pub use error::{EngineError, ResolveError, RulesError};
pub use linkage::ActiveRuleLinkage;
pub use locale::{LocaleTable, TextComposer, compose_or_raw, try_compose};
pub use modifiers::{ModifierResolver, ResolvedModifier};
pub use requirements::{Argument, Requirement, RequirementSet, RequirementSetResolver};
pub use rules::{ActiveRule, ActiveRulesProvider, StaticRules};
pub use tables::{
    EffectTypeRow, GameInfoTables, HostTables, ModifierArgumentRow, ModifierRow,
    ModifierStringRow, RequirementArgumentRow, RequirementRow, RequirementSetLink,
    RequirementSetRow, RuleModifierLink, TableView, Tables,
};
pub use town::{
    ImprovementCatalog, ImprovementLine, ImprovementSummary, PlacedImprovement, PlotLocation,
    TownFocus, era_multiplier, fmt1, summarize_improvements,
};

/// Everything the engine reads from the host, loadable as one JSON document:
/// `{ "tables": {...}, "activeRules": [...], "locale": {...} }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSnapshot {
    #[serde(default)]
    pub tables: GameInfoTables,
    /// `None` models a host without a policies model.
    #[serde(default)]
    pub active_rules: Option<Vec<ActiveRule>>,
    #[serde(default)]
    pub locale: Option<LocaleTable>,
    #[serde(default)]
    pub city: Option<CitySnapshot>,
}

/// Improvements placed in the city whose tooltip is being built.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySnapshot {
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub improvements: Vec<PlacedImprovement>,
}

impl HostSnapshot {
    /// Parse a snapshot document
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the snapshot shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Active-rules provider over this snapshot's rule list.
    #[must_use]
    pub fn rules_provider(&self) -> StaticRules {
        self.active_rules
            .clone()
            .map_or_else(StaticRules::unavailable, StaticRules::new)
    }
}
