//! Typed failures for each resolution step.
//!
//! Resolvers return these instead of bailing out; the public entry points
//! log them and degrade to "no data" so callers always get a usable value.

use thiserror::Error;

/// Why a single lookup in the resolution graph produced nothing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no {0} id supplied")]
    MissingId(&'static str),
    #[error("host table {0} is unavailable")]
    TableUnavailable(&'static str),
    #[error("requirement set not found: {0}")]
    RequirementSetNotFound(String),
    #[error("requirement row not found for set {set_id}: {requirement_id}")]
    RequirementNotFound {
        set_id: String,
        requirement_id: String,
    },
    #[error("modifier not found in Modifiers: {0}")]
    ModifierNotFound(String),
    #[error("effect type {effect_type} not found for modifier {modifier_id}")]
    EffectTypeNotFound {
        effect_type: String,
        modifier_id: String,
    },
}

impl ResolveError {
    /// Missing rows are worth a diagnostic; missing inputs and tables are
    /// ordinary "no data" outcomes.
    #[must_use]
    pub const fn is_missing_row(&self) -> bool {
        matches!(
            self,
            Self::RequirementSetNotFound(_)
                | Self::RequirementNotFound { .. }
                | Self::ModifierNotFound(_)
                | Self::EffectTypeNotFound { .. }
        )
    }
}

/// Failure raised by an [`crate::ActiveRulesProvider`] while refreshing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("active rules refresh failed: {0}")]
pub struct RulesError(pub String);

/// Failures visible at the top-level aggregation boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error("host callback panicked: {0}")]
    Panicked(String),
}
