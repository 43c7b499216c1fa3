//! Read-only views over the host's game tables.
//!
//! Row types mirror the host's PascalCase columns. Historical key spellings
//! (`ModifierID`, `requirementId`, ...) are folded into a single field with
//! serde aliases here, so nothing downstream has to check both.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ResolveError;

/// Accepts string, number or boolean argument values and keeps them as text.
fn value_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Reads a text column, treating `null` as empty. Empty ids match nothing.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// `TraditionModifiers`: links an active rule to the modifiers it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleModifierLink {
    #[serde(rename = "TraditionType", deserialize_with = "null_as_empty", default)]
    pub rule_type: String,
    #[serde(rename = "ModifierId", alias = "ModifierID", default)]
    pub modifier_id: Option<String>,
}

/// `Modifiers`: base modifier definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierRow {
    #[serde(
        rename = "ModifierId",
        alias = "ModifierID",
        deserialize_with = "null_as_empty",
        default
    )]
    pub modifier_id: String,
    #[serde(rename = "ModifierType", deserialize_with = "null_as_empty", default)]
    pub modifier_type: String,
    #[serde(
        rename = "SubjectRequirementSetId",
        alias = "SubjectRequirementSetID",
        alias = "SubjectRequirementSet",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub subject_requirement_set_id: Option<String>,
    #[serde(
        rename = "OwnerRequirementSetId",
        alias = "OwnerRequirementSetID",
        alias = "OwnerRequirementSet",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub owner_requirement_set_id: Option<String>,
}

/// `DynamicModifiers`: the effect-type definition behind a `ModifierType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EffectTypeRow {
    #[serde(deserialize_with = "null_as_empty", default)]
    pub modifier_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_type: Option<String>,
}

/// `RequirementSets`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequirementSetRow {
    #[serde(deserialize_with = "null_as_empty", default)]
    pub requirement_set_id: String,
    #[serde(deserialize_with = "null_as_empty", default)]
    pub requirement_set_type: String,
}

/// `RequirementSetRequirements`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementSetLink {
    #[serde(rename = "RequirementSetId", deserialize_with = "null_as_empty", default)]
    pub requirement_set_id: String,
    #[serde(
        rename = "RequirementId",
        alias = "requirementId",
        deserialize_with = "null_as_empty",
        default
    )]
    pub requirement_id: String,
}

/// `Requirements`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementRow {
    #[serde(
        rename = "RequirementId",
        alias = "requirementId",
        deserialize_with = "null_as_empty",
        default
    )]
    pub requirement_id: String,
    #[serde(rename = "RequirementType", deserialize_with = "null_as_empty", default)]
    pub requirement_type: String,
}

/// `RequirementArguments`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementArgumentRow {
    #[serde(
        rename = "RequirementId",
        alias = "requirementId",
        deserialize_with = "null_as_empty",
        default
    )]
    pub requirement_id: String,
    #[serde(rename = "Name", deserialize_with = "null_as_empty", default)]
    pub name: String,
    #[serde(rename = "Value", deserialize_with = "value_as_string", default)]
    pub value: String,
}

/// `ModifierArguments`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierArgumentRow {
    #[serde(
        rename = "ModifierId",
        alias = "ModifierID",
        deserialize_with = "null_as_empty",
        default
    )]
    pub modifier_id: String,
    #[serde(rename = "Name", deserialize_with = "null_as_empty", default)]
    pub name: String,
    #[serde(rename = "Value", deserialize_with = "value_as_string", default)]
    pub value: String,
}

/// `ModifierStrings`: localized text tags attached to a modifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierStringRow {
    #[serde(
        rename = "ModifierId",
        alias = "ModifierID",
        deserialize_with = "null_as_empty",
        default
    )]
    pub modifier_id: String,
    #[serde(rename = "Context", alias = "context", deserialize_with = "null_as_empty", default)]
    pub context: String,
    #[serde(rename = "Text", alias = "String", default)]
    pub text: Option<String>,
}

/// Query surface the engine needs from the host.
///
/// `None` means the host does not expose that table at all, which the
/// resolvers treat as "no rows" rather than a failure.
pub trait HostTables {
    fn rule_modifiers(&self) -> Option<&[RuleModifierLink]>;
    fn modifiers(&self) -> Option<&[ModifierRow]>;
    fn effect_types(&self) -> Option<&[EffectTypeRow]>;
    fn requirement_sets(&self) -> Option<&[RequirementSetRow]>;
    fn requirement_set_links(&self) -> Option<&[RequirementSetLink]>;
    fn requirements(&self) -> Option<&[RequirementRow]>;
    fn requirement_arguments(&self) -> Option<&[RequirementArgumentRow]>;
    fn modifier_arguments(&self) -> Option<&[ModifierArgumentRow]>;
    fn modifier_strings(&self) -> Option<&[ModifierStringRow]>;
}

/// A named, possibly-absent table supporting predicate lookups.
#[derive(Debug)]
pub struct TableView<'a, R> {
    name: &'static str,
    rows: Option<&'a [R]>,
}

impl<R> Clone for TableView<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for TableView<'_, R> {}

impl<'a, R> TableView<'a, R> {
    #[must_use]
    pub const fn new(name: &'static str, rows: Option<&'a [R]>) -> Self {
        Self { name, rows }
    }

    #[must_use]
    pub fn is_available(self) -> bool {
        self.rows.is_some()
    }

    /// Rows of the table, or [`ResolveError::TableUnavailable`].
    ///
    /// # Errors
    ///
    /// Returns an error when the host does not expose this table.
    pub fn require(self) -> Result<&'a [R], ResolveError> {
        self.rows.ok_or(ResolveError::TableUnavailable(self.name))
    }

    /// First row matching `predicate`; an absent table has no rows.
    pub fn find<P>(self, mut predicate: P) -> Option<&'a R>
    where
        P: FnMut(&R) -> bool,
    {
        self.rows?.iter().find(|row| predicate(*row))
    }

    /// Every row matching `predicate`, in table order.
    pub fn filter<P>(self, mut predicate: P) -> impl Iterator<Item = &'a R>
    where
        P: FnMut(&R) -> bool,
    {
        self.rows
            .unwrap_or_default()
            .iter()
            .filter(move |row| predicate(*row))
    }
}

/// Typed view accessors over a [`HostTables`] implementation.
#[derive(Clone, Copy)]
pub struct Tables<'a> {
    host: &'a dyn HostTables,
}

impl<'a> Tables<'a> {
    #[must_use]
    pub fn new(host: &'a dyn HostTables) -> Self {
        Self { host }
    }

    #[must_use]
    pub fn rule_modifiers(self) -> TableView<'a, RuleModifierLink> {
        TableView::new("TraditionModifiers", self.host.rule_modifiers())
    }

    #[must_use]
    pub fn modifiers(self) -> TableView<'a, ModifierRow> {
        TableView::new("Modifiers", self.host.modifiers())
    }

    #[must_use]
    pub fn effect_types(self) -> TableView<'a, EffectTypeRow> {
        TableView::new("DynamicModifiers", self.host.effect_types())
    }

    #[must_use]
    pub fn requirement_sets(self) -> TableView<'a, RequirementSetRow> {
        TableView::new("RequirementSets", self.host.requirement_sets())
    }

    #[must_use]
    pub fn requirement_set_links(self) -> TableView<'a, RequirementSetLink> {
        TableView::new(
            "RequirementSetRequirements",
            self.host.requirement_set_links(),
        )
    }

    #[must_use]
    pub fn requirements(self) -> TableView<'a, RequirementRow> {
        TableView::new("Requirements", self.host.requirements())
    }

    #[must_use]
    pub fn requirement_arguments(self) -> TableView<'a, RequirementArgumentRow> {
        TableView::new("RequirementArguments", self.host.requirement_arguments())
    }

    #[must_use]
    pub fn modifier_arguments(self) -> TableView<'a, ModifierArgumentRow> {
        TableView::new("ModifierArguments", self.host.modifier_arguments())
    }

    #[must_use]
    pub fn modifier_strings(self) -> TableView<'a, ModifierStringRow> {
        TableView::new("ModifierStrings", self.host.modifier_strings())
    }
}

/// Owned snapshot of the host tables, loadable from the JSON the host
/// exports (`{"Modifiers": [...], "RequirementSets": [...], ...}`).
///
/// A table key missing from the JSON stays `None`; an empty array is an
/// available table with no rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GameInfoTables {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tradition_modifiers: Option<Vec<RuleModifierLink>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<Vec<ModifierRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_modifiers: Option<Vec<EffectTypeRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement_sets: Option<Vec<RequirementSetRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement_set_requirements: Option<Vec<RequirementSetLink>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Vec<RequirementRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement_arguments: Option<Vec<RequirementArgumentRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier_arguments: Option<Vec<ModifierArgumentRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier_strings: Option<Vec<ModifierStringRow>>,
}

impl GameInfoTables {
    /// Load tables from a JSON object keyed by table name
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the table row shapes.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl HostTables for GameInfoTables {
    fn rule_modifiers(&self) -> Option<&[RuleModifierLink]> {
        self.tradition_modifiers.as_deref()
    }

    fn modifiers(&self) -> Option<&[ModifierRow]> {
        self.modifiers.as_deref()
    }

    fn effect_types(&self) -> Option<&[EffectTypeRow]> {
        self.dynamic_modifiers.as_deref()
    }

    fn requirement_sets(&self) -> Option<&[RequirementSetRow]> {
        self.requirement_sets.as_deref()
    }

    fn requirement_set_links(&self) -> Option<&[RequirementSetLink]> {
        self.requirement_set_requirements.as_deref()
    }

    fn requirements(&self) -> Option<&[RequirementRow]> {
        self.requirements.as_deref()
    }

    fn requirement_arguments(&self) -> Option<&[RequirementArgumentRow]> {
        self.requirement_arguments.as_deref()
    }

    fn modifier_arguments(&self) -> Option<&[ModifierArgumentRow]> {
        self.modifier_arguments.as_deref()
    }

    fn modifier_strings(&self) -> Option<&[ModifierStringRow]> {
        self.modifier_strings.as_deref()
    }
}
