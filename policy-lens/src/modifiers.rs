//! Modifier expansion: base row, effect type, both requirement sets,
//! arguments and description text.

use serde::Serialize;

use crate::error::ResolveError;
use crate::locale::{TextComposer, try_compose};
use crate::requirements::{Argument, RequirementSet, RequirementSetResolver};
use crate::tables::{EffectTypeRow, ModifierRow, Tables};

/// Fully joined view of one modifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedModifier {
    pub base: ModifierRow,
    pub effect_type: Option<EffectTypeRow>,
    pub subject_requirement_set: Option<RequirementSet>,
    pub owner_requirement_set: Option<RequirementSet>,
    pub arguments: Vec<Argument>,
    pub description_tag: Option<String>,
    pub description_text: Option<String>,
}

impl ResolvedModifier {
    #[must_use]
    pub fn modifier_id(&self) -> &str {
        &self.base.modifier_id
    }

    /// First argument named `name`.
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

pub struct ModifierResolver<'a> {
    tables: Tables<'a>,
    sets: RequirementSetResolver<'a>,
    composer: Option<&'a dyn TextComposer>,
    description_context: &'a str,
}

impl<'a> ModifierResolver<'a> {
    #[must_use]
    pub fn new(
        tables: Tables<'a>,
        composer: Option<&'a dyn TextComposer>,
        description_context: &'a str,
    ) -> Self {
        Self {
            tables,
            sets: RequirementSetResolver::new(tables),
            composer,
            description_context,
        }
    }

    /// Expand `modifier_id`, or `None` when it is blank, the `Modifiers`
    /// table is missing, or no row matches (logged).
    #[must_use]
    pub fn resolve_modifier_by_id(&self, modifier_id: &str) -> Option<ResolvedModifier> {
        match self.try_resolve(modifier_id) {
            Ok(resolved) => Some(resolved),
            Err(err) => {
                if err.is_missing_row() {
                    log::error!(target: "policy_lens", "{err}");
                } else {
                    log::debug!(target: "policy_lens", "modifier skipped: {err}");
                }
                None
            }
        }
    }

    /// Expand `modifier_id`, reporting why nothing could be produced.
    ///
    /// A missing effect type is logged and leaves `effect_type` empty; the
    /// rest of the modifier still resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is blank, `Modifiers` is unavailable, or
    /// the modifier does not exist.
    pub fn try_resolve(&self, modifier_id: &str) -> Result<ResolvedModifier, ResolveError> {
        if modifier_id.is_empty() {
            return Err(ResolveError::MissingId("modifier"));
        }

        let base = self
            .tables
            .modifiers()
            .require()?
            .iter()
            .find(|m| m.modifier_id == modifier_id)
            .ok_or_else(|| ResolveError::ModifierNotFound(modifier_id.to_string()))?;

        let effect_type = self.effect_type_for(base).map_or_else(
            |err| {
                log::error!(target: "policy_lens", "{err}");
                None
            },
            |row| Some(row.clone()),
        );

        let subject_requirement_set = self
            .sets
            .resolve_requirement_set(base.subject_requirement_set_id.as_deref());
        let owner_requirement_set = self
            .sets
            .resolve_requirement_set(base.owner_requirement_set_id.as_deref());

        let arguments = self
            .tables
            .modifier_arguments()
            .filter(|ma| ma.modifier_id == modifier_id)
            .map(|ma| Argument::new(&ma.name, &ma.value))
            .collect();

        let (description_tag, description_text) = self.description_for(modifier_id);

        Ok(ResolvedModifier {
            base: base.clone(),
            effect_type,
            subject_requirement_set,
            owner_requirement_set,
            arguments,
            description_tag,
            description_text,
        })
    }

    fn effect_type_for(&self, base: &ModifierRow) -> Result<&'a EffectTypeRow, ResolveError> {
        self.tables
            .effect_types()
            .find(|dm| !base.modifier_type.is_empty() && dm.modifier_type == base.modifier_type)
            .ok_or_else(|| ResolveError::EffectTypeNotFound {
                effect_type: base.modifier_type.clone(),
                modifier_id: base.modifier_id.clone(),
            })
    }

    fn description_for(&self, modifier_id: &str) -> (Option<String>, Option<String>) {
        let tag = self
            .tables
            .modifier_strings()
            .filter(|ms| ms.modifier_id == modifier_id)
            .find(|ms| ms.context == self.description_context)
            .and_then(|ms| ms.text.clone());

        let text = tag
            .as_deref()
            .filter(|tag| !tag.is_empty())
            .and_then(|tag| try_compose(self.composer, tag));
        (tag, text)
    }
}
