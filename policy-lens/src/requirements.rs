//! Requirement set expansion.
//!
//! A requirement set id expands to its `RequirementSets` row plus every
//! requirement joined through `RequirementSetRequirements`, each carrying its
//! raw `RequirementArguments`.

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
use crate::tables::{RequirementSetLink, Tables};

/// Name/value pair from an argument table, left unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub value: String,
}

impl Argument {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub requirement_id: String,
    pub requirement_type: String,
    pub arguments: Vec<Argument>,
}

/// Expanded requirement set. An empty `requirements` list is still a valid
/// set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementSet {
    pub set_id: String,
    pub set_type: String,
    pub requirements: Vec<Requirement>,
}

impl RequirementSet {
    /// True when any requirement's type passes `allowed`. The set's own
    /// combination type is not consulted.
    pub fn any_requirement<P>(&self, mut allowed: P) -> bool
    where
        P: FnMut(&str) -> bool,
    {
        self.requirements
            .iter()
            .any(|req| allowed(&req.requirement_type))
    }
}

#[derive(Clone, Copy)]
pub struct RequirementSetResolver<'a> {
    tables: Tables<'a>,
}

impl<'a> RequirementSetResolver<'a> {
    #[must_use]
    pub const fn new(tables: Tables<'a>) -> Self {
        Self { tables }
    }

    /// Expand `set_id`, or `None` when there is no id, a table is missing,
    /// or the set does not exist (the last case is logged).
    #[must_use]
    pub fn resolve_requirement_set(&self, set_id: Option<&str>) -> Option<RequirementSet> {
        match self.try_resolve(set_id) {
            Ok(set) => Some(set),
            Err(err) => {
                if err.is_missing_row() {
                    log::error!(target: "policy_lens", "{err}");
                } else {
                    log::debug!(target: "policy_lens", "requirement set skipped: {err}");
                }
                None
            }
        }
    }

    /// Expand `set_id`, reporting why nothing could be produced.
    ///
    /// Join rows that point at a missing requirement are logged and left out;
    /// their siblings still resolve.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty, a required table is unavailable,
    /// or no `RequirementSets` row matches.
    pub fn try_resolve(&self, set_id: Option<&str>) -> Result<RequirementSet, ResolveError> {
        let set_id = set_id
            .filter(|id| !id.is_empty())
            .ok_or(ResolveError::MissingId("requirement set"))?;

        let sets = self.tables.requirement_sets();
        let links = self.tables.requirement_set_links();
        let requirements = self.tables.requirements();
        sets.require()?;
        links.require()?;
        requirements.require()?;

        let set_row = sets
            .find(|rs| rs.requirement_set_id == set_id)
            .ok_or_else(|| ResolveError::RequirementSetNotFound(set_id.to_string()))?;

        let requirements = links
            .filter(|link| link.requirement_set_id == set_id)
            .filter_map(|link| match self.resolve_requirement(link) {
                Ok(req) => Some(req),
                Err(err) => {
                    log::error!(target: "policy_lens", "{err}");
                    None
                }
            })
            .collect();

        Ok(RequirementSet {
            set_id: set_row.requirement_set_id.clone(),
            set_type: set_row.requirement_set_type.clone(),
            requirements,
        })
    }

    fn resolve_requirement(&self, link: &RequirementSetLink) -> Result<Requirement, ResolveError> {
        let row = self
            .tables
            .requirements()
            .find(|r| !link.requirement_id.is_empty() && r.requirement_id == link.requirement_id)
            .ok_or_else(|| ResolveError::RequirementNotFound {
                set_id: link.requirement_set_id.clone(),
                requirement_id: link.requirement_id.clone(),
            })?;

        let arguments = self
            .tables
            .requirement_arguments()
            .filter(|ra| ra.requirement_id == row.requirement_id)
            .map(|ra| Argument::new(&ra.name, &ra.value))
            .collect();

        Ok(Requirement {
            requirement_id: row.requirement_id.clone(),
            requirement_type: row.requirement_type.clone(),
            arguments,
        })
    }
}
