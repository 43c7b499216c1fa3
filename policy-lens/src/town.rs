//! Town-focus improvement summaries.
//!
//! Counts a city's placed improvements that feed a town focus (farming or
//! mining towns) and scales the count by the current age.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::locale::{TextComposer, compose_or_raw};

/// Per-age bonus added to the base multiplier.
#[must_use]
pub fn era_multiplier(age_type: Option<&str>, base: u32) -> u32 {
    match age_type.map(str::trim) {
        Some("AGE_EXPLORATION") => base + 1,
        Some("AGE_MODERN") => base + 2,
        _ => base,
    }
}

/// One decimal place, dropping the fraction when it rounds to a whole number.
/// Halves round toward positive infinity, and negative zero prints as `0`.
#[must_use]
pub fn fmt1(x: f64) -> String {
    let v = (x * 10.0 + 0.5).floor() / 10.0;
    if v == 0.0 {
        return "0".to_string();
    }
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round())
    } else {
        format!("{v:.1}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TownFocus {
    Food,
    Production,
}

impl TownFocus {
    #[must_use]
    pub const fn yield_type(self) -> &'static str {
        match self {
            Self::Food => "YIELD_FOOD",
            Self::Production => "YIELD_PRODUCTION",
        }
    }
}

/// Improvement display names and the target set for each focus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovementCatalog {
    #[serde(default = "ImprovementCatalog::default_display_names")]
    pub display_names: HashMap<String, String>,
    #[serde(default = "ImprovementCatalog::default_food")]
    pub food: BTreeSet<String>,
    #[serde(default = "ImprovementCatalog::default_production")]
    pub production: BTreeSet<String>,
}

impl ImprovementCatalog {
    fn default_display_names() -> HashMap<String, String> {
        [
            ("IMPROVEMENT_WOODCUTTER", "LOC_MOD_ETFI_IMPROVEMENT_WOODCUTTER"),
            ("IMPROVEMENT_WOODCUTTER_RESOURCE", "LOC_MOD_ETFI_IMPROVEMENT_WOODCUTTER"),
            ("IMPROVEMENT_MINE", "LOC_MOD_ETFI_IMPROVEMENT_MINE"),
            ("IMPROVEMENT_MINE_RESOURCE", "LOC_MOD_ETFI_IMPROVEMENT_MINE"),
            ("IMPROVEMENT_FISHING_BOAT", "LOC_MOD_ETFI_IMPROVEMENT_FISHING_BOAT"),
            ("IMPROVEMENT_FISHING_BOAT_RESOURCE", "LOC_MOD_ETFI_IMPROVEMENT_FISHING_BOAT"),
            ("IMPROVEMENT_FARM", "LOC_MOD_ETFI_IMPROVEMENT_FARM"),
            ("IMPROVEMENT_PASTURE", "LOC_MOD_ETFI_IMPROVEMENT_PASTURE"),
            ("IMPROVEMENT_PLANTATION", "LOC_MOD_ETFI_IMPROVEMENT_PLANTATION"),
            ("IMPROVEMENT_CAMP", "LOC_MOD_ETFI_IMPROVEMENT_CAMP"),
            ("IMPROVEMENT_CLAY_PIT", "LOC_MOD_ETFI_IMPROVEMENT_CLAY_PIT"),
            ("IMPROVEMENT_QUARRY", "LOC_MOD_ETFI_IMPROVEMENT_QUARRY"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn default_food() -> BTreeSet<String> {
        [
            "IMPROVEMENT_FARM",
            "IMPROVEMENT_PASTURE",
            "IMPROVEMENT_PLANTATION",
            "IMPROVEMENT_FISHING_BOAT",
            "IMPROVEMENT_FISHING_BOAT_RESOURCE",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    fn default_production() -> BTreeSet<String> {
        [
            "IMPROVEMENT_CAMP",
            "IMPROVEMENT_WOODCUTTER",
            "IMPROVEMENT_WOODCUTTER_RESOURCE",
            "IMPROVEMENT_CLAY_PIT",
            "IMPROVEMENT_MINE",
            "IMPROVEMENT_MINE_RESOURCE",
            "IMPROVEMENT_QUARRY",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    #[must_use]
    pub const fn targets(&self, focus: TownFocus) -> &BTreeSet<String> {
        match focus {
            TownFocus::Food => &self.food,
            TownFocus::Production => &self.production,
        }
    }
}

impl Default for ImprovementCatalog {
    fn default() -> Self {
        Self {
            display_names: Self::default_display_names(),
            food: Self::default_food(),
            production: Self::default_production(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotLocation {
    pub x: i32,
    pub y: i32,
}

/// An improvement instance in a city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedImprovement {
    /// Type of the placed instance (may be a `_RESOURCE` variant).
    #[serde(rename = "ConstructibleType")]
    pub constructible_type: String,
    /// Type the host reports for the plot's free constructible; this is what
    /// the focus counts.
    #[serde(rename = "FreeConstructibleType", default)]
    pub logical_type: Option<String>,
    #[serde(rename = "Name", default)]
    pub name_tag: Option<String>,
    #[serde(rename = "Location", default)]
    pub location: Option<PlotLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementLine {
    pub key: String,
    pub ctype: String,
    pub display_name: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementSummary {
    pub items: Vec<ImprovementLine>,
    pub base_count: u32,
    pub multiplier: u32,
    pub total: u32,
}

/// Groups matching improvements by display key and applies the age
/// multiplier. `None` when nothing in `targets` is placed.
#[must_use]
pub fn summarize_improvements(
    placed: &[PlacedImprovement],
    targets: &BTreeSet<String>,
    catalog: &ImprovementCatalog,
    composer: Option<&dyn TextComposer>,
    base_multiplier: u32,
    age_type: Option<&str>,
) -> Option<ImprovementSummary> {
    if targets.is_empty() {
        return None;
    }

    let mut items: Vec<ImprovementLine> = Vec::new();
    for improvement in placed {
        if improvement.location.is_none() {
            continue;
        }
        let Some(logical) = improvement.logical_type.as_deref() else {
            continue;
        };
        if !targets.contains(logical) {
            continue;
        }

        let ctype = if improvement.constructible_type.is_empty() {
            logical
        } else {
            improvement.constructible_type.as_str()
        };
        let key = catalog
            .display_names
            .get(ctype)
            .map(String::as_str)
            .or(improvement.name_tag.as_deref())
            .unwrap_or(ctype);

        if let Some(line) = items.iter_mut().find(|line| line.key == key) {
            line.count += 1;
        } else {
            items.push(ImprovementLine {
                key: key.to_string(),
                ctype: ctype.to_string(),
                display_name: compose_or_raw(composer, key),
                count: 1,
            });
        }
    }

    if items.is_empty() {
        return None;
    }

    let base_count = items.iter().map(|line| line.count).sum();
    let multiplier = era_multiplier(age_type, base_multiplier);
    Some(ImprovementSummary {
        items,
        base_count,
        multiplier,
        total: base_count * multiplier,
    })
}
