//! Text composition: turning `LOC_*` identifiers into display strings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Host localization service.
///
/// Implementations return the identifier unchanged when they cannot resolve
/// it; callers read that as "composition failed".
pub trait TextComposer {
    fn compose(&self, tag: &str) -> String;
}

/// Composes `tag`, returning `None` when the composer is absent, the result
/// is empty, or the identifier came back unchanged.
#[must_use]
pub fn try_compose(composer: Option<&dyn TextComposer>, tag: &str) -> Option<String> {
    let text = composer?.compose(tag);
    (!text.is_empty() && text != tag).then_some(text)
}

/// Composes `tag`, falling back to the raw identifier.
#[must_use]
pub fn compose_or_raw(composer: Option<&dyn TextComposer>, tag: &str) -> String {
    try_compose(composer, tag).unwrap_or_else(|| tag.to_string())
}

/// Flat tag → text table, e.g. a host locale export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleTable {
    strings: HashMap<String, String>,
}

impl LocaleTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a `{ "LOC_TAG": "Text", ... }` object
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a flat string map.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn with(mut self, tag: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(tag, text);
        self
    }

    pub fn insert(&mut self, tag: impl Into<String>, text: impl Into<String>) {
        self.strings.insert(tag.into(), text.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl TextComposer for LocaleTable {
    fn compose(&self, tag: &str) -> String {
        self.strings
            .get(tag)
            .cloned()
            .unwrap_or_else(|| tag.to_string())
    }
}

impl<F> TextComposer for F
where
    F: Fn(&str) -> String,
{
    fn compose(&self, tag: &str) -> String {
        self(tag)
    }
}
