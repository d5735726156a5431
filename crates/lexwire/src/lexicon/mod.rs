//! Per-stream dictionary mapping small integer ids to JSON-safe values.
//!
//! Ids are decimal strings assigned monotonically from `"1"`. They are never
//! reused within a session and only reset by [`Lexicon::clear`]. Lookups in
//! the value-to-id direction are equality based: two equal values always map
//! to the same id.

use std::collections::HashMap;

use serde_json::{Map, Value as Json};

use crate::error::DecodeError;

/// Bidirectional id/value dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lexicon {
    entries: Map<String, Json>,
    reverse: HashMap<String, String>,
    counter: u64,
}

impl Lexicon {
    /// Creates an empty lexicon.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `value`, allocating the next id if it is new.
    pub fn id_for(&mut self, value: &Json) -> String {
        let canonical = value.to_string();
        if let Some(id) = self.reverse.get(&canonical) {
            return id.clone();
        }
        self.counter += 1;
        let id = self.counter.to_string();
        self.entries.insert(id.clone(), value.clone());
        self.reverse.insert(canonical, id.clone());
        id
    }

    /// Looks a value up by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Json> {
        self.entries.get(id)
    }

    /// Resolves an id that arrived on the wire as a string or an integer.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::LexiconCorruption`] when the id is not present.
    pub fn resolve(&self, id: &Json) -> Result<&Json, DecodeError> {
        let key = match id {
            Json::String(text) => text.clone(),
            Json::Number(number) => number.to_string(),
            other => {
                return Err(DecodeError::malformed(format!(
                    "lexicon ids are strings or integers, found {other}"
                )));
            }
        };
        self.entries
            .get(&key)
            .ok_or_else(|| DecodeError::corruption(key))
    }

    /// Drops every entry and restarts id allocation at `"1"`.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.reverse.clear();
        self.counter = 0;
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the lexicon holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the id-to-value table as sent in a lexicon command.
    #[must_use]
    pub fn to_json(&self) -> Json {
        Json::Object(self.entries.clone())
    }

    /// Rebuilds a lexicon from a received id-to-value table.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Malformed`] when the table is not a mapping or
    /// an id is not a positive decimal integer.
    pub fn from_json(table: Json) -> Result<Self, DecodeError> {
        let Json::Object(entries) = table else {
            return Err(DecodeError::malformed("lexicon table must be a mapping"));
        };
        let mut lexicon = Self::new();
        for (id, value) in entries {
            let position: u64 = id
                .parse()
                .ok()
                .filter(|position| *position > 0)
                .ok_or_else(|| DecodeError::malformed(format!("invalid lexicon id '{id}'")))?;
            lexicon.counter = lexicon.counter.max(position);
            lexicon.reverse.insert(value.to_string(), id.clone());
            lexicon.entries.insert(id, value);
        }
        Ok(lexicon)
    }
}

#[cfg(test)]
mod tests;
