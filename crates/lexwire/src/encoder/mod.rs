//! Recursive conversion of domain values into JSON-safe trees.
//!
//! [`JsonEncoder::encode_to_json_safe`] dispatches on the value's shape:
//! plain containers and literals map onto JSON directly, byte strings are
//! tagged as text (`"*"`) or base64 binary (`"+"`), sets are wrapped in a
//! `{"type": "set"}` marker, and domain objects go through the renderer the
//! registry picks for them. Values nothing can encode degrade to `null` and
//! are logged rather than failing the whole tree.
//!
//! With compression enabled, [`JsonEncoder::encode`] additionally replaces
//! every literal with a lexicon id and marks compressed mappings with
//! `"_": 1`.

use std::rc::Rc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value as Json};
use tracing::error;

use crate::error::EncodeError;
use crate::lexicon::Lexicon;
use crate::registry::Registry;
use crate::renderer::{ID_FIELD, ObjectRenderer, SET_DATA_FIELD, SET_TYPE, TYPE_FIELD};
use crate::value::{Value, ValueMap};

/// Tag marking a byte string that is valid text.
pub const TEXT_TAG: &str = "*";

/// Tag marking a base64-encoded binary payload.
pub const BINARY_TAG: &str = "+";

/// Key marking a mapping whose keys and values are lexicon ids.
pub const COMPRESSION_MARKER: &str = "_";

/// Encoder session: registry, compression switch, and lexicon.
#[derive(Debug)]
pub struct JsonEncoder {
    registry: Rc<Registry>,
    compression: bool,
    lexicon: Lexicon,
}

impl JsonEncoder {
    /// Creates an encoder over a shared registry.
    #[must_use]
    pub fn new(registry: Rc<Registry>, compression: bool) -> Self {
        Self {
            registry,
            compression,
            lexicon: Lexicon::new(),
        }
    }

    /// Returns `true` when encoded values are compressed.
    #[must_use]
    pub const fn compression(&self) -> bool {
        self.compression
    }

    /// Returns the lexicon built up since the last flush.
    #[must_use]
    pub const fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Resets the lexicon so the next buffer starts from id `"1"`.
    pub fn flush(&mut self) {
        self.lexicon.clear();
    }

    /// Encodes `item`, compressing the result when compression is enabled.
    ///
    /// `type_name` forces a specific renderer instead of dispatching on the
    /// value's type; `null` is never forced through a renderer.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Lookup`] when `type_name` names no renderer and
    /// [`EncodeError::InvalidState`] when a renderer breaks its contract.
    pub fn encode(&mut self, item: &Value, type_name: Option<&str>) -> Result<Json, EncodeError> {
        let json_safe = self.encode_to_json_safe(item, type_name)?;
        if self.compression {
            return Ok(self.compress(&json_safe));
        }
        Ok(json_safe)
    }

    /// Converts `item` into a JSON-safe tree without compressing it.
    ///
    /// # Errors
    ///
    /// See [`JsonEncoder::encode`].
    pub fn encode_to_json_safe(
        &self,
        item: &Value,
        type_name: Option<&str>,
    ) -> Result<Json, EncodeError> {
        match type_name {
            Some(name) if !matches!(item, Value::Null) => {
                let renderer = self.registry.resolve_by_name(name)?;
                self.encode_state(renderer, item)
            }
            _ => self.encode_value(item),
        }
    }

    fn encode_value(&self, item: &Value) -> Result<Json, EncodeError> {
        match item {
            Value::Null => Ok(Json::Null),
            Value::Map(map) => self.encode_map(map),
            Value::List(items) => self.encode_list(items),
            Value::Bool(flag) => Ok(Json::Bool(*flag)),
            Value::Number(number) => Ok(Json::Number(number.clone())),
            Value::Text(text) => Ok(Json::String(text.clone())),
            Value::Bytes(bytes) => self.encode_bytes(bytes),
            Value::Set(items) => {
                let mut marker = Map::new();
                marker.insert(TYPE_FIELD.to_owned(), Json::from(SET_TYPE));
                marker.insert(SET_DATA_FIELD.to_owned(), self.encode_list(items)?);
                Ok(Json::Object(marker))
            }
            Value::Object(_) => match self.registry.resolve(item) {
                Some(renderer) => self.encode_state(renderer, item),
                None => Ok(degrade(item)),
            },
            Value::Opaque { .. } => Ok(degrade(item)),
        }
    }

    fn encode_map(&self, map: &ValueMap) -> Result<Json, EncodeError> {
        let mut result = Map::new();
        for (key, value) in map {
            result.insert(key.clone(), self.encode_value(value)?);
        }
        Ok(Json::Object(result))
    }

    fn encode_list(&self, items: &[Value]) -> Result<Json, EncodeError> {
        items
            .iter()
            .map(|item| self.encode_value(item))
            .collect::<Result<Vec<_>, _>>()
            .map(Json::Array)
    }

    fn encode_bytes(&self, bytes: &[u8]) -> Result<Json, EncodeError> {
        if let Ok(text) = std::str::from_utf8(bytes) {
            return Ok(Json::Array(vec![Json::from(TEXT_TAG), Json::from(text)]));
        }
        let payload = self.encode_value(&Value::Text(STANDARD.encode(bytes)))?;
        Ok(Json::Array(vec![Json::from(BINARY_TAG), payload]))
    }

    fn encode_state(&self, renderer: &dyn ObjectRenderer, item: &Value) -> Result<Json, EncodeError> {
        let mut state = match renderer.get_state(item) {
            Value::Map(state) => state,
            other => {
                return Err(EncodeError::InvalidState {
                    renderer: renderer.name().to_owned(),
                    found: other.kind_name(),
                });
            }
        };
        state.insert(TYPE_FIELD.to_owned(), Value::from(renderer.name()));
        if let Some(id) = item.object_id() {
            state.insert(ID_FIELD.to_owned(), Value::from(id));
        }
        self.encode_map(&state)
    }

    /// Replaces every literal in a JSON-safe tree with its lexicon id.
    ///
    /// Mappings keep their structure, gain the `"_": 1` marker, and have
    /// both keys and values compressed. Any other value, sequences included,
    /// is stored whole in the lexicon and replaced by its id.
    pub fn compress(&mut self, item: &Json) -> Json {
        match item {
            Json::Object(map) => {
                let mut result = Map::new();
                result.insert(COMPRESSION_MARKER.to_owned(), Json::from(1));
                for (key, value) in map {
                    let key_id = self.lexicon.id_for(&Json::String(key.clone()));
                    let compressed = self.compress(value);
                    result.insert(key_id, compressed);
                }
                Json::Object(result)
            }
            literal => Json::String(self.lexicon.id_for(literal)),
        }
    }
}

fn degrade(item: &Value) -> Json {
    error!(
        type_name = item.type_name(),
        kind = item.kind_name(),
        "unable to encode value; emitting null"
    );
    Json::Null
}

#[cfg(test)]
mod tests;
