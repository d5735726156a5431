//! Decompression and reconstruction of encoded trees.
//!
//! Decoding runs in two stages. [`JsonDecoder::decompress`] resolves lexicon
//! ids back into the JSON-safe tree the encoder produced; a missing id is
//! treated as stream corruption and never guessed around.
//! [`JsonDecoder::decode`] then walks that tree: mappings carrying a
//! `"type"` field go to the named renderer, with the identity cache
//! consulted first, and everything else is inverted structurally.

use std::num::NonZeroUsize;
use std::rc::Rc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value as Json};

use crate::cache::{CacheKey, CacheLookup, IdentityCache};
use crate::encoder::{BINARY_TAG, COMPRESSION_MARKER, TEXT_TAG};
use crate::error::DecodeError;
use crate::lexicon::Lexicon;
use crate::registry::Registry;
use crate::renderer::{DecodeOptions, ID_FIELD, SET_DATA_FIELD, SET_TYPE, TYPE_FIELD};
use crate::value::{Value, ValueMap};

/// Decoder session: registry, current lexicon, and identity cache.
#[derive(Debug)]
pub struct JsonDecoder {
    registry: Rc<Registry>,
    lexicon: Lexicon,
    cache: IdentityCache,
}

impl JsonDecoder {
    /// Creates a decoder over a shared registry.
    #[must_use]
    pub fn new(registry: Rc<Registry>, cache_capacity: NonZeroUsize) -> Self {
        Self {
            registry,
            lexicon: Lexicon::new(),
            cache: IdentityCache::new(cache_capacity),
        }
    }

    /// Installs the lexicon that subsequent compressed trees refer to.
    pub fn set_lexicon(&mut self, lexicon: Lexicon) {
        self.lexicon = lexicon;
    }

    /// Returns the installed lexicon.
    #[must_use]
    pub const fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Returns the identity cache.
    #[must_use]
    pub const fn cache(&self) -> &IdentityCache {
        &self.cache
    }

    /// Inverts the encoder's compression pass.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::LexiconCorruption`] when the tree references an
    /// id the lexicon does not hold, and [`DecodeError::Malformed`] when a
    /// compressed key does not resolve to text.
    pub fn decompress(&self, tree: &Json) -> Result<Json, DecodeError> {
        match tree {
            Json::Object(map) if is_compressed(map) => {
                let mut state = Map::new();
                for (key, value) in map {
                    if key == COMPRESSION_MARKER {
                        continue;
                    }
                    let decoded_key = match self.lexicon.resolve(&Json::String(key.clone()))? {
                        Json::String(text) => text.clone(),
                        other => {
                            return Err(DecodeError::malformed(format!(
                                "compressed key '{key}' resolves to non-text {other}"
                            )));
                        }
                    };
                    let decoded_value = match value {
                        Json::Object(inner) if is_compressed(inner) => self.decompress(value)?,
                        id => self.lexicon.resolve(id)?.clone(),
                    };
                    state.insert(decoded_key, decoded_value);
                }
                Ok(Json::Object(state))
            }
            id => self.lexicon.resolve(id).cloned(),
        }
    }

    /// Decompresses and then decodes a compressed tree.
    ///
    /// # Errors
    ///
    /// See [`JsonDecoder::decompress`] and [`JsonDecoder::decode`].
    pub fn decode_compressed(
        &mut self,
        tree: &Json,
        options: &mut DecodeOptions,
    ) -> Result<Value, DecodeError> {
        let json_safe = self.decompress(tree)?;
        self.decode(&json_safe, options)
    }

    /// Reconstructs a domain value from a JSON-safe tree.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Lookup`] when a `"type"` field names an unknown
    /// renderer, [`DecodeError::Malformed`] or [`DecodeError::Base64`] when a
    /// tagged form is broken, and whatever a renderer's reconstruction
    /// reports.
    pub fn decode(&mut self, value: &Json, options: &mut DecodeOptions) -> Result<Value, DecodeError> {
        match value {
            Json::Null => Ok(Value::Null),
            Json::Bool(flag) => Ok(Value::Bool(*flag)),
            Json::Number(number) => Ok(Value::Number(number.clone())),
            Json::String(text) => Ok(Value::Text(text.clone())),
            Json::Array(items) => self.decode_sequence(items, options),
            Json::Object(map) => match map.get(TYPE_FIELD) {
                None => self.decode_map(map, options),
                Some(Json::String(name)) if name == SET_TYPE => self.decode_set(map, options),
                Some(Json::String(name)) => self.decode_state(name, map, options),
                Some(other) => Err(DecodeError::malformed(format!(
                    "'type' field must be text, found {other}"
                ))),
            },
        }
    }

    fn decode_sequence(
        &mut self,
        items: &[Json],
        options: &mut DecodeOptions,
    ) -> Result<Value, DecodeError> {
        if let [tag, payload] = items {
            match tag.as_str() {
                Some(TEXT_TAG) => {
                    let text = payload
                        .as_str()
                        .ok_or_else(|| DecodeError::malformed("text payload must be a string"))?;
                    return Ok(Value::Bytes(text.as_bytes().to_vec()));
                }
                Some(BINARY_TAG) => {
                    let encoded = payload
                        .as_str()
                        .ok_or_else(|| DecodeError::malformed("binary payload must be a string"))?;
                    return STANDARD
                        .decode(encoded)
                        .map(Value::Bytes)
                        .map_err(|source| DecodeError::Base64 { source });
                }
                _ => {}
            }
        }
        items
            .iter()
            .map(|item| self.decode(item, options))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List)
    }

    fn decode_map(
        &mut self,
        map: &Map<String, Json>,
        options: &mut DecodeOptions,
    ) -> Result<Value, DecodeError> {
        let mut result = ValueMap::new();
        for (key, value) in map {
            result.insert(key.clone(), self.decode(value, options)?);
        }
        Ok(Value::Map(result))
    }

    fn decode_set(
        &mut self,
        map: &Map<String, Json>,
        options: &mut DecodeOptions,
    ) -> Result<Value, DecodeError> {
        let Some(Json::Array(items)) = map.get(SET_DATA_FIELD) else {
            return Err(DecodeError::malformed("set marker without a 'data' sequence"));
        };
        items
            .iter()
            .map(|item| self.decode(item, options))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Set)
    }

    fn decode_state(
        &mut self,
        name: &str,
        map: &Map<String, Json>,
        options: &mut DecodeOptions,
    ) -> Result<Value, DecodeError> {
        let registry = Rc::clone(&self.registry);
        let renderer = registry.resolve_by_name(name)?;

        let key = renderer
            .cache_key(map)
            .map(|key| CacheKey::new(renderer.name(), key));
        if let Some(key) = &key
            && let CacheLookup::Found(cached) = self.cache.lookup(key)
        {
            return Ok(cached);
        }

        let mut state = ValueMap::new();
        for (field, value) in map {
            if field == TYPE_FIELD || field == ID_FIELD {
                continue;
            }
            state.insert(field.clone(), self.decode(value, options)?);
        }
        let result = renderer.reconstruct(state, options)?;

        if let Some(key) = key {
            self.cache.insert(key, result.clone());
        }
        Ok(result)
    }
}

fn is_compressed(map: &Map<String, Json>) -> bool {
    map.get(COMPRESSION_MARKER).and_then(Json::as_u64) == Some(1)
}
