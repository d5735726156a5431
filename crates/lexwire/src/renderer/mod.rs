//! The renderer contract: per-type encode and reconstruct logic.
//!
//! A renderer claims one or more type tags and turns matching items into a
//! state mapping on the way out, and turns a decoded state mapping back into
//! a value on the way in. The encoder stamps each state with the renderer's
//! name under [`TYPE_FIELD`] and the item's identity under [`ID_FIELD`]; the
//! decoder strips both again before calling [`ObjectRenderer::reconstruct`].

mod tree_node;

use serde_json::{Map, Value as Json};

use crate::error::DecodeError;
use crate::value::{Value, ValueMap};

pub use self::tree_node::{TreeNode, TreeNodeRenderer};

/// Field carrying the renderer name in an encoded state mapping.
pub const TYPE_FIELD: &str = "type";

/// Field carrying the stable identity in an encoded state mapping.
pub const ID_FIELD: &str = "id";

/// Reserved type name marking an encoded set.
pub const SET_TYPE: &str = "set";

/// Field holding the members of an encoded set.
pub const SET_DATA_FIELD: &str = "data";

/// Options a renderer may hand back to the caller while decoding.
pub type DecodeOptions = ValueMap;

/// Encode and reconstruct logic for one family of domain types.
pub trait ObjectRenderer {
    /// Stable name written to the `"type"` field.
    fn name(&self) -> &str;

    /// Type tags this renderer claims.
    fn renders_types(&self) -> &[&str];

    /// Identity cache key for an already-encoded state mapping.
    fn cache_key(&self, encoded: &Map<String, Json>) -> Option<String> {
        default_cache_key(encoded)
    }

    /// Produces the renderer-specific fields for `item`.
    ///
    /// Anything other than [`Value::Map`] is a renderer bug and fails the
    /// encode.
    fn get_state(&self, item: &Value) -> Value;

    /// Rebuilds a value from its decoded state.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when the state lacks fields the renderer
    /// needs.
    fn reconstruct(&self, state: ValueMap, options: &mut DecodeOptions)
    -> Result<Value, DecodeError>;
}

/// Reads the cache key from the `"id"` field of an encoded state.
#[must_use]
pub fn default_cache_key(encoded: &Map<String, Json>) -> Option<String> {
    encoded
        .get(ID_FIELD)
        .filter(|id| !id.is_null())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests;
