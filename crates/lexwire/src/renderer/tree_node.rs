//! Wrapper renderer that carries presentation options next to a value.

use crate::error::DecodeError;
use crate::value::{DomainObject, Value, ValueMap};

use super::{DecodeOptions, ObjectRenderer};

const CHILD_FIELD: &str = "child";

/// A value annotated with presentation options such as tree depth.
#[derive(Debug, Clone)]
pub struct TreeNode {
    child: Value,
    options: ValueMap,
}

impl TreeNode {
    /// Wraps `child` with no options.
    #[must_use]
    pub fn new(child: Value) -> Self {
        Self {
            child,
            options: ValueMap::new(),
        }
    }

    /// Attaches one option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Returns the wrapped value.
    #[must_use]
    pub const fn child(&self) -> &Value {
        &self.child
    }

    /// Returns the attached options.
    #[must_use]
    pub const fn options(&self) -> &ValueMap {
        &self.options
    }
}

impl DomainObject for TreeNode {
    fn type_tags(&self) -> &[&'static str] {
        &["TreeNode"]
    }
}

/// Encodes a [`TreeNode`] as its options plus a `"child"` field.
///
/// Used as a column override it wraps any cell value. Decoding returns the
/// child itself and merges the remaining fields into the decode options.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeNodeRenderer;

impl ObjectRenderer for TreeNodeRenderer {
    fn name(&self) -> &str {
        "TreeNode"
    }

    fn renders_types(&self) -> &[&str] {
        &["TreeNode"]
    }

    fn get_state(&self, item: &Value) -> Value {
        let mut state = ValueMap::new();
        match item.downcast_ref::<TreeNode>() {
            Some(node) => {
                state.extend(node.options.clone());
                state.insert(CHILD_FIELD.to_owned(), node.child.clone());
            }
            None => {
                state.insert(CHILD_FIELD.to_owned(), item.clone());
            }
        }
        Value::Map(state)
    }

    fn reconstruct(
        &self,
        mut state: ValueMap,
        options: &mut DecodeOptions,
    ) -> Result<Value, DecodeError> {
        let child = state
            .remove(CHILD_FIELD)
            .ok_or_else(|| DecodeError::reconstruct(self.name(), "missing 'child' field"))?;
        options.extend(state);
        Ok(child)
    }
}
