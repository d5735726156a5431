//! Renderer capability registry.
//!
//! The [`Registry`] owns the renderers a session knows about and answers two
//! questions: which renderer encodes a given domain object, and which
//! renderer a previously encoded `"type"` field names. Dispatch walks the
//! object's type tags most specific first; when several renderers claim the
//! same tag, the one registered first wins.

use std::collections::HashMap;
use std::fmt;

use crate::error::{LookupError, RegistryError};
use crate::renderer::{ObjectRenderer, SET_TYPE, TreeNodeRenderer};
use crate::value::Value;

/// Ordered table of renderer capabilities.
///
/// # Example
///
/// ```
/// use lexwire::{Registry, TreeNode, TreeNodeRenderer, Value};
///
/// let mut registry = Registry::new();
/// registry.register(TreeNodeRenderer).expect("registration succeeds");
///
/// let node = Value::object(TreeNode::new(Value::from("child")));
/// let renderer = registry.resolve(&node).expect("tree nodes have a renderer");
/// assert_eq!(renderer.name(), "TreeNode");
/// assert!(registry.resolve_by_name("Missing").is_err());
/// ```
#[derive(Default)]
pub struct Registry {
    renderers: Vec<Box<dyn ObjectRenderer>>,
    by_name: HashMap<String, usize>,
    by_type: HashMap<String, Vec<usize>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the renderers this crate ships.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert(Box::new(TreeNodeRenderer));
        registry
    }

    /// Registers a renderer after validating its name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the name is blank, reserved by the wire
    /// format, or already registered.
    pub fn register<R>(&mut self, renderer: R) -> Result<(), RegistryError>
    where
        R: ObjectRenderer + 'static,
    {
        let name = renderer.name();
        if name.trim().is_empty() {
            return Err(RegistryError::BlankName);
        }
        if name == SET_TYPE {
            return Err(RegistryError::ReservedName {
                name: name.to_owned(),
            });
        }
        if self.by_name.contains_key(name) {
            return Err(RegistryError::Duplicate {
                name: name.to_owned(),
            });
        }
        self.insert(Box::new(renderer));
        Ok(())
    }

    fn insert(&mut self, renderer: Box<dyn ObjectRenderer>) {
        let index = self.renderers.len();
        self.by_name.insert(renderer.name().to_owned(), index);
        for tag in renderer.renders_types() {
            self.by_type.entry((*tag).to_owned()).or_default().push(index);
        }
        self.renderers.push(renderer);
    }

    /// Picks the renderer for a domain object.
    ///
    /// Only [`Value::Object`] values dispatch through the registry; every
    /// other shape is handled by the encoder itself and yields `None`.
    #[must_use]
    pub fn resolve(&self, value: &Value) -> Option<&dyn ObjectRenderer> {
        let object = value.as_object()?;
        self.resolve_tags(object.type_tags())
    }

    /// Picks the renderer for an ordered list of type tags.
    #[must_use]
    pub fn resolve_tags(&self, tags: &[&str]) -> Option<&dyn ObjectRenderer> {
        tags.iter()
            .find_map(|tag| self.by_type.get(*tag).and_then(|indices| indices.first()))
            .and_then(|index| self.renderers.get(*index))
            .map(|renderer| renderer.as_ref())
    }

    /// Looks a renderer up by its stable name.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when no renderer carries `name`.
    pub fn resolve_by_name(&self, name: &str) -> Result<&dyn ObjectRenderer, LookupError> {
        self.by_name
            .get(name)
            .and_then(|index| self.renderers.get(*index))
            .map(|renderer| renderer.as_ref())
            .ok_or_else(|| LookupError::new(name))
    }

    /// Names of the registered renderers in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.renderers.iter().map(|renderer| renderer.name()).collect()
    }

    /// Returns the number of registered renderers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    /// Returns `true` when no renderers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Registry")
            .field("renderers", &self.names())
            .finish()
    }
}
