//! Dynamically-typed domain values handed to the encoder and returned by the
//! decoder.
//!
//! [`Value`] is the closed set of shapes the encoder distinguishes. Stateful
//! domain objects live behind [`Value::Object`] and describe themselves
//! through the [`DomainObject`] trait: an ordered list of type tags used for
//! renderer dispatch and an optional stable identity used for caching.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Number;

/// Plain mapping with unique string keys.
pub type ValueMap = BTreeMap<String, Value>;

/// A stateful domain object that renderers know how to encode.
///
/// # Example
///
/// ```
/// use lexwire::DomainObject;
///
/// #[derive(Debug)]
/// struct Process {
///     pid: u64,
/// }
///
/// impl DomainObject for Process {
///     fn type_tags(&self) -> &[&'static str] {
///         &["Process", "BaseObject"]
///     }
///
///     fn object_id(&self) -> Option<u64> {
///         Some(self.pid)
///     }
/// }
/// ```
pub trait DomainObject: Any + fmt::Debug {
    /// Type tags describing the object, most specific first.
    ///
    /// The registry walks this list in order and picks the first tag any
    /// renderer claims.
    fn type_tags(&self) -> &[&'static str];

    /// Stable identity of the object, if it has one.
    fn object_id(&self) -> Option<u64> {
        None
    }
}

/// A domain value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Integer or floating point literal.
    Number(Number),
    /// Unicode text.
    Text(String),
    /// Raw bytes that may or may not be valid UTF-8.
    Bytes(Vec<u8>),
    /// Ordered sequence.
    List(Vec<Value>),
    /// Plain mapping.
    Map(ValueMap),
    /// Unordered collection.
    Set(Vec<Value>),
    /// Shared handle to a stateful domain object.
    Object(Rc<dyn DomainObject>),
    /// Incidental value with no serialisable form.
    Opaque {
        /// Name of the value's type, used for logging.
        type_name: String,
    },
}

impl Value {
    /// Wraps a domain object.
    #[must_use]
    pub fn object<T: DomainObject>(object: T) -> Self {
        Self::Object(Rc::new(object))
    }

    /// Creates an opaque value that will encode as `null`.
    #[must_use]
    pub fn opaque(type_name: impl Into<String>) -> Self {
        Self::Opaque {
            type_name: type_name.into(),
        }
    }

    /// Short name of the value's shape, used in errors and log records.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Set(_) => "set",
            Self::Object(_) => "object",
            Self::Opaque { .. } => "opaque",
        }
    }

    /// Most descriptive type name available for the value.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Object(object) => object.type_tags().first().copied().unwrap_or("object"),
            Self::Opaque { type_name } => type_name.as_str(),
            other => other.kind_name(),
        }
    }

    /// Returns the domain object handle, if this is an object.
    #[must_use]
    pub const fn as_object(&self) -> Option<&Rc<dyn DomainObject>> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns the mapping, if this is a plain mapping.
    #[must_use]
    pub const fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the text, if this is a unicode string.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Returns the integer, if this is an unsigned integer literal.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(number) => number.as_u64(),
            _ => None,
        }
    }

    /// Downcasts an object value to its concrete type.
    #[must_use]
    pub fn downcast_ref<T: DomainObject>(&self) -> Option<&T> {
        let object: &dyn DomainObject = &**self.as_object()?;
        let any: &dyn Any = object;
        any.downcast_ref::<T>()
    }

    /// Stable identity of the wrapped object, if any.
    #[must_use]
    pub fn object_id(&self) -> Option<u64> {
        self.as_object().and_then(|object| object.object_id())
    }

    /// Returns `true` when both values wrap the same object instance.
    #[must_use]
    pub fn same_object(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Object(left), Self::Object(right)) => Rc::ptr_eq(left, right),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(left), Self::Bool(right)) => left == right,
            (Self::Number(left), Self::Number(right)) => left == right,
            (Self::Text(left), Self::Text(right)) => left == right,
            (Self::Bytes(left), Self::Bytes(right)) => left == right,
            (Self::List(left), Self::List(right)) | (Self::Set(left), Self::Set(right)) => {
                left == right
            }
            (Self::Map(left), Self::Map(right)) => left == right,
            (Self::Object(_), Self::Object(_)) => self.same_object(other),
            (Self::Opaque { type_name: left }, Self::Opaque { type_name: right }) => left == right,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}

/// Non-finite floats have no JSON form and become [`Value::Null`].
impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<Vec<Self>> for Value {
    fn from(value: Vec<Self>) -> Self {
        Self::List(value)
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Self::Map(value)
    }
}
