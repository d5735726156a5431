//! Tagged wire commands and table column descriptors.

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value as Json};

use crate::error::StreamError;

/// One unit of the wire stream, serialised as `[tag, args...]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `l`: lexicon table for the rest of the batch.
    Lexicon(Json),
    /// `m`: session metadata.
    Metadata(Map<String, Json>),
    /// `s`: encoded section attributes.
    Section(Json),
    /// `f`: encoded format string followed by encoded arguments.
    Format {
        /// Encoded format string.
        format: Json,
        /// Encoded arguments.
        args: Vec<Json>,
    },
    /// `t`: table header with column descriptors.
    TableHeader(Map<String, Json>),
    /// `r`: encoded cells of one table row.
    Row(Vec<Json>),
    /// `p`: progress message with literal arguments.
    Progress {
        /// Message template.
        message: String,
        /// Positional arguments.
        args: Vec<Json>,
        /// Keyword arguments.
        kwargs: Map<String, Json>,
    },
    /// `e`: error report.
    Error(String),
}

impl Command {
    /// Wire tag of the command.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Lexicon(_) => "l",
            Self::Metadata(_) => "m",
            Self::Section(_) => "s",
            Self::Format { .. } => "f",
            Self::TableHeader(_) => "t",
            Self::Row(_) => "r",
            Self::Progress { .. } => "p",
            Self::Error(_) => "e",
        }
    }

    /// Parses the command at position `index` of a received batch.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::MalformedCommand`] when the value is not a
    /// `[tag, args...]` sequence with the arguments its tag requires.
    pub fn from_json(index: usize, raw: Json) -> Result<Self, StreamError> {
        let malformed = |message: &str| StreamError::malformed_command(index, message);
        let Json::Array(parts) = raw else {
            return Err(malformed("command must be a sequence"));
        };
        let mut parts = parts.into_iter();
        let tag = match parts.next() {
            Some(Json::String(tag)) => tag,
            _ => return Err(malformed("command must start with a text tag")),
        };
        let first = parts.next();
        let command = match (tag.as_str(), first) {
            ("l", Some(table)) => Self::Lexicon(table),
            ("m", Some(Json::Object(metadata))) => Self::Metadata(metadata),
            ("s", Some(section)) => Self::Section(section),
            ("f", Some(format)) => Self::Format {
                format,
                args: parts.by_ref().collect(),
            },
            ("t", Some(Json::Object(header))) => Self::TableHeader(header),
            ("r", Some(Json::Array(cells))) => Self::Row(cells),
            ("p", Some(Json::String(message))) => {
                let args = match parts.next() {
                    None | Some(Json::Null) => Vec::new(),
                    Some(Json::Array(args)) => args,
                    Some(_) => return Err(malformed("progress arguments must be a sequence")),
                };
                let kwargs = match parts.next() {
                    None | Some(Json::Null) => Map::new(),
                    Some(Json::Object(kwargs)) => kwargs,
                    Some(_) => return Err(malformed("progress keywords must be a mapping")),
                };
                Self::Progress {
                    message,
                    args,
                    kwargs,
                }
            }
            ("e", Some(Json::String(message))) => Self::Error(message),
            (tag @ ("l" | "m" | "s" | "f" | "t" | "r" | "p" | "e"), _) => {
                return Err(malformed(&format!("invalid arguments for command '{tag}'")));
            }
            (other, _) => return Err(malformed(&format!("unknown command tag '{other}'"))),
        };
        if parts.next().is_some() {
            return Err(malformed("command has trailing arguments"));
        }
        Ok(command)
    }

    fn arity(&self) -> usize {
        match self {
            Self::Format { args, .. } => 2 + args.len(),
            Self::Progress { .. } => 4,
            _ => 2,
        }
    }
}

impl Serialize for Command {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.arity()))?;
        seq.serialize_element(self.tag())?;
        match self {
            Self::Lexicon(value) | Self::Section(value) => seq.serialize_element(value)?,
            Self::Metadata(map) | Self::TableHeader(map) => seq.serialize_element(map)?,
            Self::Format { format, args } => {
                seq.serialize_element(format)?;
                for arg in args {
                    seq.serialize_element(arg)?;
                }
            }
            Self::Row(cells) => seq.serialize_element(cells)?,
            Self::Progress {
                message,
                args,
                kwargs,
            } => {
                seq.serialize_element(message)?;
                seq.serialize_element(args)?;
                seq.serialize_element(kwargs)?;
            }
            Self::Error(message) => seq.serialize_element(message)?,
        }
        seq.end()
    }
}

/// Declares one table column and, optionally, the renderer its cells use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cname: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    renderer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    formatstring: Option<String>,
}

impl ColumnSpec {
    /// Creates a column whose cells are encoded by type inference.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cname: None,
            renderer: None,
            formatstring: None,
        }
    }

    /// Sets the machine-readable column name.
    #[must_use]
    pub fn with_cname(mut self, cname: impl Into<String>) -> Self {
        self.cname = Some(cname.into());
        self
    }

    /// Forces every cell in this column through the named renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl Into<String>) -> Self {
        self.renderer = Some(renderer.into());
        self
    }

    /// Attaches a presentation format string.
    #[must_use]
    pub fn with_format(mut self, formatstring: impl Into<String>) -> Self {
        self.formatstring = Some(formatstring.into());
        self
    }

    /// Human-readable column name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Machine-readable column name, if set.
    #[must_use]
    pub fn cname(&self) -> Option<&str> {
        self.cname.as_deref()
    }

    /// Renderer override, if set.
    #[must_use]
    pub fn renderer(&self) -> Option<&str> {
        self.renderer.as_deref()
    }

    /// Presentation format string, if set.
    #[must_use]
    pub fn formatstring(&self) -> Option<&str> {
        self.formatstring.as_deref()
    }
}
