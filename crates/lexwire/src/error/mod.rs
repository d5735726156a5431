//! Domain errors raised by the codec.
//!
//! Each concern owns a `thiserror`-derived enum with structured context so
//! callers can inspect failures programmatically. Unknown value types on the
//! encode path are absent: they degrade to `null` and are only
//! logged.

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Errors raised while registering renderers.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The renderer reported an empty or whitespace-only name.
    #[error("renderer name must not be blank")]
    BlankName,

    /// The renderer name collides with a tag the wire format reserves.
    #[error("renderer name '{name}' is reserved by the wire format")]
    ReservedName {
        /// Rejected name.
        name: String,
    },

    /// A renderer with the same name is already registered.
    #[error("renderer '{name}' is already registered")]
    Duplicate {
        /// Name that was registered twice.
        name: String,
    },
}

/// A renderer name was not found in the registry.
///
/// On the decode path this means the data was produced by a renderer set the
/// current process does not have.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no renderer registered under '{name}'")]
pub struct LookupError {
    /// Name that was looked up.
    pub name: String,
}

impl LookupError {
    /// Creates a lookup error for the given renderer name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Errors raised while encoding a value.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A renderer's state producer returned something other than a mapping.
    #[error("renderer '{renderer}' produced {found} as state; expected a plain mapping")]
    InvalidState {
        /// Name of the offending renderer.
        renderer: String,
        /// Kind of value the renderer produced.
        found: &'static str,
    },

    /// An explicitly requested renderer does not exist.
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Errors raised while decompressing or decoding a value.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A compressed tree referenced an id missing from the lexicon.
    #[error("lexicon corruption: id '{id}' is not in the lexicon")]
    LexiconCorruption {
        /// Offending id.
        id: String,
    },

    /// A `"type"` field named a renderer the registry does not hold.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The value does not have the shape its tag promises.
    #[error("malformed encoded value: {message}")]
    Malformed {
        /// Description of the shape violation.
        message: String,
    },

    /// A binary payload was not valid base64.
    #[error("binary payload is not valid base64: {source}")]
    Base64 {
        /// Underlying decoder error.
        #[source]
        source: base64::DecodeError,
    },

    /// A renderer rejected the state handed to it.
    #[error("renderer '{renderer}' failed to reconstruct value: {message}")]
    Reconstruct {
        /// Renderer that failed.
        renderer: String,
        /// Description of the failure.
        message: String,
    },
}

impl DecodeError {
    /// Creates a new `LexiconCorruption` error.
    #[must_use]
    pub fn corruption(id: impl Into<String>) -> Self {
        Self::LexiconCorruption { id: id.into() }
    }

    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a new `Reconstruct` error.
    #[must_use]
    pub fn reconstruct(renderer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Reconstruct {
            renderer: renderer.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by the streaming command writer and reader.
#[derive(Debug, Error)]
pub enum StreamError {
    /// A command was issued while no session was open.
    #[error("command '{command}' issued before the session was started")]
    SessionNotOpen {
        /// Tag of the rejected command.
        command: &'static str,
    },

    /// A value in a command could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// A command in a batch failed to decode.
    #[error("command {index} ('{tag}') failed to decode: {source}")]
    Decode {
        /// Position of the command in its batch.
        index: usize,
        /// Tag of the command.
        tag: String,
        /// Underlying decode failure.
        #[source]
        source: DecodeError,
    },

    /// A batch did not open with a lexicon-reset command.
    #[error("command batch does not start with a lexicon command")]
    MissingLexicon,

    /// A command did not have the `[tag, args...]` shape.
    #[error("malformed command at index {index}: {message}")]
    MalformedCommand {
        /// Position of the command in its batch.
        index: usize,
        /// Description of the shape violation.
        message: String,
    },

    /// The buffered commands could not be serialised.
    #[error("failed to serialise command batch: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A received batch was not valid JSON.
    #[error("command batch is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// The sink rejected a flushed batch.
    #[error("failed to write command batch: {source}")]
    Sink {
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// Serialised batches could not be read from their source.
    #[error("failed to read command batch: {source}")]
    Read {
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

impl StreamError {
    /// Creates a new `MalformedCommand` error.
    #[must_use]
    pub fn malformed_command(index: usize, message: impl Into<String>) -> Self {
        Self::MalformedCommand {
            index,
            message: message.into(),
        }
    }

    /// Wraps a failure reading serialised batches.
    #[must_use]
    pub fn read(source: io::Error) -> Self {
        Self::Read {
            source: Arc::new(source),
        }
    }

    /// Wraps a sink failure.
    #[must_use]
    pub fn sink(source: io::Error) -> Self {
        Self::Sink {
            source: Arc::new(source),
        }
    }
}
