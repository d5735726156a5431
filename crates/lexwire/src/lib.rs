//! Dictionary-compressed JSON codec for streaming structured tool output.
//!
//! `lexwire` turns a session of tool output (sections, text, tables of
//! domain objects, progress, and errors) into batches of tagged commands,
//! and turns those batches back into values on the reading side.
//!
//! # Architecture
//!
//! Domain objects describe themselves through [`DomainObject`] and are
//! serialised by an [`ObjectRenderer`] chosen from a [`Registry`] by type
//! tag. The [`JsonEncoder`] reduces any [`Value`] to a JSON-safe tree and,
//! when compression is enabled, replaces each literal with an id from the
//! batch's [`Lexicon`]. The [`JsonDecoder`] reverses both steps and keeps
//! an LRU [`IdentityCache`] so an object that appears repeatedly in a
//! stream is reconstructed once. [`StreamWriter`] and [`StreamReader`]
//! carry the command protocol on top.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use lexwire::{CodecConfig, ColumnSpec, Event, Registry, StreamReader, StreamWriter, Value};
//!
//! let registry = Rc::new(Registry::with_builtins());
//! let config = CodecConfig::compressed();
//!
//! let mut writer = StreamWriter::new(Rc::clone(&registry), Vec::new(), &config);
//! writer.start("pslist")?;
//! writer.table_header(&[ColumnSpec::new("pid")])?;
//! writer.table_row(&[Value::from(4_u64)])?;
//! let batches = writer.finish()?;
//!
//! let mut reader = StreamReader::new(registry, &config);
//! let events = reader.read_str(&batches[0])?;
//! assert!(matches!(events.last(), Some(Event::Row { cells, .. }) if cells == &[Value::from(4_u64)]));
//! # Ok::<(), lexwire::StreamError>(())
//! ```

pub mod cache;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod lexicon;
pub mod registry;
pub mod renderer;
pub mod stream;
pub mod value;

#[cfg(test)]
mod tests;

pub use lexwire_config::{CodecConfig, CorruptionPolicy};

pub use self::cache::{CacheKey, CacheLookup, IdentityCache};
pub use self::decoder::JsonDecoder;
pub use self::encoder::JsonEncoder;
pub use self::error::{DecodeError, EncodeError, LookupError, RegistryError, StreamError};
pub use self::lexicon::Lexicon;
pub use self::registry::Registry;
pub use self::renderer::{DecodeOptions, ObjectRenderer, TreeNode, TreeNodeRenderer};
pub use self::stream::{
    ColumnSpec, Command, Event, IoSink, SessionState, Sink, StreamReader, StreamWriter,
};
pub use self::value::{DomainObject, Value, ValueMap};
