//! Buffered session writer producing command batches.

use std::rc::Rc;
use std::time::{Duration, Instant};

use lexwire_config::CodecConfig;
use serde_json::{Map, Value as Json};
use tracing::{debug, warn};

use super::command::{ColumnSpec, Command};
use super::sink::Sink;
use crate::encoder::JsonEncoder;
use crate::error::StreamError;
use crate::registry::Registry;
use crate::value::{Value, ValueMap};

/// Lifecycle of a writer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session has been started.
    Idle,
    /// Output commands are accepted.
    Open,
}

/// Encodes output commands into buffers and flushes them to a [`Sink`].
///
/// Every flushed batch is a JSON sequence whose first element is the `l`
/// command carrying the lexicon for that batch; the lexicon then starts
/// over, so a reader never needs state from an earlier batch.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
///
/// use lexwire::{CodecConfig, Registry, StreamWriter};
///
/// let registry = Rc::new(Registry::with_builtins());
/// let mut writer = StreamWriter::new(registry, Vec::new(), &CodecConfig::default());
/// writer.start("pslist")?;
/// writer.report_error("no processes found")?;
/// let batches = writer.finish()?;
/// assert_eq!(batches.len(), 1);
/// # Ok::<(), lexwire::StreamError>(())
/// ```
#[derive(Debug)]
pub struct StreamWriter<S> {
    encoder: JsonEncoder,
    sink: S,
    buffer: Vec<Command>,
    state: SessionState,
    column_renderers: Vec<Option<String>>,
    tool_name: String,
    progress_interval: Duration,
    last_progress: Option<Instant>,
}

impl<S: Sink> StreamWriter<S> {
    /// Creates an idle writer.
    #[must_use]
    pub fn new(registry: Rc<Registry>, sink: S, config: &CodecConfig) -> Self {
        Self {
            encoder: JsonEncoder::new(registry, config.compression),
            sink,
            buffer: Vec::new(),
            state: SessionState::Idle,
            column_renderers: Vec::new(),
            tool_name: config.tool_name.clone(),
            progress_interval: config.progress_interval(),
            last_progress: None,
        }
    }

    /// Current session state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Number of commands waiting for the next flush.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// The encoder feeding this writer.
    #[must_use]
    pub const fn encoder(&self) -> &JsonEncoder {
        &self.encoder
    }

    /// The sink receiving flushed batches.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Flushes any pending output and opens a session for `plugin_name`.
    ///
    /// # Errors
    ///
    /// Returns an error when the pending buffer cannot be flushed.
    pub fn start(&mut self, plugin_name: &str) -> Result<(), StreamError> {
        self.flush()?;
        let mut metadata = Map::new();
        metadata.insert("plugin_name".to_owned(), Json::from(plugin_name));
        metadata.insert("tool_name".to_owned(), Json::from(self.tool_name.as_str()));
        metadata.insert(
            "tool_version".to_owned(),
            Json::from(env!("CARGO_PKG_VERSION")),
        );
        self.buffer.push(Command::Metadata(metadata));
        self.column_renderers.clear();
        self.last_progress = None;
        self.state = SessionState::Open;
        debug!(plugin = plugin_name, "stream session started");
        Ok(())
    }

    /// Starts a named section.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::SessionNotOpen`] before [`Self::start`].
    pub fn section(&mut self, name: &str) -> Result<(), StreamError> {
        self.section_with_attributes(name, ValueMap::new())
    }

    /// Starts a named section carrying extra attributes.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::SessionNotOpen`] before [`Self::start`] and
    /// [`StreamError::Encode`] when an attribute cannot be encoded.
    pub fn section_with_attributes(
        &mut self,
        name: &str,
        mut attributes: ValueMap,
    ) -> Result<(), StreamError> {
        self.ensure_open("s")?;
        attributes.insert("name".to_owned(), Value::from(name));
        let encoded = self.encoder.encode(&Value::Map(attributes), None)?;
        self.buffer.push(Command::Section(encoded));
        Ok(())
    }

    /// Emits free text built from a format string and its arguments.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::SessionNotOpen`] before [`Self::start`] and
    /// [`StreamError::Encode`] when an argument cannot be encoded.
    pub fn format(&mut self, format: &str, args: &[Value]) -> Result<(), StreamError> {
        self.ensure_open("f")?;
        let encoded_format = self.encoder.encode(&Value::from(format), None)?;
        let encoded_args = args
            .iter()
            .map(|arg| self.encoder.encode(arg, None))
            .collect::<Result<Vec<_>, _>>()?;
        self.buffer.push(Command::Format {
            format: encoded_format,
            args: encoded_args,
        });
        Ok(())
    }

    /// Declares the columns of the rows that follow.
    ///
    /// Columns naming a renderer force every cell in that position through
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::SessionNotOpen`] before [`Self::start`].
    pub fn table_header(&mut self, columns: &[ColumnSpec]) -> Result<(), StreamError> {
        self.ensure_open("t")?;
        let serialised = serde_json::to_value(columns).map_err(StreamError::Serialize)?;
        let mut header = Map::new();
        header.insert("columns".to_owned(), serialised);
        self.column_renderers = columns
            .iter()
            .map(|column| column.renderer().map(str::to_owned))
            .collect();
        self.buffer.push(Command::TableHeader(header));
        Ok(())
    }

    /// Emits one table row.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::SessionNotOpen`] before [`Self::start`] and
    /// [`StreamError::Encode`] when a cell cannot be encoded, including a
    /// column override naming no renderer.
    pub fn table_row(&mut self, cells: &[Value]) -> Result<(), StreamError> {
        self.ensure_open("r")?;
        if cells.len() > self.column_renderers.len() && !self.column_renderers.is_empty() {
            warn!(
                cells = cells.len(),
                columns = self.column_renderers.len(),
                "table row is wider than its header"
            );
        }
        let mut encoded = Vec::with_capacity(cells.len());
        for (index, cell) in cells.iter().enumerate() {
            let renderer = self.column_renderers.get(index).and_then(Option::as_deref);
            encoded.push(self.encoder.encode(cell, renderer)?);
        }
        self.buffer.push(Command::Row(encoded));
        Ok(())
    }

    /// Reports progress, dropping updates that arrive faster than the
    /// configured interval.
    ///
    /// Returns `true` when the update was buffered.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::SessionNotOpen`] before [`Self::start`].
    pub fn progress(
        &mut self,
        message: &str,
        args: Vec<Json>,
        kwargs: Map<String, Json>,
    ) -> Result<bool, StreamError> {
        self.ensure_open("p")?;
        let now = Instant::now();
        if let Some(last) = self.last_progress
            && now.duration_since(last) < self.progress_interval
        {
            return Ok(false);
        }
        self.last_progress = Some(now);
        self.buffer.push(Command::Progress {
            message: message.to_owned(),
            args,
            kwargs,
        });
        Ok(true)
    }

    /// Reports an error to the reader.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::SessionNotOpen`] before [`Self::start`].
    pub fn report_error(&mut self, message: &str) -> Result<(), StreamError> {
        self.ensure_open("e")?;
        self.buffer.push(Command::Error(message.to_owned()));
        Ok(())
    }

    /// Writes the pending commands as one batch and resets the lexicon.
    ///
    /// An empty buffer writes nothing. When the sink fails the commands
    /// stay buffered.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Serialize`] or [`StreamError::Sink`] when the
    /// batch cannot be produced or delivered.
    pub fn flush(&mut self) -> Result<(), StreamError> {
        if !self.buffer.is_empty() {
            let lexicon = Command::Lexicon(self.encoder.lexicon().to_json());
            let batch: Vec<&Command> = std::iter::once(&lexicon).chain(&self.buffer).collect();
            let serialised = serde_json::to_string(&batch).map_err(StreamError::Serialize)?;
            self.sink
                .write_batch(&serialised)
                .map_err(StreamError::sink)?;
            debug!(
                commands = self.buffer.len(),
                lexicon_entries = self.encoder.lexicon().len(),
                bytes = serialised.len(),
                "flushed command batch"
            );
            self.buffer.clear();
        }
        self.encoder.flush();
        Ok(())
    }

    /// Flushes pending output and returns the sink.
    ///
    /// # Errors
    ///
    /// Returns an error when the final flush fails.
    pub fn finish(mut self) -> Result<S, StreamError> {
        self.flush()?;
        Ok(self.sink)
    }

    const fn ensure_open(&self, command: &'static str) -> Result<(), StreamError> {
        match self.state {
            SessionState::Open => Ok(()),
            SessionState::Idle => Err(StreamError::SessionNotOpen { command }),
        }
    }
}

