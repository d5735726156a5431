//! Batch reader turning command batches back into session events.

use std::io::BufRead;
use std::rc::Rc;

use lexwire_config::{CodecConfig, CorruptionPolicy};
use serde_json::{Map, Value as Json};
use tracing::{debug, warn};

use super::command::{ColumnSpec, Command};
use crate::decoder::JsonDecoder;
use crate::error::{DecodeError, StreamError};
use crate::lexicon::Lexicon;
use crate::registry::Registry;
use crate::renderer::DecodeOptions;
use crate::value::Value;

/// A decoded command.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Session metadata.
    Metadata(Map<String, Json>),
    /// Section attributes, including `name`.
    Section(Value),
    /// Free text and its arguments.
    Text {
        /// Format string.
        format: Value,
        /// Arguments.
        args: Vec<Value>,
    },
    /// Column declarations for the rows that follow.
    TableHeader {
        /// Declared columns.
        columns: Vec<ColumnSpec>,
    },
    /// One table row.
    Row {
        /// Decoded cells.
        cells: Vec<Value>,
        /// Options renderers recorded while reconstructing the cells.
        options: DecodeOptions,
    },
    /// Progress report.
    Progress {
        /// Message template.
        message: String,
        /// Positional arguments.
        args: Vec<Json>,
        /// Keyword arguments.
        kwargs: Map<String, Json>,
    },
    /// Error report.
    Error(String),
}

/// Decodes command batches produced by a [`super::StreamWriter`].
///
/// Each batch installs its own lexicon; the identity cache lives for the
/// whole reader so objects repeated across batches resolve to one
/// instance. A compressing reader resolves every encoded argument through
/// the lexicon, so an id the batch's `l` table lacks is corruption.
#[derive(Debug)]
pub struct StreamReader {
    decoder: JsonDecoder,
    compression: bool,
    policy: CorruptionPolicy,
}

impl StreamReader {
    /// Creates a reader over a shared registry.
    #[must_use]
    pub fn new(registry: Rc<Registry>, config: &CodecConfig) -> Self {
        Self {
            decoder: JsonDecoder::new(registry, config.cache_capacity),
            compression: config.compression,
            policy: config.corruption_policy,
        }
    }

    /// The decoder backing this reader.
    #[must_use]
    pub const fn decoder(&self) -> &JsonDecoder {
        &self.decoder
    }

    /// Parses and decodes one serialised batch.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Parse`] for invalid JSON and otherwise the
    /// errors of [`Self::read_batch`].
    pub fn read_str(&mut self, batch: &str) -> Result<Vec<Event>, StreamError> {
        let parsed: Json = serde_json::from_str(batch).map_err(StreamError::Parse)?;
        self.read_batch(parsed)
    }

    /// Decodes every non-blank line of `input` as one batch.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Read`] when reading fails and otherwise the
    /// errors of [`Self::read_str`].
    pub fn read_lines<R: BufRead>(&mut self, input: R) -> Result<Vec<Event>, StreamError> {
        let mut events = Vec::new();
        for line in input.lines() {
            let batch = line.map_err(StreamError::read)?;
            if batch.trim().is_empty() {
                continue;
            }
            events.extend(self.read_str(&batch)?);
        }
        Ok(events)
    }

    /// Decodes one batch.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::MissingLexicon`] when the batch does not open
    /// with an `l` command, [`StreamError::MalformedCommand`] for commands
    /// of the wrong shape, and [`StreamError::Decode`] for a command that
    /// fails to decode under [`CorruptionPolicy::Abort`].
    pub fn read_batch(&mut self, batch: Json) -> Result<Vec<Event>, StreamError> {
        let Json::Array(commands) = batch else {
            return Err(StreamError::malformed_command(0, "batch must be a sequence"));
        };
        let mut commands = commands.into_iter().enumerate();
        let Some((_, first)) = commands.next() else {
            return Err(StreamError::MissingLexicon);
        };
        let Command::Lexicon(table) = Command::from_json(0, first)? else {
            return Err(StreamError::MissingLexicon);
        };
        let lexicon = Lexicon::from_json(table).map_err(|source| StreamError::Decode {
            index: 0,
            tag: "l".to_owned(),
            source,
        })?;
        self.decoder.set_lexicon(lexicon);

        let mut events = Vec::new();
        for (index, raw) in commands {
            let command = Command::from_json(index, raw)?;
            let tag = command.tag();
            match self.decode_command(command) {
                Ok(event) => events.push(event),
                Err(source) => match self.policy {
                    CorruptionPolicy::Abort => {
                        return Err(StreamError::Decode {
                            index,
                            tag: tag.to_owned(),
                            source,
                        });
                    }
                    CorruptionPolicy::Skip => {
                        warn!(index, tag, error = %source, "skipping undecodable command");
                    }
                },
            }
        }
        debug!(
            events = events.len(),
            compression = self.compression,
            "decoded command batch"
        );
        Ok(events)
    }

    fn decode_command(&mut self, command: Command) -> Result<Event, DecodeError> {
        let mut options = DecodeOptions::new();
        let event = match command {
            Command::Lexicon(_) => {
                return Err(DecodeError::malformed(
                    "lexicon command must open its batch",
                ));
            }
            Command::Metadata(metadata) => Event::Metadata(metadata),
            Command::Section(section) => {
                Event::Section(self.decode_value(&section, &mut options)?)
            }
            Command::Format { format, args } => Event::Text {
                format: self.decode_value(&format, &mut options)?,
                args: args
                    .iter()
                    .map(|arg| self.decode_value(arg, &mut options))
                    .collect::<Result<_, _>>()?,
            },
            Command::TableHeader(header) => Event::TableHeader {
                columns: header_columns(header)?,
            },
            Command::Row(raw_cells) => {
                let cells = raw_cells
                    .iter()
                    .map(|cell| self.decode_value(cell, &mut options))
                    .collect::<Result<_, _>>()?;
                Event::Row { cells, options }
            }
            Command::Progress {
                message,
                args,
                kwargs,
            } => Event::Progress {
                message,
                args,
                kwargs,
            },
            Command::Error(message) => Event::Error(message),
        };
        Ok(event)
    }

    fn decode_value(
        &mut self,
        value: &Json,
        options: &mut DecodeOptions,
    ) -> Result<Value, DecodeError> {
        if self.compression {
            self.decoder.decode_compressed(value, options)
        } else {
            self.decoder.decode(value, options)
        }
    }
}

fn header_columns(mut header: Map<String, Json>) -> Result<Vec<ColumnSpec>, DecodeError> {
    let columns = header.remove("columns").unwrap_or(Json::Array(Vec::new()));
    serde_json::from_value(columns)
        .map_err(|err| DecodeError::malformed(format!("invalid table header: {err}")))
}
