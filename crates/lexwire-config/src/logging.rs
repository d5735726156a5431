//! Output formats for the codec's log records.
//!
//! Stream batches own stdout, so every format writes to stderr. JSON is the
//! default because hosts that read the stream usually ingest the logs too.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Supported log record formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One flattened JSON object per record.
    #[default]
    Json,
    /// Single-line text for terminals.
    Compact,
}

impl LogFormat {
    /// Returns `true` when records are machine-readable and must never
    /// carry terminal escape codes.
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Error returned when a [`LogFormat`] name does not parse.
pub type LogFormatParseError = strum::ParseError;
