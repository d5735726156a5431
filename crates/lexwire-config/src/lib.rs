//! Shared configuration for `lexwire` encoder and decoder sessions.
//!
//! A [`CodecConfig`] collects the knobs a host sets once per session: whether
//! the encoder compresses values through the lexicon, how many reconstructed
//! objects the decoder's identity cache keeps, how progress updates are
//! throttled, and how the decoder reacts to a corrupt command. Every field
//! carries a default so a partial document deserialises cleanly.
//!
//! The crate also owns the `tracing` subscriber bootstrap in [`telemetry`] so
//! binaries embedding the codec configure logging from the same document.

pub mod defaults;
pub mod logging;
pub mod telemetry;

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub use self::logging::{LogFormat, LogFormatParseError};

/// Reaction of a stream reader to a command that fails to decode.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CorruptionPolicy {
    /// Stop reading the batch and surface the error to the caller.
    #[default]
    Abort,
    /// Log the error, drop the offending command, and keep reading.
    Skip,
}

/// Session configuration shared by the stream writer and reader.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CodecConfig {
    /// Compress encoded values through the per-buffer lexicon.
    pub compression: bool,
    /// Capacity of the decoder's identity cache.
    pub cache_capacity: NonZeroUsize,
    /// Minimum spacing between progress commands in milliseconds.
    pub progress_interval_ms: u64,
    /// Tool name advertised in the metadata command.
    pub tool_name: String,
    /// Handling of commands that fail to decode.
    pub corruption_policy: CorruptionPolicy,
    /// `tracing` filter expression.
    pub log_filter: String,
    /// Output format for log records.
    pub log_format: LogFormat,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            compression: false,
            cache_capacity: defaults::default_cache_capacity(),
            progress_interval_ms: defaults::default_progress_interval_ms(),
            tool_name: defaults::default_tool_name(),
            corruption_policy: defaults::default_corruption_policy(),
            log_filter: defaults::default_log_filter(),
            log_format: defaults::default_log_format(),
        }
    }
}

impl CodecConfig {
    /// Returns a configuration with compression enabled.
    #[must_use]
    pub fn compressed() -> Self {
        Self {
            compression: true,
            ..Self::default()
        }
    }

    /// Progress throttling interval as a [`Duration`].
    #[must_use]
    pub const fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    /// Filter expression applied to log records.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Format applied to log records.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
