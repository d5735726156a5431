//! Default values shared by the encoder and decoder sessions.

use std::num::NonZeroUsize;

use crate::{CorruptionPolicy, logging::LogFormat};

/// Number of reconstructed objects the identity cache retains.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Minimum spacing between two progress commands, in milliseconds.
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 1000;

/// Tool name advertised in the session metadata command.
pub const DEFAULT_TOOL_NAME: &str = "lexwire";

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default identity cache capacity as a non-zero value.
#[must_use]
pub const fn default_cache_capacity() -> NonZeroUsize {
    match NonZeroUsize::new(DEFAULT_CACHE_CAPACITY) {
        Some(capacity) => capacity,
        None => NonZeroUsize::MIN,
    }
}

/// Default progress throttling interval.
#[must_use]
pub const fn default_progress_interval_ms() -> u64 {
    DEFAULT_PROGRESS_INTERVAL_MS
}

/// Owned tool name used where allocation is required (e.g. serde).
#[must_use]
pub fn default_tool_name() -> String {
    DEFAULT_TOOL_NAME.to_owned()
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default handling of corrupt commands in a decoded stream.
#[must_use]
pub const fn default_corruption_policy() -> CorruptionPolicy {
    CorruptionPolicy::Abort
}
