//! `tracing` subscriber bootstrap for hosts embedding the codec.
//!
//! The codec itself only emits events; a host calls [`initialise`] once with
//! the same [`CodecConfig`] it hands to its stream writer or reader so log
//! filtering, format, and the session settings recorded at start-up all
//! come from one document.
//!
//! ```rust
//! use lexwire_config::{CodecConfig, LogFormat, telemetry};
//!
//! let config = CodecConfig {
//!     log_format: LogFormat::Compact,
//!     log_filter: "lexwire=debug".into(),
//!     ..CodecConfig::compressed()
//! };
//! let handle = telemetry::initialise(&config)?;
//! assert_eq!(handle.format(), LogFormat::Compact);
//! # Ok::<(), telemetry::TelemetryError>(())
//! ```

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, info, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::UtcTime;

use crate::{CodecConfig, LogFormat};

static INSTALLED_FORMAT: OnceCell<LogFormat> = OnceCell::new();

/// Proof that the global subscriber is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Format of the subscriber that is actually installed.
    ///
    /// Later calls to [`initialise`] with a different format still report
    /// the first one.
    #[must_use]
    pub const fn format(self) -> LogFormat {
        self.format
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured log filter expression did not parse.
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// Rejected filter expression.
        filter: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Another subscriber was installed outside this crate.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global subscriber on first use and records the codec
/// settings it was installed for.
///
/// Repeated calls are idempotent and return a handle for the subscriber
/// already in place.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when `log_filter` does not parse, or
/// [`TelemetryError::Subscriber`] when a foreign subscriber is already set.
pub fn initialise(config: &CodecConfig) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED_FORMAT
        .get_or_try_init(|| install_subscriber(config))
        .map(|format| TelemetryHandle { format: *format })
}

fn install_subscriber(config: &CodecConfig) -> Result<LogFormat, TelemetryError> {
    let filter =
        EnvFilter::try_new(config.log_filter()).map_err(|error| TelemetryError::Filter {
            filter: config.log_filter().to_owned(),
            message: error.to_string(),
        })?;
    let format = config.log_format();
    let ansi = !format.is_structured() && io::stderr().is_terminal();

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(ansi)
        .with_timer(UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match format {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    };
    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)?;

    info!(
        tool = config.tool_name.as_str(),
        compression = config.compression,
        cache_capacity = config.cache_capacity.get(),
        progress_interval_ms = config.progress_interval_ms,
        corruption_policy = %config.corruption_policy,
        log_format = %format,
        "codec telemetry initialised"
    );
    Ok(format)
}
