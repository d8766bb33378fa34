//! Route `tracing` events into a logger's sink
//!
//! Installs a global `tracing` subscriber whose fmt layer writes through the
//! same destinations (stdout fan-out, rotating file) as a [`CoreLogger`].
//! This is how the crate's own diagnostics, such as rotation and compression
//! problems, reach the log.

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::level::Level;
use crate::logger::CoreLogger;
use crate::sink::SinkMakeWriter;

/// `EnvFilter` directive equivalent to `level`
pub fn directive(level: Level) -> &'static str {
    match level {
        Level::Debug => "debug",
        Level::Info => "info",
        Level::Warn => "warn",
        Level::Error | Level::Panic => "error",
    }
}

/// Filter from `RUST_LOG`, falling back to the logger's own level
pub fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(level)))
}

/// Install the global `tracing` subscriber writing into `logger`'s sink
///
/// Fails if a global subscriber is already set.
pub fn install(logger: &CoreLogger) -> Result<()> {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(SinkMakeWriter::new(logger.sink()))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter(logger.level()))
        .with(layer)
        .try_init()
        .context("Failed to install tracing subscriber")
}
