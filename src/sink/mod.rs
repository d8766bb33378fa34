//! Output destinations for encoded records
//!
//! Provides the stdout sink, the size-rotating file sink with backup
//! retention, a fail-fast fan-out writer and an adapter that lets
//! `tracing-subscriber` write into any sink.

mod compress;
mod fanout;
mod retention;
mod rotating;
mod writer;

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crate::error::{LogError, Result};

pub use fanout::FanoutWriter;
pub use retention::{backup_path, Backup, BACKUP_TIME_FORMAT};
pub use rotating::{Clock, ErrorHandler, RotatingFileSink, RotationPolicy};
pub use writer::{SinkMakeWriter, SinkWriter};

/// A destination accepting complete encoded records
///
/// Implementations lock internally so a single record is never interleaved
/// with another, and flush before returning.
pub trait Sink: Send + Sync {
    /// Write one encoded record
    fn write(&self, buf: &[u8]) -> Result<()>;

    /// Flush anything the destination holds to durable storage
    fn sync(&self) -> Result<()>;
}

/// Process standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn write(&self, buf: &[u8]) -> Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(buf)
            .and_then(|_| out.flush())
            .map_err(|e| LogError::io("failed to write to stdout", e))
    }

    fn sync(&self) -> Result<()> {
        io::stdout()
            .lock()
            .flush()
            .map_err(|e| LogError::io("failed to flush stdout", e))
    }
}

/// In-memory sink, handy for capturing encoded output
#[derive(Debug, Default)]
pub struct MemorySink {
    buf: Mutex<Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn contents(&self) -> Vec<u8> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Everything written so far, split into lines
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.contents())
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    pub fn clear(&self) {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Sink for MemorySink {
    fn write(&self, buf: &[u8]) -> Result<()> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        Ok(())
    }
}
