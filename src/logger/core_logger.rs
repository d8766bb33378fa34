//! Production logger: level gate, encoder and sink

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::LoggerConfig;
use crate::encoder::Encoder;
use crate::error::Result;
use crate::level::{Level, LevelGate};
use crate::record::LogRecord;
use crate::sink::{FanoutWriter, RotatingFileSink, Sink, StdoutSink};

use super::Logger;

/// Gates, encodes and writes records to a sink
pub struct CoreLogger {
    gate: LevelGate,
    encoder: Encoder,
    sink: Arc<dyn Sink>,
    file_path: Option<PathBuf>,
}

impl CoreLogger {
    pub fn new(gate: LevelGate, encoder: Encoder, sink: Arc<dyn Sink>) -> Self {
        Self {
            gate,
            encoder,
            sink,
            file_path: None,
        }
    }

    /// Stdout, plus a rotating file when `config.path` is set
    pub fn from_config(config: &LoggerConfig) -> Self {
        Self::with_console(config, Arc::new(StdoutSink))
    }

    /// Like [`from_config`](Self::from_config) with a custom console destination
    ///
    /// The console is always written first, then the rotating file.
    pub fn with_console(config: &LoggerConfig, console: Arc<dyn Sink>) -> Self {
        let file_path = config.file_path();
        let sink: Arc<dyn Sink> = match &file_path {
            Some(path) => Arc::new(FanoutWriter::new(vec![
                console,
                Arc::new(RotatingFileSink::new(path, config.rotation.clone())),
            ])),
            None => console,
        };
        Self {
            file_path,
            ..Self::with_sink(config, sink)
        }
    }

    /// Gate and encoding from `config`, output to `sink` only
    pub fn with_sink(config: &LoggerConfig, sink: Arc<dyn Sink>) -> Self {
        Self::new(
            LevelGate::from_name(&config.level),
            Encoder::from_config(config),
            sink,
        )
    }

    /// Console output at debug level, used before explicit initialization
    pub fn development() -> Self {
        Self::from_config(&LoggerConfig::default())
    }

    pub fn level(&self) -> Level {
        self.gate.min_level()
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// The destination records are written to
    pub fn sink(&self) -> Arc<dyn Sink> {
        Arc::clone(&self.sink)
    }

    /// Log file path, if file output is enabled
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }
}

impl Logger for CoreLogger {
    fn enabled(&self, level: Level) -> bool {
        self.gate.allows(level)
    }

    fn log(&self, record: &LogRecord) -> Result<()> {
        if !self.gate.allows(record.level) {
            return Ok(());
        }
        let bytes = self.encoder.encode(record)?;
        self.sink.write(&bytes)
    }

    fn sync(&self) -> Result<()> {
        self.sink.sync()
    }
}
