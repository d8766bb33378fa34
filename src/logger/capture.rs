//! In-memory capturing logger
//!
//! Stores records in a thread-safe ring buffer so tests can assert on what
//! was logged without touching stdout or the filesystem.

use std::collections::VecDeque;
use std::sync::RwLock;

use crate::error::Result;
use crate::level::{Level, LevelGate};
use crate::record::LogRecord;

use super::Logger;

/// Thread-safe ring buffer of captured records
pub struct CaptureLogger {
    /// Captured records (capped at max_entries)
    entries: RwLock<VecDeque<LogRecord>>,
    /// Maximum entries to keep
    max_entries: usize,
    gate: LevelGate,
}

impl CaptureLogger {
    /// Capture up to `max_entries` records at any level
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(max_entries)),
            max_entries,
            gate: LevelGate::new(Level::Debug),
        }
    }

    /// Only capture records at or above `level`
    pub fn with_level(mut self, level: Level) -> Self {
        self.gate = LevelGate::new(level);
        self
    }

    fn push(&self, record: LogRecord) {
        if self.max_entries == 0 {
            return;
        }
        if let Ok(mut entries) = self.entries.write() {
            if entries.len() >= self.max_entries {
                entries.pop_front();
            }
            entries.push_back(record);
        }
    }

    /// All captured records, oldest first
    pub fn entries(&self) -> Vec<LogRecord> {
        self.entries
            .read()
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Messages of all captured records, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .read()
            .map(|e| e.iter().map(|r| r.message.clone()).collect())
            .unwrap_or_default()
    }

    /// Captured records at `level`
    pub fn at_level(&self, level: Level) -> Vec<LogRecord> {
        self.entries
            .read()
            .map(|e| e.iter().filter(|r| r.level == level).cloned().collect())
            .unwrap_or_default()
    }

    /// Warnings and above
    pub fn alerts(&self) -> Vec<LogRecord> {
        self.entries
            .read()
            .map(|e| e.iter().filter(|r| r.level >= Level::Warn).cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

impl Default for CaptureLogger {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl Logger for CaptureLogger {
    fn enabled(&self, level: Level) -> bool {
        self.gate.allows(level)
    }

    fn log(&self, record: &LogRecord) -> Result<()> {
        if self.gate.allows(record.level) {
            self.push(record.clone());
        }
        Ok(())
    }
}
