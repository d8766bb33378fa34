//! Logger configuration
//!
//! `LoggerConfig` is immutable once handed to initialization. Unknown level
//! and style names are tolerated (falling back to `info` and console
//! output); call [`LoggerConfig::validate`] to reject them at startup instead.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::encoder::{DurationEncoding, Style};
use crate::error::LogError;
use crate::level::{Level, LevelGate};
use crate::sink::RotationPolicy;

/// Style names accepted by strict validation
const KNOWN_STYLES: &[&str] = &["", "json", "console", "consul"];

/// Startup configuration for a [`CoreLogger`](crate::CoreLogger)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// `json` selects structured output; anything else selects console output
    pub style: String,

    /// Log file path; empty means stdout only
    pub path: String,

    /// Minimum level name: debug, info, warn, error or panic
    pub level: String,

    /// Production-tuned encoding (no colour, short caller) when true
    pub release: bool,

    /// Optional logger name written with every record
    pub name: Option<String>,

    /// How duration-valued fields are rendered
    pub duration: DurationEncoding,

    /// Rotation settings for the log file (ignored when `path` is empty)
    pub rotation: RotationPolicy,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            style: "console".to_string(),
            path: String::new(),
            level: "debug".to_string(),
            release: false,
            name: None,
            duration: DurationEncoding::Human,
            rotation: RotationPolicy::default(),
        }
    }
}

impl LoggerConfig {
    /// Console output to stdout and `path`, seconds-valued durations
    ///
    /// Mirrors the path/level initializer: everything else keeps its default.
    pub fn simple(path: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            level: level.into(),
            duration: DurationEncoding::Seconds,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read logger config {}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse logger config")
    }

    /// Serialize configuration to TOML text
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize logger config")
    }

    /// Reject unknown level and style names
    pub fn validate(&self) -> std::result::Result<(), LogError> {
        LevelGate::strict(&self.level)?;
        let style = self.style.trim().to_ascii_lowercase();
        if !KNOWN_STYLES.contains(&style.as_str()) {
            return Err(LogError::Config(format!(
                "unknown log style {:?}",
                self.style
            )));
        }
        Ok(())
    }

    /// Resolved minimum level, with the `info` fallback applied
    pub fn level(&self) -> Level {
        LevelGate::from_name(&self.level).min_level()
    }

    /// Resolved output style
    pub fn style(&self) -> Style {
        Style::from_name(&self.style)
    }

    /// Log file path, if file output is enabled
    pub fn file_path(&self) -> Option<PathBuf> {
        if self.path.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.path))
        }
    }
}
