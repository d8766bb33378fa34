//! Record encoders
//!
//! Turns a [`LogRecord`] into the bytes handed to a sink: either a
//! human-readable console line or one JSON object per line.

mod console;
mod structured;

use std::backtrace::Backtrace;

use serde::{Deserialize, Serialize};

use crate::config::LoggerConfig;
use crate::error::Result;
use crate::record::{Caller, LogRecord};

pub(crate) use structured::EncodedFields;

/// Timestamp layout shared by both encoders
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Output style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Tab-separated, human-oriented lines
    Console,
    /// One JSON object per line
    Structured,
}

impl Style {
    /// `json` (any case) selects structured output, anything else console
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("json") {
            Style::Structured
        } else {
            Style::Console
        }
    }
}

/// Rendering of duration-valued fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationEncoding {
    /// Floating-point seconds, e.g. `1.5`
    Seconds,
    /// Human string, e.g. `"1.5s"`
    #[default]
    Human,
}

/// Knobs derived from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSettings {
    pub style: Style,
    /// ANSI-coloured level labels (console only)
    pub color: bool,
    /// `dir/file.rs:N` instead of the full caller path
    pub short_caller: bool,
    pub durations: DurationEncoding,
    pub name: Option<String>,
}

impl EncoderSettings {
    pub fn from_config(config: &LoggerConfig) -> Self {
        let style = config.style();
        Self {
            style,
            color: !config.release && style == Style::Console,
            short_caller: config.release,
            durations: config.duration,
            name: config.name.clone().filter(|n| !n.is_empty()),
        }
    }

    fn caller_text(&self, caller: &Caller) -> String {
        if self.short_caller {
            caller.short()
        } else {
            caller.full()
        }
    }
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self::from_config(&LoggerConfig::default())
    }
}

/// Serializes records according to [`EncoderSettings`]
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    settings: EncoderSettings,
}

impl Encoder {
    pub fn new(settings: EncoderSettings) -> Self {
        Self { settings }
    }

    pub fn from_config(config: &LoggerConfig) -> Self {
        Self::new(EncoderSettings::from_config(config))
    }

    pub fn settings(&self) -> &EncoderSettings {
        &self.settings
    }

    /// Encode one record, newline-terminated
    pub fn encode(&self, record: &LogRecord) -> Result<Vec<u8>> {
        let stacktrace = record
            .level
            .wants_stacktrace()
            .then(|| Backtrace::force_capture().to_string());
        match self.settings.style {
            Style::Console => console::encode(&self.settings, record, stacktrace.as_deref()),
            Style::Structured => {
                structured::encode(&self.settings, record, stacktrace.as_deref())
            }
        }
    }
}
