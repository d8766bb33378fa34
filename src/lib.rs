//! rolling-logger - process-wide structured logging with file rotation
//!
//! A single process-wide logger configurable at startup with a level, an
//! output destination and an encoding style. Records below the configured
//! level are dropped; the rest are encoded as console lines or JSON lines and
//! written to stdout, and optionally to a size-rotated log file as well.
//!
//! ```no_run
//! use rolling_logger::{fields, global, LoggerConfig};
//!
//! global::init(&LoggerConfig {
//!     style: "json".to_string(),
//!     path: "logs/app.log".to_string(),
//!     level: "info".to_string(),
//!     ..LoggerConfig::default()
//! });
//!
//! global::info("service started");
//! global::error_fields("upstream failed", fields!("user" => "us", "attempt" => 3));
//! rolling_logger::warnf!("retrying in {}s", 5);
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod global;
pub mod level;
pub mod logger;
pub mod record;
pub mod sink;
pub mod tracing_bridge;

pub use config::LoggerConfig;
pub use encoder::{DurationEncoding, Encoder, EncoderSettings, Style};
pub use error::{LogError, Result};
pub use level::{Level, LevelGate};
pub use logger::{CaptureLogger, CoreLogger, Logger};
pub use record::{Caller, Field, LogRecord, Value};
pub use sink::{FanoutWriter, MemorySink, RotatingFileSink, RotationPolicy, Sink, StdoutSink};
