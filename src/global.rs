//! Process-wide logger handle
//!
//! Until [`init`] or [`set_logger`] runs, the handle lazily holds a
//! development console logger at debug level writing to stdout, so logging
//! never hits an uninitialized logger. Initialization is a startup-time
//! operation: replacing the logger is not atomic with respect to calls
//! already in flight on other threads.
//!
//! Components that prefer explicit wiring can take the `Arc<dyn Logger>`
//! returned by [`logger`] (or [`init`]) and hold on to it.

use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::config::LoggerConfig;
use crate::error::Result;
use crate::level::Level;
use crate::logger::{CoreLogger, Logger};
use crate::record::{Field, Value};
use crate::sink::{Sink, StdoutSink};

static GLOBAL: OnceLock<RwLock<Arc<dyn Logger>>> = OnceLock::new();

fn slot() -> &'static RwLock<Arc<dyn Logger>> {
    GLOBAL.get_or_init(|| RwLock::new(Arc::new(CoreLogger::development())))
}

/// The current process-wide logger
pub fn logger() -> Arc<dyn Logger> {
    Arc::clone(&slot().read().unwrap_or_else(PoisonError::into_inner))
}

/// Install `logger` as the process-wide logger, returning the previous one
pub fn set_logger(logger: Arc<dyn Logger>) -> Arc<dyn Logger> {
    let mut current = slot().write().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *current, logger)
}

/// Build a logger from `config` and install it
///
/// Unknown level or style names fall back to `info` and console output.
pub fn init(config: &LoggerConfig) -> Arc<CoreLogger> {
    init_with_console(config, Arc::new(StdoutSink))
}

/// Like [`init`], writing console output to `console` instead of stdout
pub fn init_with_console(config: &LoggerConfig, console: Arc<dyn Sink>) -> Arc<CoreLogger> {
    let core = Arc::new(CoreLogger::with_console(config, console));
    set_logger(core.clone());
    core
}

/// Like [`init`], but reject unknown level or style names
pub fn try_init(config: &LoggerConfig) -> Result<Arc<CoreLogger>> {
    config.validate()?;
    Ok(init(config))
}

/// Console logger writing to stdout and `path` (when non-empty) at `level`
///
/// Durations are rendered as seconds.
pub fn init_simple(path: &str, level: &str) -> Arc<CoreLogger> {
    init(&LoggerConfig::simple(path, level))
}

/// Flush the process-wide logger
pub fn sync() -> Result<()> {
    logger().sync()
}

/// Log through the process-wide logger, surfacing write failures
#[track_caller]
pub fn try_log(level: Level, message: impl fmt::Display, fields: Vec<Field>) -> Result<()> {
    let logger = logger();
    if !logger.enabled(level) {
        return Ok(());
    }
    logger.emit(level, message.to_string(), fields)
}

#[track_caller]
fn dispatch(level: Level, message: &dyn fmt::Display, fields: Vec<Field>) {
    let logger = logger();
    if logger.enabled(level) {
        let _ = logger.emit(level, message.to_string(), fields);
    }
}

#[track_caller]
fn escalate(message: &dyn fmt::Display, fields: Vec<Field>) -> ! {
    logger().panic_with(message.to_string(), fields)
}

#[track_caller]
pub fn debug(message: impl fmt::Display) {
    dispatch(Level::Debug, &message, Vec::new());
}

#[track_caller]
pub fn info(message: impl fmt::Display) {
    dispatch(Level::Info, &message, Vec::new());
}

#[track_caller]
pub fn warn(message: impl fmt::Display) {
    dispatch(Level::Warn, &message, Vec::new());
}

#[track_caller]
pub fn error(message: impl fmt::Display) {
    dispatch(Level::Error, &message, Vec::new());
}

/// Record at panic level, then panic
#[track_caller]
pub fn panic(message: impl fmt::Display) -> ! {
    escalate(&message, Vec::new())
}

#[track_caller]
pub fn debugf(args: fmt::Arguments<'_>) {
    dispatch(Level::Debug, &args, Vec::new());
}

#[track_caller]
pub fn infof(args: fmt::Arguments<'_>) {
    dispatch(Level::Info, &args, Vec::new());
}

#[track_caller]
pub fn warnf(args: fmt::Arguments<'_>) {
    dispatch(Level::Warn, &args, Vec::new());
}

#[track_caller]
pub fn errorf(args: fmt::Arguments<'_>) {
    dispatch(Level::Error, &args, Vec::new());
}

#[track_caller]
pub fn panicf(args: fmt::Arguments<'_>) -> ! {
    escalate(&args, Vec::new())
}

#[track_caller]
pub fn debug_kv(message: impl fmt::Display, key: &str, value: impl Into<Value>) {
    dispatch(Level::Debug, &message, vec![Field::new(key, value)]);
}

#[track_caller]
pub fn info_kv(message: impl fmt::Display, key: &str, value: impl Into<Value>) {
    dispatch(Level::Info, &message, vec![Field::new(key, value)]);
}

#[track_caller]
pub fn warn_kv(message: impl fmt::Display, key: &str, value: impl Into<Value>) {
    dispatch(Level::Warn, &message, vec![Field::new(key, value)]);
}

#[track_caller]
pub fn error_kv(message: impl fmt::Display, key: &str, value: impl Into<Value>) {
    dispatch(Level::Error, &message, vec![Field::new(key, value)]);
}

#[track_caller]
pub fn panic_kv(message: impl fmt::Display, key: &str, value: impl Into<Value>) -> ! {
    escalate(&message, vec![Field::new(key, value)])
}

#[track_caller]
pub fn debug_fields(message: impl fmt::Display, fields: Vec<Field>) {
    dispatch(Level::Debug, &message, fields);
}

#[track_caller]
pub fn info_fields(message: impl fmt::Display, fields: Vec<Field>) {
    dispatch(Level::Info, &message, fields);
}

#[track_caller]
pub fn warn_fields(message: impl fmt::Display, fields: Vec<Field>) {
    dispatch(Level::Warn, &message, fields);
}

#[track_caller]
pub fn error_fields(message: impl fmt::Display, fields: Vec<Field>) {
    dispatch(Level::Error, &message, fields);
}

#[track_caller]
pub fn panic_fields(message: impl fmt::Display, fields: Vec<Field>) -> ! {
    escalate(&message, fields)
}

/// Build a `Vec<Field>` from `key => value` pairs
#[macro_export]
macro_rules! fields {
    () => {
        ::std::vec::Vec::<$crate::Field>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Field::new($key, $value)),+]
    };
}

/// Formatted debug record through the process-wide logger
#[macro_export]
macro_rules! debugf {
    ($($arg:tt)+) => {
        $crate::global::debugf(::std::format_args!($($arg)+))
    };
}

/// Formatted info record through the process-wide logger
#[macro_export]
macro_rules! infof {
    ($($arg:tt)+) => {
        $crate::global::infof(::std::format_args!($($arg)+))
    };
}

/// Formatted warn record through the process-wide logger
#[macro_export]
macro_rules! warnf {
    ($($arg:tt)+) => {
        $crate::global::warnf(::std::format_args!($($arg)+))
    };
}

/// Formatted error record through the process-wide logger
#[macro_export]
macro_rules! errorf {
    ($($arg:tt)+) => {
        $crate::global::errorf(::std::format_args!($($arg)+))
    };
}

/// Formatted panic record through the process-wide logger, then panic
#[macro_export]
macro_rules! panicf {
    ($($arg:tt)+) => {
        $crate::global::panicf(::std::format_args!($($arg)+))
    };
}
