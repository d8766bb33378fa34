//! The logger capability set and its implementations
//!
//! [`Logger`] is object safe so the process-wide handle can hold any
//! implementation: [`CoreLogger`] for real output, [`CaptureLogger`] for
//! tests.

mod capture;
mod core_logger;

use std::fmt;

use crate::error::Result;
use crate::level::Level;
use crate::record::{Caller, Field, LogRecord};

pub use self::capture::CaptureLogger;
pub use self::core_logger::CoreLogger;

/// Level-based logging capability
///
/// Implementors provide [`enabled`](Logger::enabled) and
/// [`log`](Logger::log); the per-level helpers are provided and record the
/// caller's source location.
pub trait Logger: Send + Sync {
    /// Whether records at `level` would be emitted
    fn enabled(&self, level: Level) -> bool;

    /// Emit a fully built record, ignoring it if its level is disabled
    fn log(&self, record: &LogRecord) -> Result<()>;

    /// Flush buffered output
    fn sync(&self) -> Result<()> {
        Ok(())
    }

    /// Build a record at the caller's location and emit it
    #[track_caller]
    fn emit(&self, level: Level, message: String, fields: Vec<Field>) -> Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        let record = LogRecord::new(level, message)
            .with_caller(Caller::here())
            .with_fields(fields);
        self.log(&record)
    }

    /// Record at panic level, flush, then panic with `message`
    #[track_caller]
    fn panic_with(&self, message: String, fields: Vec<Field>) -> ! {
        let record = LogRecord::new(Level::Panic, message.clone())
            .with_caller(Caller::here())
            .with_fields(fields);
        let _ = self.log(&record);
        let _ = self.sync();
        panic!("{}", message)
    }

    #[track_caller]
    fn debug(&self, message: &str) {
        let _ = self.emit(Level::Debug, message.to_string(), Vec::new());
    }

    #[track_caller]
    fn info(&self, message: &str) {
        let _ = self.emit(Level::Info, message.to_string(), Vec::new());
    }

    #[track_caller]
    fn warn(&self, message: &str) {
        let _ = self.emit(Level::Warn, message.to_string(), Vec::new());
    }

    #[track_caller]
    fn error(&self, message: &str) {
        let _ = self.emit(Level::Error, message.to_string(), Vec::new());
    }

    #[track_caller]
    fn panic(&self, message: &str) -> ! {
        self.panic_with(message.to_string(), Vec::new())
    }

    #[track_caller]
    fn debugf(&self, args: fmt::Arguments<'_>) {
        if self.enabled(Level::Debug) {
            let _ = self.emit(Level::Debug, args.to_string(), Vec::new());
        }
    }

    #[track_caller]
    fn infof(&self, args: fmt::Arguments<'_>) {
        if self.enabled(Level::Info) {
            let _ = self.emit(Level::Info, args.to_string(), Vec::new());
        }
    }

    #[track_caller]
    fn warnf(&self, args: fmt::Arguments<'_>) {
        if self.enabled(Level::Warn) {
            let _ = self.emit(Level::Warn, args.to_string(), Vec::new());
        }
    }

    #[track_caller]
    fn errorf(&self, args: fmt::Arguments<'_>) {
        if self.enabled(Level::Error) {
            let _ = self.emit(Level::Error, args.to_string(), Vec::new());
        }
    }

    #[track_caller]
    fn panicf(&self, args: fmt::Arguments<'_>) -> ! {
        self.panic_with(args.to_string(), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_logger_is_object_safe() {
        let logger: Box<dyn Logger> = Box::new(CaptureLogger::new(10));
        logger.info("boxed");
        logger.debugf(format_args!("{} + {}", 1, 2));
    }

    #[test]
    fn test_helpers_record_call_site() {
        let logger = CaptureLogger::new(10);
        logger.warn("careful");
        let line = line!() - 1;

        let entries = logger.entries();
        let caller = entries[0].caller.unwrap();
        assert!(caller.file.ends_with("mod.rs"));
        assert_eq!(caller.line, line);
    }

    #[test]
    fn test_panic_records_before_unwinding() {
        let logger = CaptureLogger::new(10);
        let result = catch_unwind(AssertUnwindSafe(|| {
            logger.panicf(format_args!("fatal: {}", "disk gone"));
        }));

        let payload = result.unwrap_err();
        assert_eq!(
            payload.downcast_ref::<String>().map(String::as_str),
            Some("fatal: disk gone")
        );
        let entries = logger.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Level::Panic);
        assert_eq!(entries[0].message, "fatal: disk gone");
    }

    #[test]
    #[should_panic(expected = "stop here")]
    fn test_panic_level_escalates() {
        CaptureLogger::new(1).panic("stop here");
    }

    #[test]
    fn test_error_level_only_records() {
        let logger = CaptureLogger::new(10);
        logger.error("this is error");
        assert_eq!(logger.len(), 1);
    }

    #[test]
    fn test_formatting_skipped_when_disabled() {
        struct Loud;
        impl fmt::Display for Loud {
            fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
                panic!("formatted a disabled record")
            }
        }

        let logger = CaptureLogger::new(10).with_level(Level::Error);
        logger.debugf(format_args!("{}", Loud));
        assert!(logger.is_empty());
    }
}
