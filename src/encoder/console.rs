//! Human-readable console encoding
//!
//! Layout: `time<TAB>LEVEL<TAB>[name<TAB>]caller<TAB>message[<TAB>{fields}]`,
//! followed by the stacktrace on its own lines for error and panic records.

use std::fmt::Write;

use super::{EncodedFields, EncoderSettings, TIME_FORMAT};
use crate::error::Result;
use crate::level::Level;
use crate::record::LogRecord;

const RESET: &str = "\x1b[0m";

fn color_code(level: Level) -> &'static str {
    match level {
        Level::Debug => "\x1b[35m",
        Level::Info => "\x1b[34m",
        Level::Warn => "\x1b[33m",
        Level::Error | Level::Panic => "\x1b[31m",
    }
}

pub(super) fn encode(
    settings: &EncoderSettings,
    record: &LogRecord,
    stacktrace: Option<&str>,
) -> Result<Vec<u8>> {
    let mut line = String::with_capacity(128);

    // Writing into a String cannot fail
    let _ = write!(line, "{}\t", record.timestamp.format(TIME_FORMAT));
    if settings.color {
        let _ = write!(
            line,
            "{}{}{}\t",
            color_code(record.level),
            record.level.label(),
            RESET
        );
    } else {
        let _ = write!(line, "{}\t", record.level.label());
    }
    if let Some(name) = &settings.name {
        let _ = write!(line, "{}\t", name);
    }
    if let Some(caller) = &record.caller {
        let _ = write!(line, "{}\t", settings.caller_text(caller));
    }
    line.push_str(&record.message);

    if !record.fields.is_empty() {
        let fields = serde_json::to_string(&EncodedFields::new(&record.fields, settings.durations))?;
        line.push('\t');
        line.push_str(&fields);
    }
    line.push('\n');

    if let Some(stacktrace) = stacktrace {
        line.push_str(stacktrace.trim_end());
        line.push('\n');
    }

    Ok(line.into_bytes())
}
