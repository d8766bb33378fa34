//! Line-delimited JSON encoding

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::{DurationEncoding, EncoderSettings, TIME_FORMAT};
use crate::error::Result;
use crate::record::{Field, LogRecord, Value};

/// A field value serialized with the configured duration rendering
struct EncodedValue<'a> {
    value: &'a Value,
    durations: DurationEncoding,
}

impl Serialize for EncodedValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.value {
            Value::Str(s) => serializer.serialize_str(s),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Uint(u) => serializer.serialize_u64(*u),
            // JSON has no NaN or infinity
            Value::Float(f) if !f.is_finite() => serializer.serialize_str(&f.to_string()),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Duration(d) => match self.durations {
                DurationEncoding::Seconds => serializer.serialize_f64(d.as_secs_f64()),
                DurationEncoding::Human => serializer.serialize_str(&format!("{:?}", d)),
            },
            Value::Record(fields) => EncodedFields::new(fields, self.durations).serialize(serializer),
        }
    }
}

/// Ordered fields serialized as a JSON object
pub(crate) struct EncodedFields<'a> {
    fields: &'a [Field],
    durations: DurationEncoding,
}

impl<'a> EncodedFields<'a> {
    pub(crate) fn new(fields: &'a [Field], durations: DurationEncoding) -> Self {
        Self { fields, durations }
    }
}

impl Serialize for EncodedFields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in self.fields {
            map.serialize_entry(
                &field.key,
                &EncodedValue {
                    value: &field.value,
                    durations: self.durations,
                },
            )?;
        }
        map.end()
    }
}

/// The full JSON object for one record, keys in fixed order
struct StructuredLine<'a> {
    settings: &'a EncoderSettings,
    record: &'a LogRecord,
    stacktrace: Option<&'a str>,
}

impl Serialize for StructuredLine<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let record = self.record;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("time", &record.timestamp.format(TIME_FORMAT).to_string())?;
        map.serialize_entry("level", record.level.as_str())?;
        if let Some(name) = &self.settings.name {
            map.serialize_entry("logger", name)?;
        }
        if let Some(caller) = &record.caller {
            map.serialize_entry("caller", &self.settings.caller_text(caller))?;
        }
        map.serialize_entry("message", &record.message)?;
        if let Some(stacktrace) = self.stacktrace {
            map.serialize_entry("stacktrace", stacktrace)?;
        }
        for field in &record.fields {
            map.serialize_entry(
                &field.key,
                &EncodedValue {
                    value: &field.value,
                    durations: self.settings.durations,
                },
            )?;
        }
        map.end()
    }
}

pub(super) fn encode(
    settings: &EncoderSettings,
    record: &LogRecord,
    stacktrace: Option<&str>,
) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(256);
    serde_json::to_writer(
        &mut buf,
        &StructuredLine {
            settings,
            record,
            stacktrace,
        },
    )?;
    buf.push(b'\n');
    Ok(buf)
}
