//! `std::io::Write` / `MakeWriter` adapters over a [`Sink`]
//!
//! Lets a `tracing-subscriber` fmt layer write into the same destinations as
//! the logger, so `tracing` events share the rotation and fan-out behaviour.

use std::io::{self, Write};
use std::sync::Arc;

use tracing_subscriber::fmt::MakeWriter;

use super::Sink;

/// A writer that forwards each `write` call to a sink as one record
pub struct SinkWriter {
    sink: Arc<dyn Sink>,
}

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.sink
            .write(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink
            .sync()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }
}

/// Writer factory for tracing-subscriber
#[derive(Clone)]
pub struct SinkMakeWriter {
    sink: Arc<dyn Sink>,
}

impl SinkMakeWriter {
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Self { sink }
    }
}

impl<'a> MakeWriter<'a> for SinkMakeWriter {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter {
            sink: Arc::clone(&self.sink),
        }
    }
}
