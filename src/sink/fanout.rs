//! Fail-fast duplication of writes across several sinks

use std::sync::Arc;

use super::Sink;
use crate::error::Result;

/// Writes every record to each destination, in order
///
/// The first failing destination aborts the call; destinations after it are
/// not attempted for that record.
#[derive(Clone, Default)]
pub struct FanoutWriter {
    destinations: Vec<Arc<dyn Sink>>,
}

impl FanoutWriter {
    pub fn new(destinations: Vec<Arc<dyn Sink>>) -> Self {
        Self { destinations }
    }

    /// Append a destination after the existing ones
    pub fn push(&mut self, destination: Arc<dyn Sink>) {
        self.destinations.push(destination);
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}

impl Sink for FanoutWriter {
    fn write(&self, buf: &[u8]) -> Result<()> {
        for destination in &self.destinations {
            destination.write(buf)?;
        }
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        for destination in &self.destinations {
            destination.sync()?;
        }
        Ok(())
    }
}
