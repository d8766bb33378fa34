//! Error types shared by sinks, encoders and the facade

use std::io;
use std::path::PathBuf;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, LogError>;

/// Errors raised while writing, rotating or configuring a logger
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// A destination write, flush, rename or open failed
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Gzip compression of a rotated backup failed
    ///
    /// Never returned from a write; only handed to the sink's error handler.
    #[error("failed to compress {}: {source}", path.display())]
    Compression {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A record could not be serialized
    #[error("failed to encode log record: {0}")]
    Encode(#[from] serde_json::Error),

    /// Unrecognized level or style name (strict validation only)
    #[error("invalid logger configuration: {0}")]
    Config(String),
}

impl LogError {
    /// Wrap an IO error with a short description of the failed operation
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        LogError::Io {
            context: context.into(),
            source,
        }
    }

    /// Underlying IO error kind, if this is an IO-backed error
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            LogError::Io { source, .. } | LogError::Compression { source, .. } => {
                Some(source.kind())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_includes_context() {
        let err = LogError::io(
            "failed to open log file",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "failed to open log file: denied");
        assert_eq!(err.io_kind(), Some(io::ErrorKind::PermissionDenied));
    }

    #[test]
    fn test_config_error_has_no_io_kind() {
        let err = LogError::Config("unknown level \"wran\"".to_string());
        assert!(err.io_kind().is_none());
        assert!(err.to_string().contains("wran"));
    }
}
