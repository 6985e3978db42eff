//! Error types for the triage workspace.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire triage pipeline.
///
/// Configuration problems are reported before any batch starts; batch and
/// persistence failures halt the run without writing partial output.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriageError {
    /// Missing credential, invalid window size, unreadable input, etc.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A single batch's conversation run failed
    #[error("Batch {batch_start}..={batch_end} failed: {message}")]
    BatchExecution {
        batch_start: usize,
        batch_end: usize,
        message: String,
    },

    /// A batch stopped early because another batch failed
    #[error("Batch {batch_start}..={batch_end} was cancelled")]
    Cancelled { batch_start: usize, batch_end: usize },

    /// The output table could not be written
    #[error("Persistence error at {path}: {message}")]
    Persistence { path: String, message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", "CSV"
        message: String,
    },
}

impl TriageError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a BatchExecution error for the batch covering `start..=end`
    pub fn batch(batch_start: usize, batch_end: usize, message: impl Into<String>) -> Self {
        Self::BatchExecution {
            batch_start,
            batch_end,
            message: message.into(),
        }
    }

    /// Creates a Persistence error
    pub fn persistence(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Persistence {
            path: path.into(),
            message: message.into(),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this is a batch execution error
    pub fn is_batch_execution(&self) -> bool {
        matches!(self, Self::BatchExecution { .. })
    }

    /// Check if this is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Check if this is a persistence error
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }

    /// Returns the `(batch_start, batch_end)` range for batch-scoped errors.
    pub fn batch_range(&self) -> Option<(usize, usize)> {
        match self {
            Self::BatchExecution {
                batch_start,
                batch_end,
                ..
            }
            | Self::Cancelled {
                batch_start,
                batch_end,
            } => Some((*batch_start, *batch_end)),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for TriageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for TriageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TriageError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, TriageError>`.
pub type Result<T> = std::result::Result<T, TriageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_error_carries_range() {
        let err = TriageError::batch(1000, 1999, "upstream returned 503");
        assert!(err.is_batch_execution());
        assert_eq!(err.batch_range(), Some((1000, 1999)));
        assert_eq!(
            err.to_string(),
            "Batch 1000..=1999 failed: upstream returned 503"
        );
    }

    #[test]
    fn io_error_converts_with_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err: TriageError = io.into();
        match err {
            TriageError::Io { message } => assert!(message.contains("NotFound")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn non_batch_errors_have_no_range() {
        assert_eq!(TriageError::config("window size").batch_range(), None);
        assert!(TriageError::persistence("out.csv", "denied").is_persistence());
    }
}
