//! Error types for the audit sink.

use std::path::PathBuf;

/// Errors that can occur while writing the audit log.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// The log file could not be opened or inspected.
    #[error("Failed to open audit log {path}: {source}")]
    Open {
        /// Log file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A record could not be written.
    #[error("Failed to write audit record: {0}")]
    Write(#[from] csv::Error),

    /// Buffered records could not be flushed to disk.
    #[error("Failed to flush audit log: {0}")]
    Flush(#[from] std::io::Error),
}
