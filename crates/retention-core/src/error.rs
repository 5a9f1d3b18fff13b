//! Error types for retention configuration and execution.

use thiserror::Error;

use retention_registry::RegistryError;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading configuration or running retention.
///
/// Only these abort a run. Failures scoped to one repository or one deletion
/// are logged and counted in the run summary instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        /// Path to the config file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid YAML or has the wrong shape.
    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        /// Path to the config file.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_yaml::Error,
    },

    /// Configuration failed validation.
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig {
        /// Offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A rule's pattern is not a valid regular expression.
    #[error("Invalid regex in rule '{rule}': {source}")]
    InvalidPattern {
        /// Rule name.
        rule: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// Repositories could not be listed, so the run cannot proceed.
    #[error("Failed to list repositories: {source}")]
    RepositoryListing {
        /// Underlying registry error.
        #[source]
        source: RegistryError,
    },
}

impl Error {
    /// Creates a validation error.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
