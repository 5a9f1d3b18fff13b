//! Error types for registry operations.

use thiserror::Error;

/// Maximum number of characters of a response body kept in an error.
pub const BODY_EXCERPT_LIMIT: usize = 512;

/// Errors that can occur during registry operations.
///
/// Every variant that saw a response carries its status and a body excerpt,
/// available through [`RegistryError::status`] and [`RegistryError::body`].
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The request could not be sent or the response could not be read.
    #[error("Request to {url} failed: {source}")]
    Request {
        /// Request URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The registry answered with a non-2xx status.
    #[error("HTTP error from registry: {status} - {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("Failed to decode registry response (status {status}): {source}")]
    Decode {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        body: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid URL.
    #[error("Invalid URL: {url}")]
    InvalidUrl {
        /// URL string.
        url: String,
    },

    /// Credentials could not be encoded into a request header.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Error message.
        message: String,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {source}")]
    ClientBuild {
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },
}

impl RegistryError {
    /// Builds an HTTP error from a status and the full response body.
    #[must_use]
    pub fn http(status: u16, body: &str) -> Self {
        Self::Http {
            status,
            body: excerpt(body),
        }
    }

    /// Builds a decode error from a status, the full response body, and the
    /// serde failure.
    #[must_use]
    pub fn decode(status: u16, body: &str, source: serde_json::Error) -> Self {
        Self::Decode {
            status,
            body: excerpt(body),
            source,
        }
    }

    /// Returns the HTTP status, when a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::Decode { status, .. } => Some(*status),
            Self::Request { source, .. } => source.status().map(|s| s.as_u16()),
            Self::InvalidUrl { .. }
            | Self::AuthenticationFailed { .. }
            | Self::ClientBuild { .. } => None,
        }
    }

    /// Returns the response body excerpt, when a response was received.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. } | Self::Decode { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns true if the registry reported the resource as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Truncates a response body to [`BODY_EXCERPT_LIMIT`] characters.
fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_EXCERPT_LIMIT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
