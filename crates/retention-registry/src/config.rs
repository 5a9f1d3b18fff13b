//! Configuration types for the registry client.

use std::fmt;
use std::time::Duration;

/// Default request timeout applied to every registry call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the registry client.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Registry base URL (e.g., "<https://nexus.example.com>").
    ///
    /// A path prefix is allowed for installations mounted below the root
    /// (e.g., "<https://example.com/nexus>").
    pub url: String,

    /// Credentials sent with every request.
    pub credentials: Credentials,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl RegistryConfig {
    /// Creates a new registry configuration with the given URL and credentials.
    ///
    /// # Examples
    ///
    /// ```
    /// use retention_registry::{Credentials, RegistryConfig};
    ///
    /// let config = RegistryConfig::new("https://nexus.example.com", Credentials::new("u", "p"));
    /// assert_eq!(config.url, "https://nexus.example.com");
    /// ```
    #[must_use]
    pub fn new(url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            url: url.into(),
            credentials,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("nexus-retention/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Basic authentication credentials.
///
/// The password is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username.
    pub username: String,
    /// Password or user token.
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
