//! Configuration file loading and validation.
//!
//! The YAML file is deserialized into [`FileConfig`] and validated into a
//! [`Config`], an immutable snapshot holding the compiled rules and the
//! registry client settings.
//!
//! ```yaml
//! nexus:
//!   url: https://nexus.example.com
//!   username: admin
//!   password: secret
//!   timeout: 30
//! rules:
//!   - name: production
//!     regex: "^prod-.*"
//!     keep: 10
//! protected_tags: [latest]
//! schedule: "0 2 * * *"
//! dry_run: true
//! log_file: deletion_log.csv
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use retention_registry::{Credentials, RegistryConfig};

use crate::error::{Error, Result};
use crate::policy::RetentionPolicy;
use crate::protection::ProtectedTags;
use crate::rule::{RuleSet, RuleSpec};

/// Audit log path used when `log_file` is absent or empty.
pub const DEFAULT_LOG_FILE: &str = "deletion_log.csv";

/// Request timeout in seconds used when `nexus.timeout` is absent.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration file as written.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    /// Registry connection settings.
    pub nexus: NexusSection,

    /// Rules in evaluation order.
    #[serde(default)]
    pub rules: Vec<RuleSpec>,

    /// Tags never deleted.
    #[serde(default)]
    pub protected_tags: Vec<String>,

    /// Cron expression for recurring runs; absent or empty for a single run.
    #[serde(default)]
    pub schedule: Option<String>,

    /// Simulate deletions instead of performing them.
    #[serde(default)]
    pub dry_run: bool,

    /// Report skipped images and kept tags.
    #[serde(default)]
    pub verbose: bool,

    /// Audit log path.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

/// The `nexus` section of the configuration file.
#[derive(Clone, Default, Deserialize)]
pub struct NexusSection {
    /// Registry base URL.
    #[serde(default)]
    pub url: String,

    /// Username.
    #[serde(default)]
    pub username: String,

    /// Password or user token.
    #[serde(default)]
    pub password: String,

    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl fmt::Debug for NexusSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NexusSection")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl FileConfig {
    /// Validates the file contents into a [`Config`].
    ///
    /// # Errors
    ///
    /// Returns the first validation failure, naming the offending field or
    /// rule.
    pub fn validate(self) -> Result<Config> {
        let nexus = self.nexus;
        if nexus.url.trim().is_empty() {
            return Err(Error::invalid("nexus.url", "is required"));
        }
        if nexus.username.is_empty() {
            return Err(Error::invalid("nexus.username", "is required"));
        }
        if nexus.password.is_empty() {
            return Err(Error::invalid("nexus.password", "is required"));
        }
        match url::Url::parse(nexus.url.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(Error::invalid(
                    "nexus.url",
                    format!("'{}' is not an http(s) URL", nexus.url),
                ))
            }
        }
        let timeout = nexus.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout == 0 {
            return Err(Error::invalid("nexus.timeout", "must be at least 1 second"));
        }

        if self.rules.is_empty() {
            return Err(Error::invalid("rules", "at least one rule is required"));
        }
        let rules = RuleSet::from_specs(self.rules)?;
        let protected: ProtectedTags = self.protected_tags.into_iter().collect();

        let schedule = self
            .schedule
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let log_file = self
            .log_file
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

        let registry = RegistryConfig::new(
            nexus.url.trim(),
            Credentials::new(nexus.username, nexus.password),
        )
        .with_timeout(Duration::from_secs(timeout));

        Ok(Config {
            registry,
            policy: RetentionPolicy::new(rules, protected),
            schedule,
            dry_run: self.dry_run,
            verbose: self.verbose,
            log_file,
        })
    }
}

/// Validated configuration snapshot for a run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Registry client settings.
    pub registry: RegistryConfig,
    /// Rules and protected tags.
    pub policy: RetentionPolicy,
    /// Cron expression for recurring runs.
    pub schedule: Option<String>,
    /// Simulate deletions.
    pub dry_run: bool,
    /// Verbose reporting.
    pub verbose: bool,
    /// Audit log path.
    pub log_file: PathBuf,
}

impl Config {
    /// Reads, parses, and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML, or
    /// fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::parse(&content, &path.display().to_string())?;
        debug!(
            path = %path.display(),
            rules = config.policy.rules().len(),
            protected = config.policy.protected().len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parses and validates configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or fails validation.
    pub fn from_yaml(content: &str) -> Result<Self> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self> {
        let file: FileConfig =
            serde_yaml::from_str(content).map_err(|source| Error::ConfigParse {
                path: origin.to_string(),
                source,
            })?;
        file.validate()
    }
}
