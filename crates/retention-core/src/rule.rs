//! Retention rules.
//!
//! A [`RuleSpec`] is the rule as written in configuration. Validation turns
//! it into a [`Rule`] holding the compiled pattern, so matching never
//! compiles anything.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A rule as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Rule name, recorded in the audit log.
    #[serde(default)]
    pub name: String,

    /// Regular expression matched against image names.
    #[serde(default)]
    pub regex: String,

    /// Number of most recent non-protected tags to keep.
    #[serde(default)]
    pub keep: usize,
}

/// A validated retention rule.
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    pattern: Regex,
    keep: usize,
}

impl Rule {
    /// Validates and compiles a rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or pattern is empty, `keep` is zero, or
    /// the pattern does not compile.
    ///
    /// # Examples
    ///
    /// ```
    /// use retention_core::Rule;
    ///
    /// let rule = Rule::new("prod", "^prod-.*", 5).unwrap();
    /// assert!(rule.matches("prod-api"));
    /// assert!(!rule.matches("staging-api"));
    ///
    /// assert!(Rule::new("prod", "^prod-.*", 0).is_err());
    /// assert!(Rule::new("prod", "(", 1).is_err());
    /// assert!(Rule::new("prod", "", 1).is_err());
    /// ```
    pub fn new(name: impl Into<String>, pattern: &str, keep: usize) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid("rules.name", "rule name must not be empty"));
        }
        if keep < 1 {
            return Err(Error::invalid(
                format!("rules.{name}.keep"),
                "keep must be at least 1",
            ));
        }
        if pattern.trim().is_empty() {
            return Err(Error::invalid(
                format!("rules.{name}.regex"),
                "regex must not be empty",
            ));
        }
        let pattern = Regex::new(pattern).map_err(|source| Error::InvalidPattern {
            rule: name.clone(),
            source,
        })?;

        Ok(Self {
            name,
            pattern,
            keep,
        })
    }

    /// Rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source text of the pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Number of most recent non-protected tags to keep.
    #[must_use]
    pub const fn keep(&self) -> usize {
        self.keep
    }

    /// Returns true if the pattern matches anywhere in `image_name`.
    #[must_use]
    pub fn matches(&self, image_name: &str) -> bool {
        self.pattern.is_match(image_name)
    }
}

impl TryFrom<RuleSpec> for Rule {
    type Error = Error;

    fn try_from(spec: RuleSpec) -> Result<Self> {
        Self::new(spec.name, &spec.regex, spec.keep)
    }
}

/// Rules in configured order.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Creates a rule set; `rules` order is evaluation order.
    #[must_use]
    pub const fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Validates rule specs in order.
    ///
    /// # Errors
    ///
    /// Returns the first validation error.
    pub fn from_specs(specs: impl IntoIterator<Item = RuleSpec>) -> Result<Self> {
        specs
            .into_iter()
            .map(Rule::try_from)
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }

    /// Returns the first rule matching `image_name`. Later rules are not
    /// consulted once one matches.
    #[must_use]
    pub fn first_match(&self, image_name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(image_name))
    }

    /// Iterates rules in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
