//! # Retention Core
//!
//! Decides which container-image tags to keep and which to delete, and
//! drives the deletions.
//!
//! - [`Rule`] / [`RuleSet`] - ordered, pre-compiled image-name rules; the
//!   first match wins
//! - [`ProtectedTags`] - tags that are never deleted
//! - [`RetentionPolicy`] - rules plus protected tags, turning an image group
//!   into a [`GroupPlan`]
//! - [`RetentionEngine`] - one retention pass over every hosted repository
//! - [`Config`] - YAML configuration, validated into the types above
//!
//! ## Example
//!
//! ```rust
//! use retention_core::{ProtectedTags, RetentionPolicy, Rule, RuleSet};
//!
//! let rules = RuleSet::new(vec![Rule::new("prod", "^prod-.*", 2).unwrap()]);
//! let policy = RetentionPolicy::new(rules, ProtectedTags::from_iter(["latest"]));
//!
//! assert_eq!(policy.rules().first_match("prod-app").map(Rule::name), Some("prod"));
//! assert!(policy.rules().first_match("dev-app").is_none());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod error;
pub mod plan;
pub mod policy;
pub mod protection;
pub mod rule;


pub use config::{Config, FileConfig, NexusSection, DEFAULT_LOG_FILE};
pub use engine::{RetentionEngine, RunMode, RunSummary};
pub use error::{Error, Result};
pub use plan::{group_by_image, plan_group, sort_by_recency, GroupPlan, ImageGroup};
pub use policy::RetentionPolicy;
pub use protection::ProtectedTags;
pub use rule::{Rule, RuleSet, RuleSpec};
