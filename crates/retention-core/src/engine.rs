//! The retention engine.
//!
//! One call to [`RetentionEngine::execute_once`] is one pass:
//!
//! ```text
//! list repositories
//!   └─ per repository: list components ─ group by image
//!        └─ per image: match rule ─ protect ─ sort ─ split ─ delete + audit
//! ```
//!
//! Repositories, images, and components are processed sequentially. A failed
//! component listing skips that repository; a failed deletion skips that
//! component. Only a failed repository listing fails the run.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use retention_audit::{AuditSink, DeletionRecord};
use retention_registry::{Component, RegistryApi};

use crate::error::{Error, Result};
use crate::plan::group_by_image;
use crate::policy::RetentionPolicy;
use crate::rule::Rule;

/// Whether deletions are performed or only recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Compute and record decisions without deleting anything.
    #[default]
    DryRun,
    /// Delete components from the registry.
    Execute,
}

impl RunMode {
    /// Maps a `dry_run` flag to a mode.
    #[must_use]
    pub const fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            Self::DryRun
        } else {
            Self::Execute
        }
    }

    /// Returns true in dry-run mode.
    #[must_use]
    pub const fn is_dry_run(self) -> bool {
        matches!(self, Self::DryRun)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DryRun => write!(f, "dry-run"),
            Self::Execute => write!(f, "execute"),
        }
    }
}

/// Totals for one retention pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Repositories whose components were listed and processed.
    pub repositories: usize,
    /// Repositories skipped because their components could not be listed.
    pub repositories_failed: usize,
    /// Image groups matched by a rule.
    pub images_matched: usize,
    /// Image groups matched by no rule.
    pub images_skipped: usize,
    /// Components kept, protected ones included.
    pub kept: usize,
    /// Components deleted (or, in dry-run mode, that would be deleted).
    pub deleted: usize,
    /// Deletions the registry rejected.
    pub failed_deletions: usize,
    /// Audit records that could not be written.
    pub audit_failures: usize,
}

impl RunSummary {
    /// Returns true if anything failed without aborting the run.
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.repositories_failed > 0 || self.failed_deletions > 0 || self.audit_failures > 0
    }
}

/// Runs retention passes against a registry.
///
/// The engine holds no state between passes; calling
/// [`execute_once`](Self::execute_once) concurrently is safe as long as the
/// audit sink serializes its appends.
pub struct RetentionEngine<R> {
    registry: R,
    policy: RetentionPolicy,
    audit: Arc<dyn AuditSink>,
    mode: RunMode,
    verbose: bool,
}

impl<R> fmt::Debug for RetentionEngine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetentionEngine")
            .field("policy", &self.policy)
            .field("audit", &self.audit.name())
            .field("mode", &self.mode)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl<R: RegistryApi> RetentionEngine<R> {
    /// Creates an engine in dry-run mode.
    pub fn new(registry: R, policy: RetentionPolicy, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            registry,
            policy,
            audit,
            mode: RunMode::DryRun,
            verbose: false,
        }
    }

    /// Sets the run mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enables verbose reporting of skipped images and kept tags.
    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Current run mode.
    #[must_use]
    pub const fn mode(&self) -> RunMode {
        self.mode
    }

    /// The registry this engine operates on.
    #[must_use]
    pub const fn registry(&self) -> &R {
        &self.registry
    }

    /// Runs one retention pass over every hosted docker repository.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RepositoryListing`] if repositories cannot be listed.
    /// All other failures are logged and counted in the summary.
    pub async fn execute_once(&self) -> Result<RunSummary> {
        info!(mode = %self.mode, "Starting retention run");

        let repositories = self
            .registry
            .list_hosted_repositories()
            .await
            .map_err(|source| Error::RepositoryListing { source })?;
        info!(count = repositories.len(), "Found hosted docker repositories");

        let mut summary = RunSummary::default();
        for repository in &repositories {
            match self.registry.list_components(&repository.name).await {
                Ok(components) => {
                    info!(
                        repository = %repository.name,
                        components = components.len(),
                        "Processing repository"
                    );
                    summary.repositories += 1;
                    self.process_repository(&repository.name, components, &mut summary)
                        .await;
                }
                Err(e) => {
                    warn!(
                        repository = %repository.name,
                        error = %e,
                        "Failed to list components, skipping repository"
                    );
                    summary.repositories_failed += 1;
                }
            }
        }

        info!(
            mode = %self.mode,
            kept = summary.kept,
            deleted = summary.deleted,
            failed_deletions = summary.failed_deletions,
            repositories_failed = summary.repositories_failed,
            "Retention run completed"
        );
        Ok(summary)
    }

    async fn process_repository(
        &self,
        repository: &str,
        components: Vec<Component>,
        summary: &mut RunSummary,
    ) {
        for group in group_by_image(components) {
            let image = group.name.clone();
            let Some((rule, plan)) = self.policy.evaluate(group) else {
                if self.verbose {
                    info!(repository, image = %image, "No matching rule, skipping image");
                } else {
                    debug!(repository, image = %image, "No matching rule, skipping image");
                }
                summary.images_skipped += 1;
                continue;
            };

            info!(
                repository,
                image = %image,
                rule = rule.name(),
                keep = rule.keep(),
                protected = plan.protected.len(),
                candidates = plan.delete.len(),
                "Evaluated image"
            );
            summary.images_matched += 1;

            for component in &plan.protected {
                self.report_kept(&image, component, true);
            }
            for component in &plan.keep {
                self.report_kept(&image, component, false);
            }
            summary.kept += plan.kept_count();

            for component in &plan.delete {
                self.remove(repository, &image, rule, component, summary)
                    .await;
            }
        }
    }

    fn report_kept(&self, image: &str, component: &Component, protected: bool) {
        if self.verbose {
            info!(image, tag = %component.version, protected, "Keeping tag");
        } else {
            debug!(image, tag = %component.version, protected, "Keeping tag");
        }
    }

    /// Deletes (or simulates deleting) one component and records it.
    async fn remove(
        &self,
        repository: &str,
        image: &str,
        rule: &Rule,
        component: &Component,
        summary: &mut RunSummary,
    ) {
        let tag = component.version.as_str();

        match self.mode {
            RunMode::DryRun => {
                info!(repository, image, tag, rule = rule.name(), "Would delete tag");
            }
            RunMode::Execute => {
                info!(repository, image, tag, rule = rule.name(), "Deleting tag");
                if let Err(e) = self.registry.delete_component(&component.id).await {
                    warn!(
                        repository,
                        image,
                        tag,
                        component_id = %component.id,
                        error = %e,
                        "Failed to delete tag"
                    );
                    summary.failed_deletions += 1;
                    return;
                }
            }
        }

        let record = DeletionRecord::new(
            repository,
            image,
            tag,
            component.id.as_str(),
            rule.name(),
            self.mode.is_dry_run(),
        );
        if let Err(e) = self.audit.append(&record) {
            warn!(
                sink = self.audit.name(),
                repository,
                image,
                tag,
                error = %e,
                "Failed to write audit record"
            );
            summary.audit_failures += 1;
        }

        summary.deleted += 1;
    }
}
