//! Run command implementation.
//!
//! Applies the configured retention rules, either once or on the configured
//! cron schedule until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{error, info, warn};

use retention_audit::CsvFileSink;
use retention_core::{Config, RetentionEngine, RunMode, RunSummary};
use retention_registry::NexusClient;

use crate::schedule::RecurringTrigger;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Path to the configuration file
    #[arg(short, long, env = "NEXUS_RETENTION_CONFIG", default_value = "config.yaml")]
    pub config: PathBuf,

    /// Simulate deletions, overriding the configuration
    #[arg(long, conflicts_with = "execute")]
    pub dry_run: bool,

    /// Perform deletions, overriding the configuration
    #[arg(long)]
    pub execute: bool,

    /// Run once even if a schedule is configured
    #[arg(long)]
    pub once: bool,
}

impl RunArgs {
    /// Resolves the run mode: command-line flags win over the config file.
    fn mode(&self, config_dry_run: bool) -> RunMode {
        if self.dry_run {
            RunMode::DryRun
        } else if self.execute {
            RunMode::Execute
        } else {
            RunMode::from_dry_run(config_dry_run)
        }
    }
}

/// Runs the run command.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration cannot be loaded or is invalid
/// - The audit log cannot be opened
/// - The schedule expression is invalid
/// - A single run cannot list repositories
pub async fn execute(args: RunArgs, verbose: bool) -> Result<()> {
    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let mode = args.mode(config.dry_run);
    let verbose = verbose || config.verbose;

    let sink = CsvFileSink::open(&config.log_file).with_context(|| {
        format!("Failed to open audit log {}", config.log_file.display())
    })?;
    let client =
        NexusClient::new(config.registry.clone()).context("Failed to create registry client")?;

    let schedule = if args.once {
        None
    } else {
        config
            .schedule
            .as_deref()
            .map(RecurringTrigger::parse)
            .transpose()?
    };

    let engine = RetentionEngine::new(client, config.policy.clone(), Arc::new(sink))
        .with_mode(mode)
        .with_verbose(verbose);

    println!("Nexus Retention Policy");
    println!("======================");
    println!("Registry: {}", config.registry.url);
    println!("Audit log: {}", config.log_file.display());
    match mode {
        RunMode::DryRun => println!("Mode: dry run (no deletions will be performed)"),
        RunMode::Execute => println!("Mode: execute (deletions will be performed)"),
    }

    let Some(trigger) = schedule else {
        let summary = engine.execute_once().await.context("Retention run failed")?;
        print_summary(&summary, mode);
        return Ok(());
    };

    println!("Schedule: {} (press Ctrl+C to stop)", trigger.expression());
    let engine = &engine;
    let runs = trigger
        .run_until(
            move || async move {
                match engine.execute_once().await {
                    Ok(summary) => print_summary(&summary, engine.mode()),
                    Err(e) => error!(error = %e, "Scheduled retention run failed"),
                }
            },
            shutdown_signal(),
        )
        .await;

    info!(runs, "Scheduler stopped");
    println!("Shutting down gracefully after {runs} run(s)");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C, stopping scheduler");
    }
}

fn print_summary(summary: &RunSummary, mode: RunMode) {
    let deleted_label = if mode.is_dry_run() {
        "Would delete"
    } else {
        "Deleted"
    };

    println!();
    println!("Retention run completed");
    println!("  Repositories: {}", summary.repositories);
    println!(
        "  Images:       {} matched, {} skipped",
        summary.images_matched, summary.images_skipped
    );
    println!("  Kept:         {}", summary.kept);
    println!("  {deleted_label}: {}", summary.deleted);

    if summary.has_failures() {
        println!("  Warnings:");
        if summary.repositories_failed > 0 {
            println!(
                "    {} repositories could not be listed",
                summary.repositories_failed
            );
        }
        if summary.failed_deletions > 0 {
            println!("    {} deletions failed", summary.failed_deletions);
        }
        if summary.audit_failures > 0 {
            println!(
                "    {} audit records could not be written",
                summary.audit_failures
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(dry_run: bool, execute: bool) -> RunArgs {
        RunArgs {
            config: PathBuf::from("config.yaml"),
            dry_run,
            execute,
            once: false,
        }
    }

    #[test]
    fn test_mode_from_config() {
        assert_eq!(args(false, false).mode(true), RunMode::DryRun);
        assert_eq!(args(false, false).mode(false), RunMode::Execute);
    }

    #[test]
    fn test_flags_override_config() {
        assert_eq!(args(true, false).mode(false), RunMode::DryRun);
        assert_eq!(args(false, true).mode(true), RunMode::Execute);
    }

    #[tokio::test]
    async fn test_missing_config_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut run_args = args(false, false);
        run_args.config = dir.path().join("absent.yaml");

        let err = execute(run_args, false).await.unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[tokio::test]
    async fn test_invalid_schedule_fails_before_running() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("config.yaml");
        let log_path = dir.path().join("log.csv");
        std::fs::write(
            &config_path,
            format!(
                "nexus:\n  url: http://127.0.0.1:9\n  username: u\n  password: p\n\
                 rules:\n  - name: all\n    regex: '.*'\n    keep: 1\n\
                 schedule: 'not a cron'\nlog_file: {}\n",
                log_path.display()
            ),
        )
        .unwrap();
        let mut run_args = args(true, false);
        run_args.config = config_path;

        let err = execute(run_args, false).await.unwrap_err();
        assert!(err.to_string().contains("Invalid cron schedule"));
    }
}
