//! Validate command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use retention_core::Config;

use crate::schedule::RecurringTrigger;

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the configuration file
    #[arg(short, long, env = "NEXUS_RETENTION_CONFIG", default_value = "config.yaml")]
    pub config: PathBuf,
}

/// Runs the validate command.
///
/// # Errors
///
/// Returns an error if the configuration or its schedule is invalid.
pub fn run(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let config = Config::load(&args.config)
        .with_context(|| format!("Invalid configuration in {}", args.config.display()))?;

    println!("Configuration: {}", args.config.display());
    println!("Registry:      {}", config.registry.url);
    println!("Timeout:       {}s", config.registry.timeout.as_secs());
    println!("Audit log:     {}", config.log_file.display());
    println!(
        "Mode:          {}",
        if config.dry_run { "dry run" } else { "execute" }
    );
    println!();

    println!("Rules (first match wins):");
    for (i, rule) in config.policy.rules().iter().enumerate() {
        println!(
            "  {}. {}  /{}/  keep {}",
            i + 1,
            rule.name(),
            rule.pattern(),
            rule.keep()
        );
    }

    let protected: Vec<&str> = config.policy.protected().iter().collect();
    if protected.is_empty() {
        println!("Protected tags: none");
    } else {
        println!("Protected tags: {}", protected.join(", "));
    }

    match config.schedule.as_deref() {
        Some(expression) => {
            let trigger = RecurringTrigger::parse(expression)?;
            match trigger.next_after(&chrono::Local::now()) {
                Some(next) => println!("Schedule: {expression} (next run {})", next.to_rfc3339()),
                None => println!("Schedule: {expression} (no future runs)"),
            }
        }
        None => println!("Schedule: none (single run)"),
    }

    println!();
    println!("✓ Configuration is valid");
    Ok(())
}
