//! CLI commands and argument parsing.

pub mod run;
pub mod validate;

use clap::{Parser, Subcommand};

/// Nexus Retention - keeps the newest image tags and removes the rest
#[derive(Parser)]
#[command(name = "nexus-retention")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Report skipped images and kept tags, and log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Apply retention rules, once or on the configured schedule
    Run(run::RunArgs),

    /// Validate a configuration file
    Validate(validate::ValidateArgs),

    /// Print version information
    Version,
}
