//! Nexus Retention CLI - enforces tag retention rules on hosted docker repositories.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod schedule;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "retention=debug,nexus_retention=debug"
    } else {
        "retention=info,nexus_retention=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Run(args) => commands::run::execute(args, cli.verbose).await,
        Commands::Validate(args) => commands::validate::run(&args),
        Commands::Version => {
            println!("nexus-retention {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
