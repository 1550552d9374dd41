//! Marine CLI - Marine Insights dashboard client
//!
//! Usage:
//!   marine classify fish.jpg          Classify a fish image
//!   marine overfishing catch.csv      Overfishing analysis
//!   marine sst --hint                 SST upload instructions
//!   marine edna sample.fasta --ask Q  eDNA analysis and species chat

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(
        cli.config.as_deref(),
        cli.api_base.as_deref(),
        cli.origin.as_deref(),
    )?;

    let client = || commands::build_client(&config, cli.mock);

    match cli.command {
        Commands::Classify { image } => commands::cmd_classify(&client()?, &image, cli.json).await,
        Commands::Overfishing { csv } => {
            commands::cmd_overfishing(&client()?, &csv, cli.json).await
        }
        Commands::Chlorophyll { csv } => {
            commands::cmd_chlorophyll(&client()?, &csv, cli.json).await
        }
        Commands::Sst { csv, hint } => {
            commands::cmd_sst(&client()?, csv.as_deref(), hint, cli.json).await
        }
        Commands::Edna { file, questions } => {
            commands::cmd_edna(&client()?, &file, &questions, cli.json).await
        }
        Commands::Chat { question } => {
            commands::cmd_chat(&client()?, &question.join(" "), cli.json).await
        }
        Commands::Url { path, params } => commands::cmd_url(&config, &path, &params, cli.json),
        Commands::Config => commands::cmd_config(&config, cli.mock, cli.json),
    }
}
