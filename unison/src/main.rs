#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod commands;

use args::{Args, Command};
use clap::Parser;
use unison_config::Config;
use unison_llm::NormalizeOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    // Initialize telemetry
    unison_telemetry::init(&config.telemetry, args.log_filter.as_deref())?;

    if let Some(path) = &args.config {
        tracing::debug!(config_path = %path.display(), "using configuration file");
    }

    let options = NormalizeOptions::from_config(&config);

    match args.command {
        Command::Normalize(call) => commands::normalize(&call, options),
        Command::Reassemble(call) => commands::reassemble(&call, options).await,
    }
}
