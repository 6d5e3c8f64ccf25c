use std::path::PathBuf;

use clap::{Parser, Subcommand};
use unison_llm::Provider;

/// Unison response inspector
#[derive(Debug, Parser)]
#[command(name = "unison", about = "Normalize recorded LLM responses and streams across providers")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "UNISON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter, overriding `RUST_LOG` and the configured filter
    #[arg(long)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize a complete provider response
    Normalize(CallArgs),
    /// Replay a recorded stream, one JSON chunk per line
    Reassemble(CallArgs),
}

/// The call a recording came from
#[derive(Debug, clap::Args)]
pub struct CallArgs {
    /// Provider the call was sent to
    #[arg(short, long)]
    pub provider: Provider,

    /// Requested model
    #[arg(short, long)]
    pub model: String,

    /// JSON array of tool schemas the call declared
    #[arg(long)]
    pub tools: Option<PathBuf>,

    /// Recorded response or stream
    pub input: PathBuf,
}
