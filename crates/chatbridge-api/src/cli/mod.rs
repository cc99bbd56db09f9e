//! CLI command definitions for the `chatbridge` binary.

pub mod providers;
pub mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Bridge two AI agents into one conversation.
#[derive(Parser)]
#[command(name = "chatbridge", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the config file (defaults to ./chatbridge.toml).
    #[arg(long, global = true, env = "CHATBRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Export spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST/WebSocket API server.
    Serve {
        /// Port to listen on.
        #[arg(long, default_value = "8000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// List providers and their credential status.
    Providers,

    /// Run a conversation in the terminal until it finishes or Ctrl+C.
    Run(run::RunArgs),
}
