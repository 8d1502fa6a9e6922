//! Command-line interface definition.
//!
//! Gatesync is a single-purpose binary: one invocation performs one
//! synchronization run. The flags only shape logging and where the
//! environment is read from; everything else is environment configuration
//! (see [`crate::config`]).

use clap::Parser;
use std::path::PathBuf;

/// Gatesync - sync vehicle presence events into an NGSI-LD context broker
///
/// Consumes the pending backlog of presence events from Kafka, converts
/// each event into a Vehicle entity and upserts the whole batch into the
/// context broker, then exits.
#[derive(Parser, Debug, Clone)]
#[command(name = "gatesync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a .env file with GATESYNC_* variables
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,

    /// Log level when RUST_LOG is not set
    #[arg(long, env = "GATESYNC_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit JSON-formatted logs
    #[arg(long)]
    pub json_logs: bool,

    /// Also append logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
