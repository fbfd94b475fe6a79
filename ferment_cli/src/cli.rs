//! CLI argument definitions.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "ferment", version, about = "Fermentation rig controller")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/ferment.toml")]
    pub config: PathBuf,

    /// Log and report as JSON instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins when set
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the control loop until Ctrl-C
    Run {
        /// Use the in-memory simulated gateway instead of HTTP
        #[arg(long, action = ArgAction::SetTrue)]
        sim: bool,
        /// Stop after this many cycles
        #[arg(long, value_name = "N")]
        max_cycles: Option<u64>,
    },
    /// Run a single cycle and print the system status
    Once {
        /// Use the in-memory simulated gateway instead of HTTP
        #[arg(long, action = ArgAction::SetTrue)]
        sim: bool,
    },
    /// Resolve well-known entities and probe every configured circuit
    SelfCheck {
        /// Use the in-memory simulated gateway instead of HTTP
        #[arg(long, action = ArgAction::SetTrue)]
        sim: bool,
    },
}
