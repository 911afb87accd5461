//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Config used when `--config` is not given; a missing file means defaults.
pub const DEFAULT_CONFIG_PATH: &str = "etc/charger_config.toml";

#[derive(Parser, Debug)]
#[command(name = "charger", version, about = "LiPo charger cell classifier")]
pub struct Cli {
    /// Path to config TOML (typed) [default: etc/charger_config.toml if present]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Replay conversion frames from this CSV instead of the simulator
    #[arg(long, value_name = "FILE")]
    pub frames: Option<PathBuf>,

    /// Output JSON (results and logs) instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging].level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify six cell tap codes (decimal or 0x-prefixed hex)
    Classify {
        #[arg(value_name = "CODE", num_args = 6, required = true, value_parser = parse_code)]
        codes: Vec<u16>,
    },
    /// Rank cell codes the way the balancing stage sees them
    Rank {
        #[arg(value_name = "CODE", num_args = 1..=6, required = true, value_parser = parse_code)]
        codes: Vec<u16>,
    },
    /// Run the sampling cycle against the replay or simulated backend
    Run {
        /// Stop after this many cycles (overrides sampling.max_cycles; 0 = until Ctrl-C)
        #[arg(long, value_name = "N")]
        cycles: Option<u64>,
        /// Print cycle latency stats on completion
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
        /// Restart the --frames recording from the top instead of stopping at its end
        #[arg(long = "loop", action = ArgAction::SetTrue)]
        looping: bool,
    },
    /// Run one cycle through the configured backend
    SelfCheck,
    /// Health check for operational monitoring
    Health,
}

/// Parse a raw code given as decimal or `0x`-prefixed hex.
pub fn parse_code(s: &str) -> Result<u16, String> {
    let t = s.trim();
    let parsed = match t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => t.parse::<u16>(),
    };
    parsed.map_err(|e| format!("invalid code {s:?}: {e}"))
}
