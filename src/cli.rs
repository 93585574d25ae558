use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// apilog: batch analyzer for API access logs
#[derive(Parser)]
#[command(name = "apilog", version, about)]
pub struct Cli {
    /// Emit log lines as JSON instead of human-readable text
    #[arg(long, global = true, env = "APILOG_LOG_JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a batch of access log records and print the report
    Analyze {
        /// JSON array file, JSON Lines file, or `-` for stdin
        input: PathBuf,
        /// YAML file overriding the default thresholds and prices
        #[arg(short, long, env = "APILOG_CONFIG")]
        config: Option<PathBuf>,
        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Single-line JSON output
        #[arg(long)]
        compact: bool,
        /// Treat the input as JSON Lines regardless of its extension
        #[arg(long)]
        jsonl: bool,
    },

    /// Generate synthetic access logs as a JSON array
    Generate {
        #[arg(short = 'n', long, default_value = "300")]
        count: usize,
        #[arg(long, default_value = "42")]
        seed: u64,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration as YAML
    Config {
        #[arg(short, long, env = "APILOG_CONFIG")]
        config: Option<PathBuf>,
    },
}
