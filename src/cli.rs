use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fishcast",
    version,
    about = "Weather, tides and fishing conditions for one spot"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll weather and tides and print conditions as they change (default)
    Watch,
    /// Fetch each upstream once and print the normalized result
    Check {
        /// Print snapshots as JSON
        #[arg(long)]
        json: bool,
    },
    /// Re-run interactive setup
    Init,
}

impl Cli {
    /// Log filter used when RUST_LOG is not set
    pub fn default_log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "fishcast=debug",
            _ => "fishcast=trace",
        }
    }
}
