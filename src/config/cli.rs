use crate::domain::fields::{BASE_MINUTES_THRESHOLD, REGULAR_MINUTES_THRESHOLD};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the source pages configuration file
    #[arg(long, default_value = "sources.json")]
    pub config_file: PathBuf,

    /// Directory to store output data
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory for caching extracted category tables
    #[arg(long, default_value = "cache")]
    pub cache_dir: PathBuf,

    /// Reuse cached category tables instead of fetching them again
    #[arg(long)]
    pub use_cache: bool,

    /// Pause after every page fetch, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub request_delay_ms: u64,

    /// HTTP timeout per page, in seconds
    #[arg(long, default_value_t = 20)]
    pub timeout_secs: u64,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "SQUADSTATS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Scrape every stat category and write results.csv
    Scrape {
        /// Players with this many minutes or fewer are left out
        #[arg(long, default_value_t = BASE_MINUTES_THRESHOLD)]
        min_minutes: f64,
    },
    /// Scrape market values for the regular players of results.csv
    Values {
        /// Players with this many minutes or fewer are not cross-referenced
        #[arg(long, default_value_t = REGULAR_MINUTES_THRESHOLD)]
        regular_minutes: f64,
    },
    /// Compute per-metric and per-team statistics from results.csv
    Describe,
    /// Cluster the players of results.csv with k-means
    Cluster,
}
