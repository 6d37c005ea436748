use crate::config::cli::{Args, Command};
use crate::config::Config;
use crate::error::Result;
use crate::infrastructure::{FetchSession, FileSystemStore, HttpFetcher};
use crate::services::{PipelineService, ScrapingService};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, Level};

mod config;
mod domain;
mod error;
mod infrastructure;
mod services;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let level = args.log_level.parse().unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    if let Err(e) = run(args).await {
        error!("Pipeline failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::from_args(args)?;
    config.ensure_directories()?;

    let store = Arc::new(FileSystemStore::new(
        config.args.data_dir.clone(),
        config.args.cache_dir.clone(),
    ));
    let session = FetchSession::open(HttpFetcher::new(config.http_client.clone()));
    let scraping = ScrapingService::new(session, config.request_delay());

    let command = config.args.command.clone();
    let pipeline = PipelineService::new(config, store, scraping);

    match command {
        Some(Command::Scrape { min_minutes }) => {
            let results = pipeline.run_scrape(min_minutes).await?;
            info!("Scrape completed: {} players", results.len());
        }
        Some(Command::Values { regular_minutes }) => {
            let matched = pipeline.run_values(regular_minutes).await?;
            info!("Market values completed: {} players matched", matched.len());
        }
        Some(Command::Describe) => {
            let report = pipeline.run_describe()?;
            info!("Statistics completed: {} metrics", report.metrics.len());
        }
        Some(Command::Cluster) => {
            let report = pipeline.run_cluster()?;
            info!("Clustering completed: {} clusters", report.chosen_k);
        }
        None => pipeline.process().await?,
    }

    Ok(())
}
