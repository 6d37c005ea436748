use crate::config::{CategorySource, Config};
use crate::domain::fields::{BASE_MINUTES_THRESHOLD, IDENTITY_FIELD, REGULAR_MINUTES_THRESHOLD};
use crate::domain::storage::Storage;
use crate::domain::{
    CategoryStatus, CategorySummary, CategoryTable, MarketValue, OutputTable, RunManifest,
    ClusterReport, StatsReport,
};
use crate::error::{PipelineError, Result};
use crate::infrastructure::PageFetcher;
use crate::services::{
    clustering::cluster,
    matching::{reconcile, Roster},
    merging::merge,
    normalizing::normalize_output,
    scraping::ScrapingService,
    statistics::describe,
};
use rustc_hash::FxHashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub struct PipelineService<F: PageFetcher> {
    config: Config,
    store: Arc<dyn Storage>,
    scraping: ScrapingService<F>,
}

impl<F: PageFetcher> PipelineService<F> {
    pub fn new(config: Config, store: Arc<dyn Storage + 'static>, scraping: ScrapingService<F>) -> Self {
        Self {
            config,
            store,
            scraping,
        }
    }

    /// Runs every stage with the default thresholds.
    pub async fn process(&self) -> Result<()> {
        info!("Starting player data pipeline");

        let results = self.run_scrape(BASE_MINUTES_THRESHOLD).await?;
        info!("Player table completed: {} players", results.len());

        let values = self.run_values(REGULAR_MINUTES_THRESHOLD).await?;
        info!("Market values completed: {} players matched", values.len());

        self.run_describe()?;
        self.run_cluster()?;
        info!("Processing pipeline completed successfully");

        Ok(())
    }

    /// Stage 1: scrape every category, merge onto the primary one and write
    /// `results.csv`.
    pub async fn run_scrape(&self, min_minutes: f64) -> Result<OutputTable> {
        info!("Scraping {} categories", self.config.sources.categories.len());
        let tables = self.collect_categories().await?;

        let primary_name = &self.config.primary_source()?.name;
        let (primaries, secondaries): (Vec<CategoryTable>, Vec<CategoryTable>) = tables
            .iter()
            .cloned()
            .partition(|table| &table.category == primary_name);

        let primary = primaries
            .into_iter()
            .next()
            .filter(|table| !table.is_empty() && table.table.has_column(IDENTITY_FIELD))
            .ok_or_else(|| PipelineError::PrimaryUnavailable(primary_name.clone()))?;

        let merged = merge(&primary, &secondaries);
        let results = normalize_output(&merged, min_minutes);
        self.store.save_results(&results)?;
        info!(
            "Wrote {} players to {}",
            results.len(),
            self.store.results_location()
        );

        let manifest = RunManifest::new(results.len(), min_minutes, self.summaries(&tables));
        self.store.save_manifest(&manifest)?;

        Ok(results)
    }

    /// Stage 1b: market values for the regular players of `results.csv`.
    /// Nothing is written when no player matches.
    pub async fn run_values(&self, regular_minutes: f64) -> Result<Vec<MarketValue>> {
        info!("Cross-referencing market values above {} minutes", regular_minutes);
        let location = self.store.results_location();
        let results = self.load_results()?;

        let roster = Roster::eligible(&results, &location, regular_minutes)?;
        if roster.is_empty() {
            warn!("No player above {} minutes, skipping market values", regular_minutes);
            return Ok(Vec::new());
        }

        let values = self
            .scraping
            .scrape_market_values(&self.config.sources.transfer_pages)
            .await?;
        let matched = reconcile(&roster, values);

        if matched.is_empty() {
            warn!("No market value matched a player of {}", location);
        } else {
            self.store.save_market_values(&matched)?;
            info!("Saved market values for {} players", matched.len());
        }

        Ok(matched)
    }

    /// Stage 2: descriptive statistics of `results.csv`.
    pub fn run_describe(&self) -> Result<StatsReport> {
        info!("Computing descriptive statistics");
        let results = self.load_results()?;
        let report = describe(&results, &self.store.results_location())?;
        self.store.save_report(&report)?;
        info!(
            "Saved statistics for {} metrics and {} groups",
            report.metrics.len(),
            report.groups.len()
        );
        Ok(report)
    }

    /// Stage 3: k-means grouping of the players of `results.csv`.
    pub fn run_cluster(&self) -> Result<ClusterReport> {
        info!("Clustering players");
        let results = self.load_results()?;
        let report = cluster(&results, &self.store.results_location())?;
        self.store.save_clusters(&report.label(&results), &report)?;
        info!(
            "Saved {} clusters of {} players",
            report.chosen_k,
            report.assignments.len()
        );
        Ok(report)
    }

    fn load_results(&self) -> Result<OutputTable> {
        self.store
            .load_results()?
            .ok_or_else(|| PipelineError::MissingInput(PathBuf::from(self.store.results_location())))
    }

    /// Category tables in configuration order. With `--use-cache`, tables
    /// extracted by an earlier run are reused and only the rest is fetched.
    /// Freshly extracted non-empty tables are cached.
    async fn collect_categories(&self) -> Result<Vec<CategoryTable>> {
        let sources = &self.config.sources.categories;
        let mut cached: FxHashMap<String, CategoryTable> = FxHashMap::default();
        let mut to_scrape: Vec<CategorySource> = Vec::new();

        for source in sources {
            let hit = if self.config.args.use_cache {
                self.store.load_category(&source.name)?
            } else {
                None
            };

            match hit {
                Some(table) => {
                    info!("Using cached table for '{}'", source.name);
                    cached.insert(source.name.clone(), table);
                }
                None => to_scrape.push(source.clone()),
            }
        }

        for table in self.scraping.scrape_categories(&to_scrape).await? {
            if !table.is_empty() {
                self.store.save_category(&table)?;
            }
            cached.insert(table.category.clone(), table);
        }

        Ok(sources
            .iter()
            .map(|source| {
                cached
                    .remove(&source.name)
                    .unwrap_or_else(|| CategoryTable::empty(&source.name))
            })
            .collect())
    }

    fn summaries(&self, tables: &[CategoryTable]) -> Vec<CategorySummary> {
        self.config
            .sources
            .categories
            .iter()
            .zip(tables)
            .map(|(source, table)| {
                let status = if source.name == self.config.sources.primary {
                    CategoryStatus::Primary
                } else if table.is_empty() || !table.table.has_column(IDENTITY_FIELD) {
                    CategoryStatus::Skipped
                } else {
                    CategoryStatus::Merged
                };

                CategorySummary {
                    name: source.name.clone(),
                    url: source.url.clone(),
                    rows: table.table.len(),
                    status,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::Args;
    use crate::config::SourceConfig;
    use crate::domain::{Record, Table};
    use crate::infrastructure::{FetchSession, FileSystemStore};
    use crate::services::scraping::tests::StaticPages;
    use clap::Parser;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const STANDARD: &str = r#"<html><body>
        <!-- <table id="stats_standard"><tbody>
            <tr><th data-stat="player">John Doe</th><td data-stat="nationality">eng ENG</td>
                <td data-stat="age">27-045</td><td data-stat="team">X</td>
                <td data-stat="minutes">950</td></tr>
            <tr><th data-stat="player">Bench Guy</th><td data-stat="team">Y</td>
                <td data-stat="minutes">80</td></tr>
            <tr><th data-stat="player">Ann Other</th><td data-stat="team">Y</td>
                <td data-stat="minutes">1,400</td></tr>
            <tr><th data-stat="player">Cole Palmer</th><td data-stat="team">Z</td>
                <td data-stat="minutes">2,000</td></tr>
        </tbody></table> -->
    </body></html>"#;

    const SHOOTING: &str = r#"<html><body><table id="stats_shooting"><tbody>
        <tr><th data-stat="player">John Doe</th><td data-stat="team">Z</td>
            <td data-stat="goals">5</td></tr>
        <tr><th data-stat="player">Ann Other</th><td data-stat="goals">2</td></tr>
        <tr><th data-stat="player">Cole Palmer</th><td data-stat="goals">9</td></tr>
    </tbody></table></body></html>"#;

    const VALUES: &str = r#"<table class="mvp-table"><tbody>
        <tr><td><span class="d-none">john doe</span>
            <span class="td-team__teamname">X</span>
            <span class="player-tag">€5M</span>
            <div class="table-skill__skill">75</div>
            <div class="table-skill__pot">80.5</div></td></tr>
        <tr><td><span class="d-none">Someone Else</span>
            <span class="player-tag">€1M</span></td></tr>
    </tbody></table>"#;

    fn sources() -> SourceConfig {
        let category = |name: &str| CategorySource {
            name: name.to_string(),
            url: format!("https://stats.test/{name}"),
            table_id: format!("stats_{name}"),
        };

        SourceConfig {
            primary: "standard".to_string(),
            categories: vec![category("standard"), category("shooting"), category("keepers")],
            transfer_pages: vec!["https://values.test/1".to_string()],
        }
    }

    fn pages() -> StaticPages {
        StaticPages::default()
            .with("https://stats.test/standard", STANDARD)
            .with("https://stats.test/shooting", SHOOTING)
            .with("https://values.test/1", VALUES)
    }

    fn pipeline<F: PageFetcher>(
        dir: &tempfile::TempDir,
        pages: F,
        extra: &[&str],
    ) -> PipelineService<F> {
        let data = dir.path().join("data");
        let cache = dir.path().join("cache");
        let config_file = dir.path().join("sources.json");

        let mut argv = vec![
            "squadstats".to_string(),
            "--config-file".to_string(),
            config_file.display().to_string(),
            "--data-dir".to_string(),
            data.display().to_string(),
            "--cache-dir".to_string(),
            cache.display().to_string(),
        ];
        argv.extend(extra.iter().map(|arg| arg.to_string()));

        let mut config = Config::from_args(Args::parse_from(argv)).unwrap();
        config.sources = sources();

        let scraping = ScrapingService::new(FetchSession::open(pages), Duration::ZERO);
        PipelineService::new(config, Arc::new(FileSystemStore::new(data, cache)), scraping)
    }

    #[tokio::test]
    async fn full_run_writes_every_output() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(&dir, pages(), &[]);

        pipeline.process().await.unwrap();

        let data = dir.path().join("data");
        let results = pipeline.load_results().unwrap();
        assert_eq!(results.len(), 3);

        let john = &results.rows[2];
        assert_eq!(results.cell(john, "Player"), Some("John Doe"));
        assert_eq!(results.cell(john, "Nation"), Some("ENG"));
        assert_eq!(results.cell(john, "Age"), Some("27"));
        assert_eq!(results.cell(john, "Squad"), Some("X"));
        assert_eq!(results.cell(john, "Minutes"), Some("950"));
        assert_eq!(results.cell(john, "Goals"), Some("5"));

        let ann = &results.rows[0];
        assert_eq!(results.cell(ann, "Minutes"), Some("1400"));

        let values = fs::read_to_string(data.join("player_transfer_values.csv")).unwrap();
        assert_eq!(
            values,
            "\u{feff}Player,Team,ETV,Skill/Pot\nJohn Doe,X,€5M,75.0/80.5\n"
        );

        let top = fs::read_to_string(data.join("bai2_results").join("top_3.txt")).unwrap();
        assert!(top.contains("--- Metric: Goals ---"));
        assert!(top.contains("Metric 'Goals': best team is Z (mean: 9.00)"));
        assert!(data.join("bai2_results").join("results2.csv").exists());

        let clusters = data.join("bai3_results");
        let labelled = fs::read_to_string(clusters.join("results_with_clusters.csv")).unwrap();
        assert!(labelled.lines().next().unwrap().ends_with(",Cluster"));
        assert_eq!(labelled.lines().count(), 4);
        for file in ["k_selection.csv", "cluster_summary.csv", "pca_2d.csv"] {
            assert!(clusters.join(file).exists(), "{file} missing");
        }

        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(data.join("run_manifest.json")).unwrap())
                .unwrap();
        assert_eq!(manifest["total_players"], 3);
        assert_eq!(manifest["categories"][0]["status"], "primary");
        assert_eq!(manifest["categories"][1]["status"], "merged");
        assert_eq!(manifest["categories"][2]["status"], "skipped");
    }

    #[tokio::test]
    async fn missing_primary_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let pages = StaticPages::default().with("https://stats.test/shooting", SHOOTING);
        let pipeline = pipeline(&dir, pages, &[]);

        let err = pipeline.run_scrape(BASE_MINUTES_THRESHOLD).await.unwrap_err();

        assert!(matches!(err, PipelineError::PrimaryUnavailable(ref name) if name == "standard"));
        assert!(!dir.path().join("data").join("results.csv").exists());
    }

    /// Counts how often the wrapped fetcher is released.
    struct ClosingPages {
        pages: StaticPages,
        closed: Arc<AtomicUsize>,
    }

    impl PageFetcher for ClosingPages {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.pages.fetch(url).await
        }
    }

    impl Drop for ClosingPages {
        fn drop(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn failed_scrape_releases_the_session_once() {
        let dir = tempfile::tempdir().unwrap();
        let closed = Arc::new(AtomicUsize::new(0));
        let pages = ClosingPages {
            pages: StaticPages::default().with("https://stats.test/shooting", SHOOTING),
            closed: Arc::clone(&closed),
        };
        let pipeline = pipeline(&dir, pages, &[]);

        let err = pipeline.run_scrape(BASE_MINUTES_THRESHOLD).await.unwrap_err();
        assert!(matches!(err, PipelineError::PrimaryUnavailable(_)));
        assert_eq!(closed.load(Ordering::SeqCst), 0);

        drop(pipeline);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cluster_requires_results() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(&dir, pages(), &[]);

        let err = pipeline.run_cluster().unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput(_)));
    }

    #[tokio::test]
    async fn values_require_results() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(&dir, pages(), &[]);

        let err = pipeline.run_values(REGULAR_MINUTES_THRESHOLD).await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput(_)));
    }

    #[tokio::test]
    async fn no_match_writes_no_value_file() {
        let dir = tempfile::tempdir().unwrap();
        let pages = pages().with("https://values.test/1", "<html></html>");
        let pipeline = pipeline(&dir, pages, &[]);

        pipeline.run_scrape(BASE_MINUTES_THRESHOLD).await.unwrap();
        let matched = pipeline.run_values(REGULAR_MINUTES_THRESHOLD).await.unwrap();

        assert!(matched.is_empty());
        assert!(!dir
            .path()
            .join("data")
            .join("player_transfer_values.csv")
            .exists());
    }

    #[tokio::test]
    async fn cached_tables_are_reused() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemStore::new(dir.path().join("data"), dir.path().join("cache"));
        store
            .save_category(&CategoryTable::new(
                "standard",
                Table::from_records(vec![Record::from_iter([
                    ("player", "Cached Player"),
                    ("minutes", "500"),
                ])]),
            ))
            .unwrap();

        let pipeline = pipeline(&dir, StaticPages::default(), &["--use-cache"]);
        let results = pipeline.run_scrape(BASE_MINUTES_THRESHOLD).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results.cell(&results.rows[0], "Player"), Some("Cached Player"));
    }
}
