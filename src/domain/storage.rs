use super::{CategoryTable, ClusterReport, MarketValue, OutputTable, RunManifest, StatsReport};
use crate::error::Result;

pub trait Storage: Send + Sync {
    fn load_category(&self, category: &str) -> Result<Option<CategoryTable>>;
    fn save_category(&self, table: &CategoryTable) -> Result<()>;
    fn load_results(&self) -> Result<Option<OutputTable>>;
    fn save_results(&self, table: &OutputTable) -> Result<()>;
    fn save_market_values(&self, values: &[MarketValue]) -> Result<()>;
    fn save_report(&self, report: &StatsReport) -> Result<()>;
    /// `labelled` is `results.csv` with its `Cluster` column.
    fn save_clusters(&self, labelled: &OutputTable, report: &ClusterReport) -> Result<()>;
    fn save_manifest(&self, manifest: &RunManifest) -> Result<()>;
    /// Location of `results.csv`, for diagnostics.
    fn results_location(&self) -> String;
}

pub struct StorageKeys;

impl StorageKeys {
    // Base directories
    pub const SOURCES_DIR: &'static str = "sources";
    pub const REPORT_DIR: &'static str = "bai2_results";
    pub const CLUSTER_DIR: &'static str = "bai3_results";

    pub const RESULTS: &'static str = "results.csv";
    pub const MARKET_VALUES: &'static str = "player_transfer_values.csv";
    pub const TOP_THREE: &'static str = "top_3.txt";
    pub const GROUP_STATS: &'static str = "results2.csv";
    pub const CLUSTERED_RESULTS: &'static str = "results_with_clusters.csv";
    pub const K_SELECTION: &'static str = "k_selection.csv";
    pub const CLUSTER_SUMMARY: &'static str = "cluster_summary.csv";
    pub const PROJECTION: &'static str = "pca_2d.csv";
    pub const MANIFEST: &'static str = "run_manifest.json";
}
