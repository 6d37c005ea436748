mod clusters;
pub(crate) mod fields;
mod manifest;
mod numeric;
mod output;
mod record;
mod report;
pub(crate) mod storage;

pub use clusters::{ClusterReport, KScore, CLUSTER_COLUMN};
pub use manifest::{CategoryStatus, CategorySummary, RunManifest};
pub use numeric::{parse_numeric, strip_thousands};
pub use output::{MarketValue, OutputTable};
pub use record::{CategoryTable, Record, Table};
pub use report::{GroupStats, MetricRanking, StatsReport, Summary, TeamLeader};
