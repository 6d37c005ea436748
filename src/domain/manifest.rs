use chrono::Local;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryStatus {
    Primary,
    Merged,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub url: String,
    pub rows: usize,
    pub status: CategoryStatus,
}

/// What a `scrape` run produced, written next to `results.csv`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunManifest {
    pub total_players: usize,
    pub min_minutes: f64,
    pub last_updated: String,
    pub categories: Vec<CategorySummary>,
    pub version: String,
}

impl RunManifest {
    pub fn new(total_players: usize, min_minutes: f64, categories: Vec<CategorySummary>) -> Self {
        Self {
            total_players,
            min_minutes,
            last_updated: Local::now().to_rfc3339(),
            categories,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
