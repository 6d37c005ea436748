use crate::config::cli::Args;
use crate::error::{PipelineError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub(crate) mod cli;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/95.0.4638.54 Safari/537.36";

const FBREF_BASE_URL: &str = "https://fbref.com/en/comps/9";
const TRANSFERS_BASE_URL: &str = "https://www.footballtransfers.com/en/players/uk-premier-league";
const TRANSFER_PAGE_COUNT: usize = 22;

/// Category name and the URL slug of its page. The standard table lives
/// under `stats`.
const FBREF_CATEGORIES: [(&str, &str); 9] = [
    ("standard", "stats"),
    ("keepers", "keepers"),
    ("shooting", "shooting"),
    ("passing", "passing"),
    ("passing_types", "passing_types"),
    ("gca", "gca"),
    ("defense", "defense"),
    ("possession", "possession"),
    ("misc", "misc"),
];

/// One stat page and the id of the table it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySource {
    pub name: String,
    pub url: String,
    pub table_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_primary")]
    pub primary: String,
    pub categories: Vec<CategorySource>,
    #[serde(default)]
    pub transfer_pages: Vec<String>,
}

fn default_primary() -> String {
    "standard".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        let categories = FBREF_CATEGORIES
            .iter()
            .map(|(name, slug)| CategorySource {
                name: name.to_string(),
                url: format!("{FBREF_BASE_URL}/{slug}/Premier-League-Stats"),
                table_id: format!("stats_{name}"),
            })
            .collect();

        let transfer_pages = std::iter::once(TRANSFERS_BASE_URL.to_string())
            .chain((2..=TRANSFER_PAGE_COUNT).map(|page| format!("{TRANSFERS_BASE_URL}/{page}")))
            .collect();

        Self {
            primary: default_primary(),
            categories,
            transfer_pages,
        }
    }
}

impl SourceConfig {
    /// Reads the source list from `path`, falling back to the built-in
    /// Premier League pages when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No source config at {:?}, using built-in pages", path);
            return Ok(Self::default());
        }

        let sources: SourceConfig = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        info!(
            "Loaded {} categories and {} transfer pages from {:?}",
            sources.categories.len(),
            sources.transfer_pages.len(),
            path
        );
        Ok(sources)
    }
}

pub struct Config {
    pub args: Args,
    pub sources: SourceConfig,
    pub http_client: Client,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let sources = SourceConfig::load(&args.config_file)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let http_client = Client::builder()
            .timeout(Duration::from_secs(args.timeout_secs))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            args,
            sources,
            http_client,
        })
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.args.request_delay_ms)
    }

    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.args.data_dir, &self.args.cache_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }

        info!("Data and cache dirs exist");
        Ok(())
    }

    pub fn primary_source(&self) -> Result<&CategorySource> {
        self.sources
            .categories
            .iter()
            .find(|source| source.name == self.sources.primary)
            .ok_or_else(|| PipelineError::PrimaryUnavailable(self.sources.primary.clone()))
    }
}
