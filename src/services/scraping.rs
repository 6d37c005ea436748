use crate::config::CategorySource;
use crate::domain::{CategoryTable, MarketValue, Table};
use crate::error::{PipelineError, Result};
use crate::infrastructure::{
    FbrefTableScraper, FetchSession, PageFetcher, TableScraper, TransferTableScraper,
};
use indicatif::{ProgressBar, ProgressStyle};
use scraper::Html;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

pub struct ScrapingService<F: PageFetcher> {
    session: FetchSession<F>,
    delay: Duration,
}

impl<F: PageFetcher> ScrapingService<F> {
    pub fn new(session: FetchSession<F>, delay: Duration) -> Self {
        info!("Created new Scraping service");
        Self { session, delay }
    }

    /// Fetches the categories one after another. A category that cannot be
    /// fetched or parsed comes back as an empty table.
    pub async fn scrape_categories(&self, sources: &[CategorySource]) -> Result<Vec<CategoryTable>> {
        let pb = progress_bar(sources.len())?;
        let mut tables = Vec::with_capacity(sources.len());

        for source in sources {
            pb.set_message(format!("Scraping {}", source.name));

            let table = match self.scrape_category(source).await {
                Ok(table) => table,
                Err(e) => {
                    warn!("Failed to scrape category '{}': {}", source.name, e);
                    CategoryTable::empty(&source.name)
                }
            };
            tables.push(table);

            pb.inc(1);
            sleep(self.delay).await;
        }

        pb.finish_with_message("Categories scraped");
        Ok(tables)
    }

    pub async fn scrape_category(&self, source: &CategorySource) -> Result<CategoryTable> {
        let markup = self.session.fetch(&source.url).await?;
        let document = Html::parse_document(&markup);
        let records = FbrefTableScraper::new(&source.table_id).extract(&document)?;

        if records.is_empty() {
            warn!(
                "Table '{}' not found or empty at {}",
                source.table_id, source.url
            );
        } else {
            info!("Extracted {} rows for '{}'", records.len(), source.name);
        }

        Ok(CategoryTable::new(&source.name, Table::from_records(records)))
    }

    /// Reads every listing page in order. Failed pages are skipped.
    pub async fn scrape_market_values(&self, pages: &[String]) -> Result<Vec<MarketValue>> {
        let scraper = TransferTableScraper::new()?;
        let pb = progress_bar(pages.len())?;
        let mut values = Vec::new();

        for (index, url) in pages.iter().enumerate() {
            pb.set_message(format!("Page {}", index + 1));

            match self.session.fetch(url).await {
                Ok(markup) => {
                    let document = Html::parse_document(&markup);
                    let rows = scraper.extract(&document)?;
                    if rows.is_empty() {
                        warn!("No market values found on {}", url);
                    }
                    values.extend(rows);
                }
                Err(e) => warn!("Failed to fetch {}: {}", url, e),
            }

            pb.inc(1);
            sleep(self.delay).await;
        }

        pb.finish_with_message("Market values scraped");
        info!(
            "Collected {} market value rows from {} pages",
            values.len(),
            pages.len()
        );
        Ok(values)
    }
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .map_err(|e| PipelineError::Other(e.to_string()))?,
    );
    Ok(pb)
}
