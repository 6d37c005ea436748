use crate::error::{PipelineError, Result};
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// Returns the raw markup behind a URL.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    async fn fetch(&self, url: &str) -> Result<String>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, "fetching page");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::UnexpectedStatus {
                url: url.to_owned(),
                status,
            });
        }

        Ok(response.text().await?)
    }
}

/// A fetcher held for the length of one run. Opening logs the start of the
/// session; dropping it closes the session exactly once, on every exit path.
pub struct FetchSession<F: PageFetcher> {
    fetcher: F,
    pages: AtomicUsize,
}

impl<F: PageFetcher> FetchSession<F> {
    pub fn open(fetcher: F) -> Self {
        info!("Opened fetch session");
        Self {
            fetcher,
            pages: AtomicUsize::new(0),
        }
    }

    pub async fn fetch(&self, url: &str) -> Result<String> {
        self.pages.fetch_add(1, Ordering::Relaxed);
        self.fetcher.fetch(url).await
    }

    pub fn pages_requested(&self) -> usize {
        self.pages.load(Ordering::Relaxed)
    }
}

impl<F: PageFetcher> Drop for FetchSession<F> {
    fn drop(&mut self) {
        info!(
            "Closed fetch session after {} page requests",
            self.pages_requested()
        );
    }
}
