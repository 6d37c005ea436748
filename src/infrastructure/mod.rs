mod fetcher;
mod scrapers;
mod storage;

pub use fetcher::{FetchSession, HttpFetcher, PageFetcher};
pub use scrapers::{
    fbref::FbrefTableScraper,
    transfers::TransferTableScraper,
    TableScraper,
};
pub use storage::fs_store::FileSystemStore;
