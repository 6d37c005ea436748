pub(crate) mod clustering;
pub(crate) mod matching;
pub(crate) mod merging;
pub(crate) mod normalizing;
pub(crate) mod pipeline;
pub(crate) mod scraping;
pub(crate) mod statistics;

pub use pipeline::PipelineService;
pub use scraping::ScrapingService;
