use crate::error::{PipelineError, Result};
use scraper::{ElementRef, Html, Selector};

pub(crate) mod fbref;
pub(crate) mod transfers;

pub trait TableScraper {
    type Row;

    fn extract(&self, document: &Html) -> Result<Vec<Self::Row>>;
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| PipelineError::Selector(format!("invalid CSS selector '{selector}': {e}")))
}

/// Text of an element with every fragment trimmed and joined by a single
/// space.
pub(crate) fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trimmed text of the first descendant matching `selector`, if any.
pub(crate) fn select_text(element: &ElementRef, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty())
}
