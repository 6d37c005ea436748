use super::{element_text, parse_selector, TableScraper};
use crate::domain::fields::IDENTITY_FIELD;
use crate::domain::Record;
use crate::error::Result;
use scraper::{ElementRef, Html};
use tracing::debug;

/// Reads one fbref stats table, identified by its element id.
pub struct FbrefTableScraper {
    table_id: String,
}

impl FbrefTableScraper {
    pub fn new(table_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
        }
    }
}

impl TableScraper for FbrefTableScraper {
    type Row = Record;

    fn extract(&self, document: &Html) -> Result<Vec<Record>> {
        extract_table(document, &self.table_id)
    }
}

/// Extracts every player row of the table with id `table_id`.
///
/// fbref ships most of its tables inside HTML comments and reveals them with
/// JavaScript. When the table is not part of the live markup, the text of
/// all comment nodes is parsed as a second document and searched once more.
/// A table that cannot be found yields no rows.
pub fn extract_table(document: &Html, table_id: &str) -> Result<Vec<Record>> {
    let selector = parse_selector(&format!("table[id=\"{table_id}\"]"))?;

    if let Some(table) = document.select(&selector).next() {
        return Ok(read_rows(table));
    }

    let hidden = Html::parse_fragment(&comment_text(document));
    match hidden.select(&selector).next() {
        Some(table) => {
            debug!(table_id, "table found inside markup comment");
            Ok(read_rows(table))
        }
        None => {
            debug!(table_id, "table not found");
            Ok(Vec::new())
        }
    }
}

fn comment_text(document: &Html) -> String {
    document
        .tree
        .root()
        .descendants()
        .filter_map(|node| node.value().as_comment())
        .map(|comment| &**comment)
        .collect::<Vec<_>>()
        .join("\n")
}

fn read_rows(table: ElementRef) -> Vec<Record> {
    child_elements(table, "tbody")
        .flat_map(|tbody| child_elements(tbody, "tr"))
        .filter(|row| !is_filler_row(row) && has_cells(row))
        .filter_map(read_record)
        .collect()
}

fn child_elements<'a>(
    parent: ElementRef<'a>,
    name: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == name)
}

/// Repeated header rows and spacer rows between groups.
fn is_filler_row(row: &ElementRef) -> bool {
    row.value()
        .classes()
        .any(|class| class == "thead" || class.starts_with("spacer"))
}

fn is_cell(element: &ElementRef) -> bool {
    matches!(element.value().name(), "th" | "td")
}

fn has_cells(row: &ElementRef) -> bool {
    row.children()
        .filter_map(ElementRef::wrap)
        .any(|el| is_cell(&el))
}

fn read_record(row: ElementRef) -> Option<Record> {
    let record: Record = row
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(is_cell)
        .filter_map(|cell| {
            let stat = cell.value().attr("data-stat")?;
            Some((stat.to_string(), element_text(&cell)))
        })
        .collect();

    match record.get(IDENTITY_FIELD) {
        Some(player) if !player.is_empty() => Some(record),
        _ => None,
    }
}
