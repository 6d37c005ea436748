use super::{parse_selector, select_text, TableScraper};
use crate::domain::MarketValue;
use crate::error::Result;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Reads the player listing of footballtransfers.com.
pub struct TransferTableScraper {
    table: Selector,
    row: Selector,
    player: Selector,
    team: Selector,
    etv: Selector,
    skill: Selector,
    potential: Selector,
}

impl TransferTableScraper {
    pub fn new() -> Result<Self> {
        Ok(Self {
            table: parse_selector("table.mvp-table")?,
            row: parse_selector("tbody > tr")?,
            player: parse_selector("span.d-none")?,
            team: parse_selector("span.td-team__teamname")?,
            etv: parse_selector("span.player-tag")?,
            skill: parse_selector("div.table-skill__skill")?,
            potential: parse_selector("div.table-skill__pot")?,
        })
    }

    fn read_row(&self, row: &ElementRef) -> Option<MarketValue> {
        let player = select_text(row, &self.player)?;

        let skill = select_text(row, &self.skill);
        let potential = select_text(row, &self.potential);

        Some(MarketValue {
            player,
            team: select_text(row, &self.team),
            etv: select_text(row, &self.etv),
            skill_pot: format_skill_pot(skill.as_deref(), potential.as_deref()),
        })
    }
}

impl TableScraper for TransferTableScraper {
    type Row = MarketValue;

    fn extract(&self, document: &Html) -> Result<Vec<MarketValue>> {
        let Some(table) = document.select(&self.table).next() else {
            debug!("market value table not found");
            return Ok(Vec::new());
        };

        Ok(table
            .select(&self.row)
            .filter_map(|row| self.read_row(&row))
            .collect())
    }
}

/// `"{skill}/{potential}"` when both ratings are numbers.
fn format_skill_pot(skill: Option<&str>, potential: Option<&str>) -> Option<String> {
    let skill: f64 = skill?.trim().parse().ok()?;
    let potential: f64 = potential?.trim().parse().ok()?;
    Some(format!("{}/{}", rating(skill), rating(potential)))
}

fn rating(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
