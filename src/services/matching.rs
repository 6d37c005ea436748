use crate::domain::fields::{MINUTES_COLUMN, PLAYER_COLUMN};
use crate::domain::{parse_numeric, MarketValue, OutputTable};
use crate::error::{PipelineError, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::info;

/// Lower-cases and trims a player name. Missing names normalize to `""`.
///
/// Matching is exact on the normalized form only: two sites spelling a
/// name differently will not match.
pub fn normalize_name<'a>(name: impl Into<Option<&'a str>>) -> String {
    name.into()
        .map(|name| name.trim().to_lowercase())
        .unwrap_or_default()
}

/// Canonical player names from `results.csv`, keyed by normalized name.
#[derive(Debug, Default)]
pub struct Roster {
    canonical: FxHashMap<String, String>,
}

impl Roster {
    /// Players of `results` with more than `threshold` minutes. The first
    /// spelling seen for a normalized name is canonical.
    pub fn eligible(results: &OutputTable, file: &str, threshold: f64) -> Result<Self> {
        for column in [PLAYER_COLUMN, MINUTES_COLUMN] {
            if results.column_index(column).is_none() {
                return Err(PipelineError::MissingColumn {
                    file: file.to_string(),
                    column: column.to_string(),
                });
            }
        }

        let mut canonical = FxHashMap::default();
        for row in &results.rows {
            let minutes = results
                .cell(row, MINUTES_COLUMN)
                .and_then(|m| parse_numeric(m).ok());
            if !matches!(minutes, Some(m) if m > threshold) {
                continue;
            }

            let player = results.cell(row, PLAYER_COLUMN).unwrap_or_default();
            canonical
                .entry(normalize_name(player))
                .or_insert_with(|| player.to_string());
        }

        info!(
            "{} players above {} minutes in {}",
            canonical.len(),
            threshold,
            file
        );
        Ok(Self { canonical })
    }

    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        self.canonical.get(&normalize_name(name)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

/// Keeps the market values of rostered players, one per raw name (first
/// wins), renamed to the roster's spelling.
pub fn reconcile(roster: &Roster, values: Vec<MarketValue>) -> Vec<MarketValue> {
    let mut seen = FxHashSet::default();

    values
        .into_iter()
        .filter(|value| seen.insert(value.player.clone()))
        .filter_map(|mut value| {
            let canonical = roster.canonical_name(&value.player)?;
            value.player = canonical.to_string();
            Some(value)
        })
        .collect()
}
