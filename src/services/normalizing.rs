use crate::domain::fields::{
    display_name, output_columns, AGE_COLUMN, MINUTES_COLUMN, NATION_COLUMN, PLAYER_COLUMN,
    SENTINEL,
};
use crate::domain::{parse_numeric, strip_thousands, OutputTable, Record, Table};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

static NATION_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z]+)$").unwrap());

/// `"eng ENG"` -> `"ENG"`. Text without a trailing uppercase run passes
/// through.
pub fn nation_code(raw: &str) -> String {
    NATION_CODE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// `"27-045"` (years-days) -> `"27"`.
pub fn age_years(raw: &str) -> String {
    match raw.split_once('-') {
        Some((years, _)) => years.to_string(),
        None => raw.to_string(),
    }
}

/// Turns the merged table into the declared `results.csv` layout.
///
/// Rows at or below `min_minutes` (or with unreadable minutes) are dropped
/// when the table carries minutes at all. Rows are ordered by the first
/// word of the player name; every empty cell becomes the sentinel.
pub fn normalize_output(table: &Table, min_minutes: f64) -> OutputTable {
    let renamed: Vec<Record> = table.rows.iter().map(rename_fields).collect();
    let has_minutes = table
        .columns
        .iter()
        .any(|column| display_name(column) == MINUTES_COLUMN);

    let mut rows: Vec<Record> = renamed
        .into_iter()
        .map(fix_values)
        .filter(|row| !has_minutes || is_eligible(row, min_minutes))
        .collect();

    debug!(
        kept = rows.len(),
        dropped = table.rows.len() - rows.len(),
        "applied minutes filter"
    );

    rows.sort_by(|a, b| first_name(a).cmp(first_name(b)));

    let columns = output_columns();
    let mut output = OutputTable::new(columns.clone());
    for row in &rows {
        output.push_row(
            columns
                .iter()
                .map(|column| match row.get(column).map(str::trim) {
                    Some(value) if !value.is_empty() => value.to_string(),
                    _ => SENTINEL.to_string(),
                })
                .collect(),
        );
    }

    info!(
        "Normalized {} players into {} columns",
        output.len(),
        output.columns.len()
    );
    output
}

fn rename_fields(row: &Record) -> Record {
    row.fields()
        .map(|(field, value)| (display_name(field), value))
        .collect()
}

fn fix_values(mut row: Record) -> Record {
    if let Some(nation) = row.get(NATION_COLUMN).map(nation_code) {
        row.insert(NATION_COLUMN, nation);
    }
    if let Some(age) = row.get(AGE_COLUMN).map(age_years) {
        row.insert(AGE_COLUMN, age);
    }
    if let Some(minutes) = row.get(MINUTES_COLUMN).map(|m| strip_thousands(m.trim())) {
        row.insert(MINUTES_COLUMN, minutes);
    }
    row
}

fn is_eligible(row: &Record, min_minutes: f64) -> bool {
    row.get(MINUTES_COLUMN)
        .and_then(|m| parse_numeric(m).ok())
        .is_some_and(|minutes| minutes > min_minutes)
}

fn first_name(row: &Record) -> &str {
    row.get(PLAYER_COLUMN)
        .and_then(|player| player.split_whitespace().next())
        .unwrap_or_default()
}
