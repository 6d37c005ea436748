use crate::domain::fields::{is_context_field, IDENTITY_FIELD, MINUTES_FIELD};
use crate::domain::{parse_numeric, CategoryTable, Record, Table};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Merges every secondary category onto the primary one, then keeps a
/// single row per player.
pub fn merge(primary: &CategoryTable, secondaries: &[CategoryTable]) -> Table {
    info!(
        "Merging {} secondary categories onto '{}' ({} rows)",
        secondaries.len(),
        primary.category,
        primary.table.len()
    );

    let joined = secondaries
        .iter()
        .fold(primary.table.clone(), |base, next| join(base, next));

    dedup_by_identity(joined)
}

/// The columns `next` may contribute to `base`, or `None` when it has
/// nothing to add.
pub fn contributed_columns(base: &Table, next: &CategoryTable) -> Option<Vec<String>> {
    if next.is_empty() || !next.table.has_column(IDENTITY_FIELD) {
        return None;
    }

    let mut seen = FxHashSet::default();
    let columns: Vec<String> = next
        .table
        .columns
        .iter()
        .filter(|column| {
            column.as_str() != IDENTITY_FIELD
                && !is_context_field(column)
                && !base.has_column(column)
        })
        .filter(|column| seen.insert(column.as_str()))
        .cloned()
        .collect();

    if columns.is_empty() {
        None
    } else {
        Some(columns)
    }
}

/// Left-joins the metric columns of `next` onto `base` by player.
///
/// Every base row survives. A base row with several matching rows in `next`
/// is repeated once per match; an unmatched row simply lacks the new
/// columns.
pub fn join(base: Table, next: &CategoryTable) -> Table {
    let Some(columns) = contributed_columns(&base, next) else {
        debug!(category = %next.category, "nothing to contribute, skipping");
        return base;
    };

    let mut index: FxHashMap<&str, Vec<&Record>> = FxHashMap::default();
    for row in &next.table.rows {
        if let Some(player) = row.get(IDENTITY_FIELD) {
            index.entry(player).or_default().push(row);
        }
    }

    let mut rows = Vec::with_capacity(base.rows.len());
    for row in base.rows {
        let matches = row
            .get(IDENTITY_FIELD)
            .and_then(|player| index.get(player))
            .filter(|matches| !matches.is_empty());

        let Some(matches) = matches else {
            rows.push(row);
            continue;
        };

        for other in matches {
            let mut joined = row.clone();
            for column in &columns {
                if let Some(value) = other.get(column) {
                    joined.insert(column.as_str(), value);
                }
            }
            rows.push(joined);
        }
    }

    let mut all_columns = base.columns;
    all_columns.extend(columns);

    debug!(category = %next.category, rows = rows.len(), "joined category");
    Table::with_columns(all_columns, rows)
}

/// Keeps one row per player: the one with the most minutes, the earliest
/// on ties. Rows whose minutes do not parse rank below every number.
/// Without a minutes column the first row per player wins.
pub fn dedup_by_identity(table: Table) -> Table {
    let by_minutes = table.has_column(MINUTES_FIELD);
    let minutes = |row: &Record| -> Option<f64> {
        if by_minutes {
            row.get(MINUTES_FIELD).and_then(|m| parse_numeric(m).ok())
        } else {
            None
        }
    };

    // kept row position per player, in order of first appearance
    let mut order: Vec<usize> = Vec::new();
    let mut slots: FxHashMap<&str, usize> = FxHashMap::default();

    for (position, row) in table.rows.iter().enumerate() {
        let player = row.get(IDENTITY_FIELD).unwrap_or_default();
        match slots.get(player).copied() {
            None => {
                slots.insert(player, order.len());
                order.push(position);
            }
            Some(slot) => {
                let current = &table.rows[order[slot]];
                if compare_minutes(minutes(row), minutes(current)) == Ordering::Greater {
                    order[slot] = position;
                }
            }
        }
    }

    let dropped = table.rows.len() - order.len();
    if dropped > 0 {
        debug!(dropped, "removed duplicate player rows");
    }

    let mut pending: Vec<Option<Record>> = table.rows.into_iter().map(Some).collect();
    let rows = order
        .into_iter()
        .filter_map(|position| pending[position].take())
        .collect();

    Table::with_columns(table.columns, rows)
}

/// Missing minutes rank below any number.
fn compare_minutes(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, rows: &[&[(&str, &str)]]) -> CategoryTable {
        CategoryTable::new(
            name,
            Table::from_records(
                rows.iter()
                    .map(|fields| Record::from_iter(fields.iter().copied()))
                    .collect(),
            ),
        )
    }

    #[test]
    fn merges_metrics_onto_primary() {
        let primary = category(
            "standard",
            &[&[("player", "John Doe"), ("minutes", "950"), ("team", "X")]],
        );
        let shooting = category("shooting", &[&[("player", "John Doe"), ("goals", "5")]]);

        let merged = merge(&primary, &[shooting]);

        assert_eq!(merged.rows.len(), 1);
        assert_eq!(
            merged.rows[0],
            Record::from_iter([
                ("player", "John Doe"),
                ("minutes", "950"),
                ("team", "X"),
                ("goals", "5"),
            ])
        );
        assert!(merged.has_column("goals"));
    }

    #[test]
    fn secondary_never_overwrites_context_or_primary_metrics() {
        let primary = category(
            "standard",
            &[&[("player", "A"), ("team", "Arsenal"), ("xg", "3.1")]],
        );
        let shooting = category(
            "shooting",
            &[&[("player", "A"), ("team", "Chelsea"), ("xg", "9.9"), ("shots", "40")]],
        );

        let merged = merge(&primary, &[shooting]);

        assert_eq!(merged.rows[0].get("team"), Some("Arsenal"));
        assert_eq!(merged.rows[0].get("xg"), Some("3.1"));
        assert_eq!(merged.rows[0].get("shots"), Some("40"));
    }

    #[test]
    fn unmatched_rows_are_kept_without_metrics() {
        let primary = category("standard", &[&[("player", "A")], &[("player", "B")]]);
        let keepers = category("keepers", &[&[("player", "B"), ("gk_saves", "12")]]);

        let merged = merge(&primary, &[keepers]);

        assert_eq!(merged.rows.len(), 2);
        assert_eq!(merged.rows[0].get("gk_saves"), None);
        assert_eq!(merged.rows[1].get("gk_saves"), Some("12"));
    }

    #[test]
    fn degenerate_secondaries_are_skipped() {
        let primary = category("standard", &[&[("player", "A"), ("minutes", "100")]]);
        let only_context = category("misc", &[&[("player", "A"), ("team", "X"), ("age", "20")]]);
        let no_identity = category("defense", &[&[("tackles", "3")]]);
        let empty = CategoryTable::empty("gca");

        let base = primary.table.clone();
        assert_eq!(contributed_columns(&base, &only_context), None);
        assert_eq!(contributed_columns(&base, &no_identity), None);
        assert_eq!(contributed_columns(&base, &empty), None);

        let merged = merge(&primary, &[only_context, no_identity, empty]);
        assert_eq!(merged, primary.table);
    }

    #[test]
    fn keeps_the_row_with_most_minutes() {
        let primary = category(
            "standard",
            &[
                &[("player", "A"), ("minutes", "450"), ("team", "First")],
                &[("player", "B"), ("minutes", "10")],
                &[("player", "A"), ("minutes", "1,200"), ("team", "Second")],
            ],
        );

        let merged = merge(&primary, &[]);

        assert_eq!(merged.rows.len(), 2);
        assert_eq!(merged.rows[0].get("team"), Some("Second"));
        assert_eq!(merged.rows[1].get("player"), Some("B"));
    }

    #[test]
    fn ties_and_bad_minutes_keep_the_earlier_row() {
        let table = Table::from_records(vec![
            Record::from_iter([("player", "A"), ("minutes", "90"), ("team", "First")]),
            Record::from_iter([("player", "A"), ("minutes", "90"), ("team", "Second")]),
            Record::from_iter([("player", "B"), ("minutes", "abc"), ("team", "First")]),
            Record::from_iter([("player", "B"), ("minutes", "5"), ("team", "Second")]),
        ]);

        let deduped = dedup_by_identity(table);

        assert_eq!(deduped.rows.len(), 2);
        assert_eq!(deduped.rows[0].get("team"), Some("First"));
        assert_eq!(deduped.rows[1].get("team"), Some("Second"));
    }

    #[test]
    fn without_minutes_first_row_wins() {
        let table = Table::from_records(vec![
            Record::from_iter([("player", "A"), ("team", "First")]),
            Record::from_iter([("player", "A"), ("team", "Second")]),
        ]);

        let deduped = dedup_by_identity(table);
        assert_eq!(deduped.rows.len(), 1);
        assert_eq!(deduped.rows[0].get("team"), Some("First"));
    }

    #[test]
    fn transferred_player_join_collapses_to_one_row() {
        let primary = category(
            "standard",
            &[
                &[("player", "A"), ("minutes", "300"), ("team", "First")],
                &[("player", "A"), ("minutes", "700"), ("team", "Second")],
            ],
        );
        let passing = category(
            "passing",
            &[&[("player", "A"), ("passes", "10")], &[("player", "A"), ("passes", "20")]],
        );

        let merged = merge(&primary, &[passing]);

        let players: FxHashSet<&str> = merged
            .rows
            .iter()
            .filter_map(|row| row.get("player"))
            .collect();
        assert_eq!(merged.rows.len(), players.len());
        assert_eq!(merged.rows[0].get("team"), Some("Second"));
    }
}
