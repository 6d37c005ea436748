use crate::domain::fields::{NATION_COLUMN, PLAYER_COLUMN, POSITION_COLUMN, SENTINEL, TEAM_COLUMN};
use crate::domain::{
    parse_numeric, GroupStats, MetricRanking, OutputTable, StatsReport, Summary, TeamLeader,
};
use crate::error::{PipelineError, Result};
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use tracing::{debug, info};

const RANKING_DEPTH: usize = 3;
const ALL_GROUP: &str = "all";

/// Descriptive statistics of `results.csv`: per-metric rankings, per-team
/// summaries and the best team for each metric.
pub fn describe(table: &OutputTable, file: &str) -> Result<StatsReport> {
    let team_column = team_column(table).ok_or_else(|| PipelineError::MissingColumn {
        file: file.to_string(),
        column: TEAM_COLUMN.to_string(),
    })?;

    let metrics = metric_columns(table, team_column);
    if metrics.is_empty() {
        return Err(PipelineError::Other(format!(
            "no numeric metric columns in {file}"
        )));
    }
    info!(
        "Describing {} players over {} metrics grouped by '{}'",
        table.len(),
        metrics.len(),
        team_column
    );

    let teams = team_order(table, team_column);
    let rankings = metrics
        .iter()
        .map(|metric| rank(table, metric))
        .collect();

    let mut groups = vec![GroupStats {
        group: ALL_GROUP.to_string(),
        summaries: metrics
            .iter()
            .map(|metric| summarize(&values(table, metric, |_| true)))
            .collect(),
    }];
    for team in &teams {
        groups.push(GroupStats {
            group: team.clone(),
            summaries: metrics
                .iter()
                .map(|metric| {
                    summarize(&values(table, metric, |row| {
                        table.cell(row, team_column).map(str::trim) == Some(team.as_str())
                    }))
                })
                .collect(),
        });
    }

    let leaders = metrics
        .iter()
        .enumerate()
        .filter_map(|(index, metric)| {
            groups[1..]
                .iter()
                .filter_map(|group| group.summaries[index].mean.map(|mean| (group, mean)))
                .fold(None, |best: Option<(&GroupStats, f64)>, (group, mean)| match best {
                    Some((_, top)) if top >= mean => best,
                    _ => Some((group, mean)),
                })
                .map(|(group, mean)| TeamLeader {
                    metric: metric.clone(),
                    team: group.group.clone(),
                    mean,
                })
        })
        .collect();

    Ok(StatsReport {
        metrics,
        rankings,
        groups,
        leaders,
    })
}

/// `Team` when present, otherwise `Squad`.
pub(crate) fn team_column(table: &OutputTable) -> Option<&'static str> {
    ["Team", TEAM_COLUMN]
        .into_iter()
        .find(|column| table.column_index(column).is_some())
}

/// Columns whose values are numeric for more than half of the rows.
fn metric_columns(table: &OutputTable, team_column: &str) -> Vec<String> {
    table
        .columns
        .iter()
        .filter(|column| {
            ![PLAYER_COLUMN, NATION_COLUMN, POSITION_COLUMN, team_column]
                .contains(&column.as_str())
        })
        .filter(|column| {
            let numeric = table
                .rows
                .iter()
                .filter(|row| {
                    table
                        .cell(row, column)
                        .is_some_and(|cell| parse_numeric(cell).is_ok())
                })
                .count();
            let is_metric = numeric * 2 > table.len();
            if !is_metric {
                debug!(column = %column, numeric, "not a metric column");
            }
            is_metric
        })
        .cloned()
        .collect()
}

/// Teams in first-seen order. Players without a team belong to no group.
fn team_order(table: &OutputTable, team_column: &str) -> Vec<String> {
    let mut seen = FxHashSet::default();
    let mut teams = Vec::new();
    for row in &table.rows {
        let Some(team) = table.cell(row, team_column).map(str::trim) else {
            continue;
        };
        if team.is_empty() || team == SENTINEL {
            continue;
        }
        if seen.insert(team) {
            teams.push(team.to_string());
        }
    }
    teams
}

fn values(table: &OutputTable, metric: &str, keep: impl Fn(&[String]) -> bool) -> Vec<f64> {
    table
        .rows
        .iter()
        .filter(|row| keep(row))
        .filter_map(|row| table.cell(row, metric))
        .filter_map(|cell| parse_numeric(cell).ok())
        .collect()
}

fn rank(table: &OutputTable, metric: &str) -> MetricRanking {
    let scored: Vec<(String, f64)> = table
        .rows
        .iter()
        .filter_map(|row| {
            let value = parse_numeric(table.cell(row, metric)?).ok()?;
            let player = table.cell(row, PLAYER_COLUMN).unwrap_or_default();
            Some((player.to_string(), value))
        })
        .collect();

    let by_value = |a: &(String, f64), b: &(String, f64)| {
        a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal)
    };

    let mut highest = scored.clone();
    highest.sort_by(|a, b| by_value(b, a));
    highest.truncate(RANKING_DEPTH);

    let mut lowest = scored;
    lowest.sort_by(by_value);
    lowest.truncate(RANKING_DEPTH);

    MetricRanking {
        metric: metric.to_string(),
        highest,
        lowest,
    }
}

/// Median, mean and sample standard deviation. The deviation needs at
/// least two values.
pub fn summarize(values: &[f64]) -> Summary {
    if values.is_empty() {
        return Summary::default();
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    let std = (values.len() > 1).then(|| {
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt()
    });

    Summary {
        median: Some(median),
        mean: Some(mean),
        std,
    }
}
