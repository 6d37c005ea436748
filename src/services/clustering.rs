use crate::domain::fields::{NATION_COLUMN, PLAYER_COLUMN, POSITION_COLUMN, SENTINEL, TEAM_COLUMN};
use crate::domain::{ClusterReport, KScore, OutputTable};
use crate::error::{PipelineError, Result};
use crate::services::statistics::team_column;
use linfa::metrics::SilhouetteScore;
use linfa::prelude::*;
use linfa_clustering::KMeans;
use linfa_reduction::Pca;
use ndarray::{Array1, Array2, Axis};
use tracing::{debug, info, warn};

const MAX_K: usize = 10;
const FALLBACK_K: usize = 3;
const MIN_PLAYERS: usize = 3;
const IDENTITY_COLUMNS: [&str; 5] = [PLAYER_COLUMN, NATION_COLUMN, TEAM_COLUMN, POSITION_COLUMN, "Team"];

/// Groups the players of `results.csv` by performance profile.
///
/// Metric columns are mean-imputed and standardized. K-means runs for every
/// k from 2 to 10 (bounded by the player count) and the k with the best
/// silhouette score wins, falling back to 3 when no score is defined. The
/// scaled metrics are also projected onto their first two principal
/// components.
pub fn cluster(table: &OutputTable, file: &str) -> Result<ClusterReport> {
    let columns = cluster_columns(table);
    if columns.is_empty() {
        return Err(PipelineError::Other(format!(
            "no numeric columns to cluster in {file}"
        )));
    }
    if table.len() < MIN_PLAYERS {
        return Err(PipelineError::Clustering(format!(
            "{} players in {file}, at least {MIN_PLAYERS} are needed",
            table.len()
        )));
    }

    let (metrics, values): (Vec<String>, Vec<Vec<Option<f64>>>) = columns.into_iter().unzip();
    info!(
        "Clustering {} players over {} metrics",
        table.len(),
        metrics.len()
    );

    let imputed = impute(&values, table.len());
    let scaled = standardize(&imputed);

    let max_k = MAX_K.min(table.len() - 1);
    let mut scores = Vec::new();
    let mut runs = Vec::new();
    for k in 2..=max_k {
        let (labels, inertia) = run_kmeans(&scaled, k)?;
        let silhouette = silhouette(&scaled, &labels);
        debug!(k, inertia, ?silhouette, "k-means candidate");

        scores.push(KScore {
            k,
            inertia,
            silhouette,
        });
        runs.push((k, labels));
    }

    let chosen_k = best_k(&scores).unwrap_or_else(|| {
        warn!("No silhouette score defined, using k = {}", FALLBACK_K);
        FALLBACK_K.min(table.len())
    });
    let labels = match runs.into_iter().find(|(k, _)| *k == chosen_k) {
        Some((_, labels)) => labels,
        None => run_kmeans(&scaled, chosen_k)?.0,
    };
    info!("Chose {} clusters", chosen_k);

    let team_column = team_column(table);
    let players = table
        .rows
        .iter()
        .map(|row| table.cell(row, PLAYER_COLUMN).unwrap_or(SENTINEL).to_string())
        .collect();
    let teams = table
        .rows
        .iter()
        .map(|row| {
            team_column
                .and_then(|column| table.cell(row, column))
                .unwrap_or(SENTINEL)
                .to_string()
        })
        .collect();

    Ok(ClusterReport {
        means: cluster_means(&imputed, &labels, chosen_k),
        projection: project(&scaled)?,
        assignments: labels.to_vec(),
        metrics,
        scores,
        chosen_k,
        players,
        teams,
    })
}

/// Columns other than the identity ones whose present values are all plain
/// numbers, with more than one distinct value.
fn cluster_columns(table: &OutputTable) -> Vec<(String, Vec<Option<f64>>)> {
    table
        .columns
        .iter()
        .filter(|column| !IDENTITY_COLUMNS.contains(&column.as_str()))
        .filter_map(|column| {
            let values = column_values(table, column)?;
            let mut present = values.iter().flatten();
            let first = present.next()?;
            present
                .any(|value| value != first)
                .then(|| (column.clone(), values))
        })
        .collect()
}

/// `None` when a present cell is not a number. Blank and sentinel cells
/// are missing.
fn column_values(table: &OutputTable, column: &str) -> Option<Vec<Option<f64>>> {
    table
        .rows
        .iter()
        .map(|row| {
            let cell = table.cell(row, column)?.trim();
            if cell.is_empty() || cell == SENTINEL {
                return Some(None);
            }
            cell.parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(Some)
        })
        .collect()
}

/// Players by metrics, missing values replaced by the column mean.
fn impute(columns: &[Vec<Option<f64>>], rows: usize) -> Array2<f64> {
    let mut data = Array2::zeros((rows, columns.len()));
    for (j, column) in columns.iter().enumerate() {
        let present: Vec<f64> = column.iter().flatten().copied().collect();
        let mean = if present.is_empty() {
            0.0
        } else {
            present.iter().sum::<f64>() / present.len() as f64
        };
        for (i, value) in column.iter().enumerate() {
            data[[i, j]] = value.unwrap_or(mean);
        }
    }
    data
}

/// Zero mean and unit population variance per column. Constant columns
/// are only centered.
fn standardize(data: &Array2<f64>) -> Array2<f64> {
    let mut scaled = data.clone();
    for mut column in scaled.axis_iter_mut(Axis(1)) {
        let mean = column.mean().unwrap_or(0.0);
        let std = column.std(0.0);
        let std = if std > 0.0 { std } else { 1.0 };
        column.mapv_inplace(|value| (value - mean) / std);
    }
    scaled
}

/// Labels and within-cluster sum of squares of one k-means fit.
fn run_kmeans(data: &Array2<f64>, k: usize) -> Result<(Array1<usize>, f64)> {
    let dataset = DatasetBase::from(data.clone());
    let model = KMeans::params(k)
        .fit(&dataset)
        .map_err(|e| PipelineError::Clustering(format!("k = {k}: {e}")))?;

    let labels: Array1<usize> = model.predict(data);
    let centroids = model.centroids();
    let inertia = data
        .outer_iter()
        .zip(labels.iter())
        .map(|(point, &label)| {
            point
                .iter()
                .zip(centroids.row(label).iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
        })
        .sum();

    Ok((labels, inertia))
}

fn silhouette(data: &Array2<f64>, labels: &Array1<usize>) -> Option<f64> {
    let labelled = DatasetBase::from(data.clone()).with_targets(labels.clone());
    labelled
        .silhouette_score()
        .ok()
        .filter(|score: &f64| score.is_finite())
}

/// The k with the highest silhouette score, the smallest on ties.
fn best_k(scores: &[KScore]) -> Option<usize> {
    scores
        .iter()
        .filter_map(|score| score.silhouette.map(|s| (score.k, s)))
        .fold(None, |best: Option<(usize, f64)>, (k, s)| match best {
            Some((_, top)) if top >= s => best,
            _ => Some((k, s)),
        })
        .map(|(k, _)| k)
}

fn cluster_means(data: &Array2<f64>, labels: &Array1<usize>, k: usize) -> Vec<Vec<Option<f64>>> {
    (0..k)
        .map(|cluster| {
            let members: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|(_, label)| **label == cluster)
                .map(|(i, _)| i)
                .collect();

            data.axis_iter(Axis(1))
                .map(|column| {
                    if members.is_empty() {
                        None
                    } else {
                        Some(members.iter().map(|&i| column[i]).sum::<f64>() / members.len() as f64)
                    }
                })
                .collect()
        })
        .collect()
}

/// First two principal components of every player. With a single metric
/// the second component is zero.
fn project(scaled: &Array2<f64>) -> Result<Vec<[f64; 2]>> {
    let components = scaled.ncols().min(2);
    let dataset = DatasetBase::from(scaled.clone());
    let pca = Pca::params(components)
        .fit(&dataset)
        .map_err(|e| PipelineError::Clustering(format!("PCA: {e}")))?;

    let embedded: Array2<f64> = pca.predict(scaled);
    Ok(embedded
        .outer_iter()
        .map(|row| {
            [
                row.get(0).copied().unwrap_or(0.0),
                row.get(1).copied().unwrap_or(0.0),
            ]
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(columns: &[&str], rows: &[&[&str]]) -> OutputTable {
        let mut table = OutputTable::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|c| c.to_string()).collect());
        }
        table
    }

    fn two_groups() -> OutputTable {
        results(
            &["Player", "Squad", "Goals", "xG"],
            &[
                &["A", "Arsenal", "1", "0.1"],
                &["B", "Arsenal", "1.2", "0.2"],
                &["C", "Chelsea", "0.8", "0.15"],
                &["D", "Chelsea", "20", "5"],
                &["E", "N/a", "21", "5.5"],
                &["F", "Arsenal", "19", "4.8"],
            ],
        )
    }

    #[test]
    fn picks_numeric_varying_columns() {
        let table = results(
            &["Player", "Nation", "Squad", "Age", "Pass%", "Constant", "Goals"],
            &[
                &["A", "ENG", "Arsenal", "21", "80%", "1", "3"],
                &["B", "ESP", "Chelsea", "N/a", "75%", "1", "5"],
                &["C", "FRA", "Arsenal", "30", "N/a", "1", "5"],
            ],
        );

        let columns = cluster_columns(&table);

        let names: Vec<&str> = columns.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Age", "Goals"]);
        assert_eq!(columns[0].1, vec![Some(21.0), None, Some(30.0)]);
    }

    #[test]
    fn imputes_means_and_standardizes() {
        let imputed = impute(&[vec![Some(1.0), None, Some(3.0)]], 3);
        assert_eq!(imputed.column(0).to_vec(), vec![1.0, 2.0, 3.0]);

        let scaled = standardize(&imputed);
        let expected = [-1.224744871, 0.0, 1.224744871];
        for (value, expected) in scaled.column(0).iter().zip(expected) {
            assert!((value - expected).abs() < 1e-6);
        }

        let constant = standardize(&impute(&[vec![Some(4.0), Some(4.0)]], 2));
        assert_eq!(constant.column(0).to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn best_k_prefers_highest_silhouette() {
        let score = |k, silhouette| KScore {
            k,
            inertia: 0.0,
            silhouette,
        };
        assert_eq!(
            best_k(&[score(2, Some(0.4)), score(3, Some(0.7)), score(4, Some(0.7))]),
            Some(3)
        );
        assert_eq!(best_k(&[score(2, None), score(3, None)]), None);
    }

    #[test]
    fn separates_distinct_profiles() {
        let report = cluster(&two_groups(), "results.csv").unwrap();

        assert_eq!(report.metrics, vec!["Goals", "xG"]);
        assert_eq!(report.chosen_k, 2);
        assert_eq!(report.scores.first().map(|s| s.k), Some(2));
        assert_eq!(report.scores.last().map(|s| s.k), Some(5));

        let a = &report.assignments;
        assert_eq!(a.len(), 6);
        assert!(a[0] == a[1] && a[1] == a[2]);
        assert!(a[3] == a[4] && a[4] == a[5]);
        assert_ne!(a[0], a[3]);

        let high = &report.means[a[3]];
        assert_eq!(high[0], Some(20.0));

        assert_eq!(report.teams[4], "N/a");
        assert_eq!(report.projection.len(), 6);
        assert!(report
            .projection
            .iter()
            .all(|[pc1, pc2]| pc1.is_finite() && pc2.is_finite()));
        assert!(report.projection[0][0].signum() != report.projection[3][0].signum());
    }

    #[test]
    fn too_few_players_is_an_error() {
        let table = results(
            &["Player", "Squad", "Goals"],
            &[&["A", "X", "1"], &["B", "Y", "2"]],
        );
        assert!(matches!(
            cluster(&table, "results.csv"),
            Err(PipelineError::Clustering(_))
        ));
    }

    #[test]
    fn no_numeric_columns_is_an_error() {
        let table = results(&["Player", "Squad"], &[&["A", "X"], &["B", "Y"], &["C", "Z"]]);
        assert!(cluster(&table, "results.csv").is_err());
    }
}
