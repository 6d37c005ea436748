use super::fields::SENTINEL;
use super::OutputTable;

pub const CLUSTER_COLUMN: &str = "Cluster";

/// Fit quality of one candidate cluster count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KScore {
    pub k: usize,
    pub inertia: f64,
    /// `None` when the score is undefined for this partition.
    pub silhouette: Option<f64>,
}

/// K-means grouping of the players of `results.csv`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterReport {
    pub metrics: Vec<String>,
    pub scores: Vec<KScore>,
    pub chosen_k: usize,
    pub players: Vec<String>,
    pub teams: Vec<String>,
    /// Cluster of each player, in `results.csv` row order.
    pub assignments: Vec<usize>,
    /// Per cluster, the mean of every metric after imputation.
    pub means: Vec<Vec<Option<f64>>>,
    /// First two principal components of the scaled metrics.
    pub projection: Vec<[f64; 2]>,
}

impl ClusterReport {
    /// `results` with a trailing `Cluster` column.
    pub fn label(&self, results: &OutputTable) -> OutputTable {
        let mut columns = results.columns.clone();
        columns.push(CLUSTER_COLUMN.to_string());

        let mut labelled = OutputTable::new(columns);
        for (row, cluster) in results.rows.iter().zip(&self.assignments) {
            let mut row = row.clone();
            row.resize(results.columns.len(), SENTINEL.to_string());
            row.push(cluster.to_string());
            labelled.push_row(row);
        }
        labelled
    }

    pub fn score_columns(&self) -> Vec<String> {
        ["k", "Inertia", "Silhouette"].map(String::from).to_vec()
    }

    pub fn score_rows(&self) -> Vec<Vec<String>> {
        self.scores
            .iter()
            .map(|score| {
                vec![
                    score.k.to_string(),
                    format!("{:.4}", score.inertia),
                    score
                        .silhouette
                        .map(|s| format!("{s:.4}"))
                        .unwrap_or_else(|| SENTINEL.to_string()),
                ]
            })
            .collect()
    }

    pub fn summary_columns(&self) -> Vec<String> {
        std::iter::once(CLUSTER_COLUMN.to_string())
            .chain(self.metrics.iter().cloned())
            .collect()
    }

    /// Cluster means rounded to two decimals.
    pub fn summary_rows(&self) -> Vec<Vec<String>> {
        self.means
            .iter()
            .enumerate()
            .map(|(cluster, means)| {
                std::iter::once(cluster.to_string())
                    .chain(means.iter().map(|mean| match mean {
                        Some(m) => format!("{m:.2}"),
                        None => SENTINEL.to_string(),
                    }))
                    .collect()
            })
            .collect()
    }

    pub fn projection_columns(&self) -> Vec<String> {
        [
            "Player",
            "Team",
            "Principal Component 1",
            "Principal Component 2",
            CLUSTER_COLUMN,
        ]
        .map(String::from)
        .to_vec()
    }

    pub fn projection_rows(&self) -> Vec<Vec<String>> {
        self.players
            .iter()
            .zip(&self.teams)
            .zip(self.projection.iter().zip(&self.assignments))
            .map(|((player, team), ([pc1, pc2], cluster))| {
                vec![
                    player.clone(),
                    team.clone(),
                    format!("{pc1:.4}"),
                    format!("{pc2:.4}"),
                    cluster.to_string(),
                ]
            })
            .collect()
    }
}
