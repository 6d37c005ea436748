use super::fields::SENTINEL;

/// Highest and lowest players for one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRanking {
    pub metric: String,
    pub highest: Vec<(String, f64)>,
    pub lowest: Vec<(String, f64)>,
}

/// Median, mean and sample standard deviation of one metric in one group.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub median: Option<f64>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub group: String,
    /// One entry per metric, in report metric order.
    pub summaries: Vec<Summary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamLeader {
    pub metric: String,
    pub team: String,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatsReport {
    pub metrics: Vec<String>,
    pub rankings: Vec<MetricRanking>,
    pub groups: Vec<GroupStats>,
    pub leaders: Vec<TeamLeader>,
}

impl StatsReport {
    /// Text of `top_3.txt`.
    pub fn render_rankings(&self) -> String {
        let mut out = String::new();

        for ranking in &self.rankings {
            out.push_str(&format!("\n--- Metric: {} ---\n", ranking.metric));
            if ranking.highest.is_empty() {
                out.push_str("Not enough valid player data.\n");
                continue;
            }

            out.push_str("\nTop 3 highest:\n");
            out.push_str(&player_lines(&ranking.highest));
            out.push_str("Top 3 lowest:\n");
            out.push_str(&player_lines(&ranking.lowest));
        }

        out.push_str("\n\n\n--- TEAM WITH THE HIGHEST MEAN FOR EACH METRIC ---\n\n");
        for leader in &self.leaders {
            out.push_str(&format!(
                "Metric '{}': best team is {} (mean: {:.2})\n",
                leader.metric, leader.team, leader.mean
            ));
        }

        out
    }

    /// Header of `results2.csv`.
    pub fn group_columns(&self) -> Vec<String> {
        let mut columns = vec!["Group".to_string()];
        for metric in &self.metrics {
            columns.push(format!("Median of {metric}"));
            columns.push(format!("Mean of {metric}"));
            columns.push(format!("Std of {metric}"));
        }
        columns
    }

    /// Rows of `results2.csv`, values rounded to two decimals.
    pub fn group_rows(&self) -> Vec<Vec<String>> {
        let cell = |value: Option<f64>| match value {
            Some(v) => format!("{:.2}", v),
            None => SENTINEL.to_string(),
        };

        self.groups
            .iter()
            .map(|group| {
                let mut row = vec![group.group.clone()];
                for summary in &group.summaries {
                    row.push(cell(summary.median));
                    row.push(cell(summary.mean));
                    row.push(cell(summary.std));
                }
                row
            })
            .collect()
    }
}

fn player_lines(players: &[(String, f64)]) -> String {
    players
        .iter()
        .map(|(player, value)| format!("  {player}: {value:.2}\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_rankings_and_leaders() {
        let report = StatsReport {
            metrics: vec!["Goals".into(), "Assists".into()],
            rankings: vec![
                MetricRanking {
                    metric: "Goals".into(),
                    highest: vec![("A".into(), 10.0)],
                    lowest: vec![("B".into(), 1.0)],
                },
                MetricRanking {
                    metric: "Assists".into(),
                    highest: vec![],
                    lowest: vec![],
                },
            ],
            groups: vec![],
            leaders: vec![TeamLeader {
                metric: "Goals".into(),
                team: "Arsenal".into(),
                mean: 4.5,
            }],
        };

        let text = report.render_rankings();
        assert!(text.contains("--- Metric: Goals ---"));
        assert!(text.contains("  A: 10.00\n"));
        assert!(text.contains("Top 3 lowest:\n  B: 1.00\n"));
        assert!(text.contains("--- Metric: Assists ---\nNot enough valid player data."));
        assert!(text.contains("Metric 'Goals': best team is Arsenal (mean: 4.50)"));
    }

    #[test]
    fn rankings_text_is_exact() {
        let report = StatsReport {
            metrics: vec!["Goals".into()],
            rankings: vec![MetricRanking {
                metric: "Goals".into(),
                highest: vec![("A".into(), 3.0), ("B".into(), 1.5)],
                lowest: vec![("B".into(), 1.5), ("A".into(), 3.0)],
            }],
            groups: vec![],
            leaders: vec![TeamLeader {
                metric: "Goals".into(),
                team: "Arsenal".into(),
                mean: 2.25,
            }],
        };

        assert_eq!(
            report.render_rankings(),
            "\n--- Metric: Goals ---\n\nTop 3 highest:\n  A: 3.00\n  B: 1.50\n\
             Top 3 lowest:\n  B: 1.50\n  A: 3.00\n\
             \n\n\n--- TEAM WITH THE HIGHEST MEAN FOR EACH METRIC ---\n\n\
             Metric 'Goals': best team is Arsenal (mean: 2.25)\n"
        );
    }

    #[test]
    fn group_rows_use_sentinel_for_undefined_values() {
        let report = StatsReport {
            metrics: vec!["Goals".into()],
            rankings: vec![],
            groups: vec![GroupStats {
                group: "all".into(),
                summaries: vec![Summary {
                    median: Some(2.0),
                    mean: Some(2.333333),
                    std: None,
                }],
            }],
            leaders: vec![],
        };

        assert_eq!(
            report.group_columns(),
            vec!["Group", "Median of Goals", "Mean of Goals", "Std of Goals"]
        );
        assert_eq!(report.group_rows(), vec![vec!["all", "2.00", "2.33", "N/a"]]);
    }
}
