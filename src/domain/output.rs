use super::fields::SENTINEL;

/// A flat, fully-populated table as written to disk: every cell is a value
/// or the sentinel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl OutputTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Cell text of `row` in `column`, `None` when the column is unknown.
    pub fn cell<'a>(&'a self, row: &'a [String], column: &str) -> Option<&'a str> {
        let index = self.column_index(column)?;
        Some(row.get(index).map(String::as_str).unwrap_or(SENTINEL))
    }

    /// Appends a row, padding short rows with the sentinel.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), SENTINEL.to_string());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// One row of the market-value site.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketValue {
    pub player: String,
    pub team: Option<String>,
    pub etv: Option<String>,
    pub skill_pot: Option<String>,
}

impl MarketValue {
    pub const COLUMNS: [&'static str; 4] = ["Player", "Team", "ETV", "Skill/Pot"];

    #[cfg(test)]
    pub fn new(player: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            team: None,
            etv: None,
            skill_pot: None,
        }
    }

    pub fn to_row(&self) -> [String; 4] {
        let or_sentinel = |value: &Option<String>| match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => SENTINEL.to_string(),
        };

        [
            self.player.clone(),
            or_sentinel(&self.team),
            or_sentinel(&self.etv),
            or_sentinel(&self.skill_pot),
        ]
    }
}
