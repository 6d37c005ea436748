use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// One player's row within one table, keyed by field identifier.
/// A field that is not present is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: FxHashMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}

/// Rows sharing an ordered column list. Columns are kept in first-seen
/// order; a row may lack any of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl Table {
    pub fn from_records(rows: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            let mut fresh: Vec<&str> = row
                .fields()
                .map(|(field, _)| field)
                .filter(|field| !columns.iter().any(|c| c == field))
                .collect();
            // hash order is arbitrary
            fresh.sort_unstable();
            columns.extend(fresh.into_iter().map(str::to_string));
        }
        Self { columns, rows }
    }

    pub fn with_columns(columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self { columns, rows }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The extracted table of one statistical category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTable {
    pub category: String,
    pub table: Table,
}

impl CategoryTable {
    pub fn new(category: impl Into<String>, table: Table) -> Self {
        Self {
            category: category.into(),
            table,
        }
    }

    pub fn empty(category: impl Into<String>) -> Self {
        Self::new(category, Table::default())
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
