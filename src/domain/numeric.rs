use super::fields::SENTINEL;
use std::fmt;

/// A cell that holds no usable number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingValue;

impl fmt::Display for MissingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("missing value")
    }
}

impl std::error::Error for MissingValue {}

/// Parses a scraped number. Thousands separators and a trailing `%` are
/// ignored; blanks, the sentinel and non-finite values are missing.
pub fn parse_numeric(raw: &str) -> Result<f64, MissingValue> {
    let cleaned = strip_thousands(raw.trim());
    let cleaned = cleaned.trim_end_matches('%').trim();

    if cleaned.is_empty() || cleaned == SENTINEL {
        return Err(MissingValue);
    }

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(MissingValue),
    }
}

pub fn strip_thousands(raw: &str) -> String {
    raw.replace(',', "")
}
