//! Record types flowing between the loaders and the pipelines.

use serde::Serialize;

use crate::error::{Error, Result};

/// One row of an annual result table (capacity or yearly production).
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualRecord {
    pub technology: String,
    pub year: u32,
    pub value: f64,
}

/// One row of a timeslice-indexed result table, in annual-energy units.
#[derive(Debug, Clone, PartialEq)]
pub struct TimesliceRecord {
    /// Season code followed by daypart code, e.g. `"S1D2"`.
    pub timeslice: String,
    pub technology: String,
    pub year: u32,
    pub value: f64,
}

/// A record after classification: the raw identifier is replaced by its label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRow {
    pub label: String,
    /// `None` when the type code has no entry in the color table.
    pub color: Option<String>,
    pub year: u32,
    pub value: f64,
}

/// Coerces a numeric cell to `f64`, tolerating surrounding whitespace.
///
/// # Errors
///
/// Returns [`Error::InvalidValue`] naming `column` if the text is not a number.
pub fn parse_value(column: &'static str, raw: &str) -> Result<f64> {
    raw.trim().parse::<f64>().map_err(|_| Error::InvalidValue {
        column,
        value: raw.to_string(),
    })
}

/// Coerces a year cell to an integer. Accepts `"2025"` and `"2025.0"`.
///
/// # Errors
///
/// Returns [`Error::InvalidValue`] for non-numeric, fractional or negative years.
pub fn parse_year(column: &'static str, raw: &str) -> Result<u32> {
    let invalid = || Error::InvalidValue {
        column,
        value: raw.to_string(),
    };
    let trimmed = raw.trim();
    if let Ok(y) = trimmed.parse::<u32>() {
        return Ok(y);
    }
    let y = trimmed.parse::<f64>().map_err(|_| invalid())?;
    if y.fract() != 0.0 || y < 0.0 || y > f64::from(u32::MAX) {
        return Err(invalid());
    }
    Ok(y as u32)
}
