//! Error taxonomy shared by the loaders, the calendar, and the pipelines.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a run.
///
/// Scope mismatches and unmapped colors are not errors: those rows are
/// filtered out or carry no color.
#[derive(Debug, Error)]
pub enum Error {
    /// Run configuration failed to parse or validate.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An hour of the day is claimed by zero or several daypart intervals.
    #[error("daypart table does not partition hours 1..=24: hour {hour} matched {matches} dayparts")]
    DaypartCoverage { hour: u8, matches: usize },

    /// A month name that the season table does not define.
    #[error("unknown month \"{0}\"")]
    UnknownMonth(String),

    /// An in-scope identifier too short to carry type and country fields.
    #[error("malformed technology identifier \"{0}\": expected at least 9 ASCII characters")]
    MalformedTechnology(String),

    /// A numeric column that could not be coerced.
    #[error("column {column}: cannot read \"{value}\" as a number")]
    InvalidValue { column: &'static str, value: String },

    #[error("I/O error on \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed CSV \"{}\": {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A pipeline branch produced no rows.
    #[error("no data: {0}")]
    EmptyResult(&'static str),
}
