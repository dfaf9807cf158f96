//! CSV loaders for lookup tables and model result tables.
//!
//! Rows are read as byte records so that non-UTF-8 text in columns we do not
//! use (e.g. latin-1 technology names in the color table) never fails a load.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::calendar::{CalendarTable, Daypart, MonthDef};
use crate::classify::{ColorCode, ColorTable};
use crate::config::PathsSection;
use crate::error::{Error, Result};
use crate::types::{AnnualRecord, TimesliceRecord, parse_value, parse_year};

pub const COLOR_CODES_FILE: &str = "color_codes.csv";
pub const SEASONS_FILE: &str = "ts_seasons.csv";
pub const DAYPARTS_FILE: &str = "ts_dayparts.csv";
pub const TECHNOLOGY_FILE: &str = "TECHNOLOGY.csv";
pub const CAPACITY_FILE: &str = "TotalCapacityAnnual.csv";
pub const ANNUAL_PRODUCTION_FILE: &str = "ProductionByTechnologyAnnual.csv";
pub const PRODUCTION_FILE: &str = "ProductionByTechnology.csv";

#[derive(Deserialize)]
struct TechnologyRow {
    #[serde(rename = "VALUE")]
    value: String,
}

#[derive(Deserialize)]
struct AnnualRow {
    #[serde(rename = "TECHNOLOGY")]
    technology: String,
    #[serde(rename = "YEAR")]
    year: String,
    #[serde(rename = "VALUE")]
    value: String,
}

#[derive(Deserialize)]
struct TimesliceRow {
    #[serde(rename = "TIMESLICE")]
    timeslice: String,
    #[serde(rename = "TECHNOLOGY")]
    technology: String,
    #[serde(rename = "YEAR")]
    year: String,
    #[serde(rename = "VALUE")]
    value: String,
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Deserializes every row; `origin` only labels errors.
fn deserialize_rows<T, R>(reader: R, origin: &Path) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let csv_err = |source| Error::Csv {
        path: origin.to_path_buf(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.byte_headers().map_err(csv_err)?.clone();

    let mut rows = Vec::new();
    for record in rdr.byte_records() {
        let record = record.map_err(csv_err)?;
        rows.push(record.deserialize(Some(&headers)).map_err(csv_err)?);
    }
    debug!(file = %origin.display(), rows = rows.len(), "read csv");
    Ok(rows)
}

pub fn read_color_table_from_reader(reader: impl Read) -> Result<ColorTable> {
    let codes: Vec<ColorCode> = deserialize_rows(reader, Path::new(COLOR_CODES_FILE))?;
    Ok(ColorTable::new(codes))
}

pub fn read_seasons_from_reader(reader: impl Read) -> Result<Vec<MonthDef>> {
    deserialize_rows(reader, Path::new(SEASONS_FILE))
}

pub fn read_dayparts_from_reader(reader: impl Read) -> Result<Vec<Daypart>> {
    deserialize_rows(reader, Path::new(DAYPARTS_FILE))
}

/// Distinct identifiers from the `VALUE` column, first-seen order.
pub fn read_technology_set_from_reader(reader: impl Read) -> Result<Vec<String>> {
    let rows: Vec<TechnologyRow> = deserialize_rows(reader, Path::new(TECHNOLOGY_FILE))?;
    let mut seen = HashSet::new();
    Ok(rows
        .into_iter()
        .map(|r| r.value)
        .filter(|v| seen.insert(v.clone()))
        .collect())
}

/// Reads an annual result table, coercing `YEAR` and `VALUE`.
pub fn read_annual_results_from_reader(
    reader: impl Read,
    origin: &Path,
) -> Result<Vec<AnnualRecord>> {
    let rows: Vec<AnnualRow> = deserialize_rows(reader, origin)?;
    rows.into_iter()
        .map(|r| {
            Ok(AnnualRecord {
                year: parse_year("YEAR", &r.year)?,
                value: parse_value("VALUE", &r.value)?,
                technology: r.technology,
            })
        })
        .collect()
}

/// Reads a timeslice-indexed result table, coercing `YEAR` and `VALUE`.
pub fn read_timeslice_results_from_reader(
    reader: impl Read,
    origin: &Path,
) -> Result<Vec<TimesliceRecord>> {
    let rows: Vec<TimesliceRow> = deserialize_rows(reader, origin)?;
    rows.into_iter()
        .map(|r| {
            Ok(TimesliceRecord {
                year: parse_year("YEAR", &r.year)?,
                value: parse_value("VALUE", &r.value)?,
                timeslice: r.timeslice,
                technology: r.technology,
            })
        })
        .collect()
}

pub fn read_color_table(path: &Path) -> Result<ColorTable> {
    let codes: Vec<ColorCode> = deserialize_rows(open(path)?, path)?;
    Ok(ColorTable::new(codes))
}

pub fn read_seasons(path: &Path) -> Result<Vec<MonthDef>> {
    deserialize_rows(open(path)?, path)
}

pub fn read_dayparts(path: &Path) -> Result<Vec<Daypart>> {
    deserialize_rows(open(path)?, path)
}

pub fn read_technology_set(path: &Path) -> Result<Vec<String>> {
    read_technology_set_from_reader(open(path)?)
}

pub fn read_annual_results(path: &Path) -> Result<Vec<AnnualRecord>> {
    read_annual_results_from_reader(open(path)?, path)
}

pub fn read_timeslice_results(path: &Path) -> Result<Vec<TimesliceRecord>> {
    read_timeslice_results_from_reader(open(path)?, path)
}

/// Loads the color table and the validated calendar from `input_data_dir`.
///
/// # Errors
///
/// Any missing or malformed file, or a daypart table that does not
/// partition the day, is fatal.
pub fn read_lookup_tables(input_data_dir: &Path) -> Result<(CalendarTable, ColorTable)> {
    let colors = read_color_table(&input_data_dir.join(COLOR_CODES_FILE))?;
    let months = read_seasons(&input_data_dir.join(SEASONS_FILE))?;
    let dayparts = read_dayparts(&input_data_dir.join(DAYPARTS_FILE))?;
    let calendar = CalendarTable::new(months, dayparts)?;
    Ok((calendar, colors))
}

/// Model outputs consumed by the reports.
#[derive(Debug, Clone, Default)]
pub struct ResultTables {
    /// Technology identifiers defined by the model.
    pub technologies: Vec<String>,
    /// Installed capacity per technology and year (GW).
    pub capacity: Vec<AnnualRecord>,
    /// Production per technology and year (PJ).
    pub annual_production: Vec<AnnualRecord>,
    /// Production per technology, timeslice and year (PJ).
    pub production: Vec<TimesliceRecord>,
}

impl ResultTables {
    /// Reads all result tables from the configured scenario directories.
    pub fn read(paths: &PathsSection) -> Result<Self> {
        let results = &paths.scenario_results_dir;
        let tables = Self {
            technologies: read_technology_set(&paths.scenario_data_dir.join(TECHNOLOGY_FILE))?,
            capacity: read_annual_results(&results.join(CAPACITY_FILE))?,
            annual_production: read_annual_results(&results.join(ANNUAL_PRODUCTION_FILE))?,
            production: read_timeslice_results(&results.join(PRODUCTION_FILE))?,
        };
        info!(
            technologies = tables.technologies.len(),
            capacity = tables.capacity.len(),
            production = tables.production.len(),
            "loaded result tables"
        );
        Ok(tables)
    }
}
