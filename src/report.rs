//! Run orchestration: the system-level and country-level tables handed to
//! the presentation layer.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::{SummaryRow, aggregate, color_map};
use crate::calendar::CalendarTable;
use crate::classify::{Scope, TechnologyClassifier};
use crate::config::RunConfig;
use crate::disaggregate::{HourlyMatrix, disaggregate, label_timeslices};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::io::export::{export_hourly, export_summary};
use crate::io::read::ResultTables;
use crate::types::AnnualRecord;

pub const CAPACITY_OUTPUT: &str = "TotalCapacityAnnual.csv";
pub const GENERATION_OUTPUT: &str = "GenerationAnnual.csv";
pub const HOURLY_OUTPUT: &str = "GenerationHourly.csv";

const GIGAWATTS: &str = "Gigawatts (GW)";
const PETAJOULES: &str = "Petajoules (PJ)";

/// Annual quantity a summary reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Capacity,
    Generation,
}

impl Metric {
    pub fn unit(self) -> &'static str {
        match self {
            Metric::Capacity => GIGAWATTS,
            Metric::Generation => PETAJOULES,
        }
    }

    pub fn title(self, scope: &Scope) -> String {
        let what = match self {
            Metric::Capacity => "Capacity",
            Metric::Generation => "Generation",
        };
        match scope.country() {
            None => format!("Total System {what}"),
            Some(c) => format!("{c} System {what}"),
        }
    }

    pub fn legend_title(scope: &Scope) -> &'static str {
        match scope {
            Scope::System => "Powerplant",
            Scope::Country(_) => "Country-Powerplant",
        }
    }

    fn output_file(self) -> &'static str {
        match self {
            Metric::Capacity => CAPACITY_OUTPUT,
            Metric::Generation => GENERATION_OUTPUT,
        }
    }

    fn empty_reason(self) -> &'static str {
        match self {
            Metric::Capacity => "capacity summary has no rows",
            Metric::Generation => "generation summary has no rows",
        }
    }
}

/// An annual summary plus what a chart needs to draw it.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryTable {
    pub metric: Metric,
    pub title: String,
    pub legend_title: String,
    pub unit: String,
    pub rows: Vec<SummaryRow>,
    /// Label → color; `None` for type codes missing from the color table.
    pub colors: BTreeMap<String, Option<String>>,
}

impl SummaryTable {
    /// The table itself, or [`Error::EmptyResult`] if it has no rows.
    pub fn non_empty(&self) -> Result<&Self> {
        if self.rows.is_empty() {
            return Err(Error::EmptyResult(self.metric.empty_reason()));
        }
        Ok(self)
    }
}

/// The hourly generation matrix plus chart metadata.
#[derive(Debug, Clone, Serialize)]
pub struct HourlyTable {
    pub title: String,
    pub unit: String,
    pub colors: BTreeMap<String, Option<String>>,
    pub matrix: HourlyMatrix,
}

impl HourlyTable {
    pub fn non_empty(&self) -> Result<&Self> {
        if self.matrix.is_empty() {
            return Err(Error::EmptyResult("hourly generation matrix has no rows"));
        }
        Ok(self)
    }
}

/// Summaries for one country.
#[derive(Debug, Clone, Serialize)]
pub struct CountryReport {
    pub country: String,
    pub capacity: SummaryTable,
    pub generation: SummaryTable,
}

/// Every table produced by one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub scenario: String,
    pub hourly: HourlyTable,
    pub capacity: SummaryTable,
    pub generation: SummaryTable,
    pub countries: Vec<CountryReport>,
}

/// Labels whose type code has no entry in the color table.
fn unmapped_labels(colors: &BTreeMap<String, Option<String>>) -> impl Iterator<Item = &str> {
    colors
        .iter()
        .filter(|(_, color)| color.is_none())
        .map(|(label, _)| label.as_str())
}

fn warn_unmapped(title: &str, colors: &BTreeMap<String, Option<String>>) {
    for label in unmapped_labels(colors) {
        warn!(table = title, label, "no color for label");
    }
}

/// Builds summary tables and the hourly matrix for one configuration.
pub struct Reporter<'a> {
    config: &'a RunConfig,
    calendar: &'a CalendarTable,
    classifier: &'a TechnologyClassifier,
}

impl<'a> Reporter<'a> {
    pub fn new(
        config: &'a RunConfig,
        calendar: &'a CalendarTable,
        classifier: &'a TechnologyClassifier,
    ) -> Self {
        Self {
            config,
            calendar,
            classifier,
        }
    }

    /// Classifies and sums annual records within the configured years.
    pub fn summary(
        &self,
        metric: Metric,
        records: &[AnnualRecord],
        scope: &Scope,
    ) -> Result<SummaryTable> {
        let years = self.config.years();
        let mut rows = self.classifier.classify_annual(records, scope)?;
        rows.retain(|r| years.contains(&r.year));

        let summary = aggregate(&rows);
        if summary.is_empty() {
            warn!(?metric, ?scope, "summary is empty");
        }
        let title = metric.title(scope);
        let colors = color_map(&rows);
        warn_unmapped(&title, &colors);
        Ok(SummaryTable {
            metric,
            title,
            legend_title: Metric::legend_title(scope).to_string(),
            unit: metric.unit().to_string(),
            colors,
            rows: summary,
        })
    }

    /// Disaggregates timeslice production into the system-level hourly matrix.
    pub fn hourly(&self, tables: &ResultTables) -> Result<HourlyTable> {
        let scope = Scope::System;
        let grid = Grid::expand(
            tables.technologies.iter().map(String::as_str),
            self.classifier,
            &scope,
            self.calendar,
            self.config.years(),
        )?;
        let values = label_timeslices(&tables.production, self.classifier, &scope)?;
        let matrix = disaggregate(&values, &grid);
        if matrix.is_empty() {
            warn!("hourly generation matrix is empty");
        }

        // Only labels that reached the matrix get a legend entry.
        let seen: BTreeMap<&str, &Option<String>> = values
            .iter()
            .map(|v| (v.label.as_str(), &v.color))
            .collect();
        let colors: BTreeMap<String, Option<String>> = matrix
            .labels()
            .iter()
            .map(|l| (l.clone(), seen.get(l.as_str()).copied().cloned().flatten()))
            .collect();

        let title = "System Hourly Generation".to_string();
        warn_unmapped(&title, &colors);
        Ok(HourlyTable {
            title,
            unit: GIGAWATTS.to_string(),
            colors,
            matrix,
        })
    }

    /// Builds every table: system level first, then one pair per country when
    /// country results are enabled.
    pub fn build(&self, tables: &ResultTables) -> Result<RunReport> {
        let s = &self.config.scenario;
        info!(scenario = %s.name, start = s.start_year, end = s.end_year, "building reports");

        let system = Scope::System;
        let hourly = self.hourly(tables)?;
        let capacity = self.summary(Metric::Capacity, &tables.capacity, &system)?;
        let generation = self.summary(Metric::Generation, &tables.annual_production, &system)?;

        let mut countries = Vec::new();
        if s.results_by_country {
            for country in &s.geographic_scope {
                let scope = Scope::Country(country.clone());
                countries.push(CountryReport {
                    country: country.clone(),
                    capacity: self.summary(Metric::Capacity, &tables.capacity, &scope)?,
                    generation: self.summary(
                        Metric::Generation,
                        &tables.annual_production,
                        &scope,
                    )?,
                });
            }
        }

        Ok(RunReport {
            scenario: s.name.clone(),
            hourly,
            capacity,
            generation,
            countries,
        })
    }
}

/// Builds the full report for `config` from already loaded tables.
pub fn build(
    config: &RunConfig,
    calendar: &CalendarTable,
    classifier: &TechnologyClassifier,
    tables: &ResultTables,
) -> Result<RunReport> {
    Reporter::new(config, calendar, classifier).build(tables)
}

impl RunReport {
    /// Summaries for one country, if it was reported.
    pub fn country(&self, code: &str) -> Option<&CountryReport> {
        self.countries.iter().find(|c| c.country == code)
    }

    /// Writes every non-empty table under `output_dir` and returns the written
    /// paths. Empty tables are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if a file cannot be written.
    pub fn export(&self, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        match self.hourly.non_empty() {
            Ok(h) => {
                let path = output_dir.join(HOURLY_OUTPUT);
                export_hourly(&h.matrix, &path).map_err(|source| Error::Io {
                    path: path.clone(),
                    source,
                })?;
                written.push(path);
            }
            Err(e) => warn!("skipping {HOURLY_OUTPUT}: {e}"),
        }

        let mut summaries = vec![
            (output_dir.to_path_buf(), &self.capacity),
            (output_dir.to_path_buf(), &self.generation),
        ];
        for c in &self.countries {
            let dir = output_dir.join(&c.country);
            summaries.push((dir.clone(), &c.capacity));
            summaries.push((dir, &c.generation));
        }

        for (dir, table) in summaries {
            let path = dir.join(table.metric.output_file());
            match table.non_empty() {
                Ok(t) => {
                    export_summary(&t.rows, &path).map_err(|source| Error::Io {
                        path: path.clone(),
                        source,
                    })?;
                    written.push(path);
                }
                Err(e) => warn!("skipping {}: {e}", path.display()),
            }
        }

        info!(files = written.len(), dir = %output_dir.display(), "exported tables");
        Ok(written)
    }
}
