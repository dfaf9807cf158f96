//! Command-line arguments and their overrides onto the run configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::config::RunConfig;

/// Hourly generation profiles and annual summaries from timeslice model results.
///
/// Examples:
///   timeslice-profiles --config scenario.toml
///   timeslice-profiles --config scenario.toml --country IND --country NPL --by-country
///   timeslice-profiles --start-year 2030 --end-year 2040 -v
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML run configuration; the built-in defaults are used when omitted
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// First reported year (inclusive)
    #[arg(long, value_name = "YEAR")]
    pub start_year: Option<u32>,

    /// Last reported year (inclusive)
    #[arg(long, value_name = "YEAR")]
    pub end_year: Option<u32>,

    /// Country code in the geographic scope; repeat or comma-separate
    #[arg(long = "country", value_name = "CC", value_delimiter = ',')]
    pub countries: Vec<String>,

    /// Also report capacity and generation per country
    #[arg(long)]
    pub by_country: bool,

    /// Directory the output tables are written to
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Serve the tables over HTTP after the run
    #[cfg(feature = "api")]
    #[arg(long)]
    pub serve: bool,

    /// API server port
    #[cfg(feature = "api")]
    #[arg(long, default_value_t = 3000)]
    pub port: u16,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Applies command-line overrides on top of file or default values.
    ///
    /// A non-empty `--country` list replaces the configured scope.
    pub fn apply(&self, config: &mut RunConfig) {
        let s = &mut config.scenario;
        if let Some(y) = self.start_year {
            s.start_year = y;
        }
        if let Some(y) = self.end_year {
            s.end_year = y;
        }
        if !self.countries.is_empty() {
            s.geographic_scope = self.countries.clone();
        }
        if self.by_country {
            s.results_by_country = true;
        }
        if let Some(ref dir) = self.output {
            config.paths.output_dir = dir.clone();
        }
    }
}
