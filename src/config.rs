//! TOML-based run configuration.

use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Top-level run configuration parsed from TOML.
///
/// Every component receives what it needs from this struct explicitly; nothing
/// is read from process-wide state. Load from TOML with
/// [`RunConfig::from_toml_file`] or start from [`RunConfig::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Scenario name, year range and country scope.
    #[serde(default)]
    pub scenario: ScenarioSection,
    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsSection,
    /// Technology identifier conventions.
    #[serde(default)]
    pub classify: ClassifySection,
}

/// Scenario name, year range and country scope.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioSection {
    pub name: String,
    /// First reported year (inclusive).
    pub start_year: u32,
    /// Last reported year (inclusive).
    pub end_year: u32,
    /// Three-letter country codes reported individually.
    pub geographic_scope: Vec<String>,
    /// Produce country-level summaries in addition to system-level ones.
    pub results_by_country: bool,
}

impl Default for ScenarioSection {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            start_year: 2020,
            end_year: 2050,
            geographic_scope: Vec::new(),
            results_by_country: false,
        }
    }
}

/// Input and output locations. Relative paths resolve against the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsSection {
    /// Holds `color_codes.csv`, `ts_seasons.csv` and `ts_dayparts.csv`.
    pub input_data_dir: PathBuf,
    /// Holds `TECHNOLOGY.csv`.
    pub scenario_data_dir: PathBuf,
    /// Holds the result tables produced by the model run.
    pub scenario_results_dir: PathBuf,
    /// Where output tables are written.
    pub output_dir: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            input_data_dir: PathBuf::from("resources/data"),
            scenario_data_dir: PathBuf::from("results/default/data"),
            scenario_results_dir: PathBuf::from("results/default/results"),
            output_dir: PathBuf::from("results/default/tables"),
        }
    }
}

/// Technology identifier conventions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifySection {
    /// Three-character prefix a technology must carry to be reported.
    pub domain_prefix: String,
    /// Identifiers containing this substring are never reported.
    pub transmission_marker: String,
}

impl Default for ClassifySection {
    fn default() -> Self {
        Self {
            domain_prefix: "PWR".to_string(),
            transmission_marker: "TRN".to_string(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"scenario.start_year"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl RunConfig {
    /// Parses a run configuration from a TOML file and resolves its relative
    /// paths against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        let mut cfg = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            cfg.resolve_paths(base);
        }
        Ok(cfg)
    }

    /// Parses a run configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Joins every relative path onto `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let p = &mut self.paths;
        for dir in [
            &mut p.input_data_dir,
            &mut p.scenario_data_dir,
            &mut p.scenario_results_dir,
            &mut p.output_dir,
        ] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }

    /// Reported years, inclusive on both ends.
    pub fn years(&self) -> RangeInclusive<u32> {
        self.scenario.start_year..=self.scenario.end_year
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.scenario;

        if s.start_year > s.end_year {
            errors.push(ConfigError::new(
                "scenario.start_year",
                format!("must be <= scenario.end_year ({})", s.end_year),
            ));
        }
        for code in &s.geographic_scope {
            if code.len() != 3 || !code.is_ascii() {
                errors.push(ConfigError::new(
                    "scenario.geographic_scope",
                    format!("country code \"{code}\" must be exactly 3 ASCII characters"),
                ));
            }
        }
        if s.results_by_country && s.geographic_scope.is_empty() {
            errors.push(ConfigError::new(
                "scenario.geographic_scope",
                "must list at least one country when results_by_country is set",
            ));
        }

        let c = &self.classify;
        if c.domain_prefix.len() != 3 || !c.domain_prefix.is_ascii() {
            errors.push(ConfigError::new(
                "classify.domain_prefix",
                "must be exactly 3 ASCII characters",
            ));
        }
        if c.transmission_marker.is_empty() {
            errors.push(ConfigError::new(
                "classify.transmission_marker",
                "must not be empty",
            ));
        }

        errors
    }
}
