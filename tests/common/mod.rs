//! Shared fixtures for integration tests: a two-country model (IND, NPL)
//! with a twelve-month, two-season, three-daypart calendar.

#![allow(dead_code)]

use std::path::PathBuf;

use timeslice_profiles::calendar::{CalendarTable, Daypart, MonthDef};
use timeslice_profiles::classify::{ColorCode, ColorTable, TechnologyClassifier};
use timeslice_profiles::config::{ClassifySection, RunConfig};
use timeslice_profiles::io::read::{ResultTables, read_lookup_tables};

/// Directory holding `config.toml`, `data/` and `model/`.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn fixture_config_path() -> PathBuf {
    fixtures_dir().join("config.toml")
}

/// The fixture configuration with paths resolved against the fixture directory.
pub fn fixture_config() -> RunConfig {
    RunConfig::from_toml_file(&fixture_config_path()).expect("fixture config should parse")
}

/// Everything a report needs, loaded from the fixture files.
pub struct Fixture {
    pub config: RunConfig,
    pub calendar: CalendarTable,
    pub classifier: TechnologyClassifier,
    pub tables: ResultTables,
}

pub fn load_fixture() -> Fixture {
    let config = fixture_config();
    let (calendar, colors) =
        read_lookup_tables(&config.paths.input_data_dir).expect("lookup tables should load");
    let classifier = TechnologyClassifier::new(&config.classify, colors);
    let tables = ResultTables::read(&config.paths).expect("result tables should load");
    Fixture {
        config,
        calendar,
        classifier,
        tables,
    }
}

/// A fresh, empty directory under the system temp dir.
pub fn temp_output_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "timeslice-profiles-{name}-{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

pub fn month(name: &str, season: &str, days: u32) -> MonthDef {
    MonthDef {
        name: name.to_string(),
        season: season.to_string(),
        days,
    }
}

pub fn daypart(name: &str, start_hour: u8, end_hour: u8) -> Daypart {
    Daypart {
        name: name.to_string(),
        start_hour,
        end_hour,
    }
}

/// Four months over two seasons, four dayparts.
pub fn quarter_calendar() -> CalendarTable {
    CalendarTable::new(
        vec![
            month("January", "S1", 31),
            month("April", "S1", 30),
            month("July", "S2", 31),
            month("October", "S2", 31),
        ],
        vec![
            daypart("D1", 0, 6),
            daypart("D2", 6, 12),
            daypart("D3", 12, 18),
            daypart("D4", 18, 24),
        ],
    )
    .expect("calendar should be valid")
}

/// Default conventions, colors for COA and SPV only.
pub fn default_classifier() -> TechnologyClassifier {
    let colors = ColorTable::new([
        ColorCode {
            tech_id: "COA".to_string(),
            colour: "#000000".to_string(),
        },
        ColorCode {
            tech_id: "SPV".to_string(),
            colour: "#ffc903".to_string(),
        },
    ]);
    TechnologyClassifier::new(&ClassifySection::default(), colors)
}

pub fn assert_close(actual: f64, expected: f64, what: &str) {
    let tol = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tol,
        "{what}: expected {expected}, got {actual}"
    );
}
