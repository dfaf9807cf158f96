//! End-to-end runs over the two-country fixture model.

mod common;

use std::collections::BTreeMap;

use timeslice_profiles::aggregate::SummaryRow;
use timeslice_profiles::classify::Scope;
use timeslice_profiles::disaggregate::{annual_energy, energy_to_power, split_timeslice};
use timeslice_profiles::report::{self, RunReport};

fn build_fixture_report() -> (common::Fixture, RunReport) {
    let fx = common::load_fixture();
    let report = report::build(&fx.config, &fx.calendar, &fx.classifier, &fx.tables)
        .expect("fixture report should build");
    (fx, report)
}

fn summary_value(rows: &[SummaryRow], label: &str, year: u32) -> f64 {
    rows.iter()
        .find(|r| r.label == label && r.year == year)
        .map(|r| r.value)
        .unwrap_or_else(|| panic!("missing summary row {label}/{year}"))
}

#[test]
fn system_capacity_merges_countries_and_filters_scope() {
    let (_, report) = build_fixture_report();
    let rows = &report.capacity.rows;

    let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["COA", "COA", "HYD", "HYD", "SPV", "SPV", "WON", "WON"]
    );
    assert!(rows.iter().all(|r| (2025..=2026).contains(&r.year)));

    common::assert_close(summary_value(rows, "COA", 2025), 200.0, "COA 2025");
    common::assert_close(summary_value(rows, "SPV", 2025), 61.0, "SPV 2025");
    common::assert_close(summary_value(rows, "SPV", 2026), 76.5, "SPV 2026");

    assert_eq!(report.capacity.colors.get("COA"), Some(&Some("#000000".to_string())));
    assert_eq!(report.capacity.colors.get("WON"), Some(&None));
    assert_eq!(report.capacity.unit, "Gigawatts (GW)");
}

#[test]
fn system_generation_excludes_transmission_and_other_domains() {
    let (_, report) = build_fixture_report();
    let total_2025: f64 = report
        .generation
        .rows
        .iter()
        .filter(|r| r.year == 2025)
        .map(|r| r.value)
        .sum();
    // COA + SPV(IND) + WON + HYD + SPV(NPL)
    common::assert_close(total_2025, 4500.0 + 380.0 + 300.0 + 36.0 + 3.0, "2025 total");
    assert_eq!(report.generation.title, "Total System Generation");
}

#[test]
fn country_reports_follow_geographic_scope() {
    let (_, report) = build_fixture_report();
    let codes: Vec<&str> = report.countries.iter().map(|c| c.country.as_str()).collect();
    assert_eq!(codes, vec!["IND", "NPL"]);

    let npl = report.country("NPL").expect("NPL should be reported");
    let labels: Vec<&str> = npl.capacity.rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["NPL-HYD", "NPL-HYD", "NPL-SPV", "NPL-SPV"]);
    assert_eq!(npl.generation.title, "NPL System Generation");
    assert_eq!(npl.generation.legend_title, "Country-Powerplant");

    let ind = report.country("IND").expect("IND should be reported");
    assert!(ind.capacity.rows.iter().all(|r| r.label.starts_with("IND-")));
}

#[test]
fn hourly_matrix_covers_every_observed_hour() {
    let (fx, report) = build_fixture_report();
    let matrix = &report.hourly.matrix;

    assert_eq!(matrix.labels().to_vec(), vec!["COA", "HYD", "SPV"]);
    assert_eq!(matrix.rows().len(), 12 * 24 * 2);
    assert_eq!(matrix.years(), vec![2025, 2026]);

    let first = &matrix.rows()[0];
    assert_eq!((first.month.as_str(), first.hour, first.year), ("January", 1, 2025));
    let second = &matrix.rows()[1];
    assert_eq!((second.month.as_str(), second.hour, second.year), ("January", 1, 2026));
    let last = matrix.rows().last().expect("matrix has rows");
    assert_eq!(last.month, "December");

    let coa = matrix.value("January", 1, 2025, "COA").expect("cell exists");
    common::assert_close(coa, energy_to_power(750.0, 31), "COA January hour 1");

    // solar only produces in D2 (hours 7..=18); other hours are zero-filled
    assert_eq!(matrix.value("January", 6, 2025, "SPV"), Some(0.0));
    assert!(matrix.value("January", 7, 2025, "SPV").is_some_and(|v| v > 0.0));
    assert_eq!(matrix.value("January", 19, 2025, "SPV"), Some(0.0));

    assert_eq!(report.hourly.colors.get("HYD"), Some(&Some("#2b47d6".to_string())));
    assert!(fx.calendar.months().len() == 12);
}

#[test]
fn hourly_matrix_conserves_joinable_energy() {
    let (fx, report) = build_fixture_report();
    let years = fx.config.years();

    let mut expected: BTreeMap<(String, u32), f64> = BTreeMap::new();
    for r in &fx.tables.production {
        let Some(c) = fx
            .classifier
            .classify(&r.technology, &Scope::System)
            .expect("fixture identifiers are well formed")
        else {
            continue;
        };
        let Some((season, daypart)) = split_timeslice(&r.timeslice) else {
            continue;
        };
        let known_season = fx.calendar.months().iter().any(|m| m.season == season);
        let known_daypart = fx.calendar.dayparts().iter().any(|d| d.name == daypart);
        if known_season && known_daypart && years.contains(&r.year) {
            *expected.entry((c.label, r.year)).or_insert(0.0) += r.value;
        }
    }

    let recovered =
        annual_energy(&report.hourly.matrix, &fx.calendar).expect("matrix months are known");
    for (key, total) in &expected {
        let got = recovered.get(key).copied().unwrap_or(0.0);
        common::assert_close(got, *total, &format!("{key:?}"));
    }
    let recovered_total: f64 = recovered.values().sum();
    let expected_total: f64 = expected.values().sum();
    common::assert_close(recovered_total, expected_total, "grand total");
}

#[test]
fn export_writes_system_and_country_tables() {
    let (_, report) = build_fixture_report();
    let out = common::temp_output_dir("pipeline-export");

    let written = report.export(&out).expect("export should succeed");
    assert_eq!(written.len(), 7);
    for rel in [
        "GenerationHourly.csv",
        "TotalCapacityAnnual.csv",
        "GenerationAnnual.csv",
        "IND/TotalCapacityAnnual.csv",
        "IND/GenerationAnnual.csv",
        "NPL/TotalCapacityAnnual.csv",
        "NPL/GenerationAnnual.csv",
    ] {
        assert!(out.join(rel).is_file(), "{rel} should exist");
    }

    let capacity = std::fs::read_to_string(out.join("TotalCapacityAnnual.csv"))
        .expect("capacity table readable");
    assert!(capacity.starts_with("LABEL,YEAR,VALUE,COLOR\n"));
    assert!(capacity.contains("WON,2025,40,\n"));

    let _ = std::fs::remove_dir_all(&out);
}

#[test]
fn narrower_year_range_restricts_every_table() {
    let mut fx = common::load_fixture();
    fx.config.scenario.start_year = 2026;
    let report = report::build(&fx.config, &fx.calendar, &fx.classifier, &fx.tables)
        .expect("report should build");

    assert!(report.capacity.rows.iter().all(|r| r.year == 2026));
    assert_eq!(report.hourly.matrix.years(), vec![2026]);
    assert!(report
        .countries
        .iter()
        .all(|c| c.generation.rows.iter().all(|r| r.year == 2026)));
}
