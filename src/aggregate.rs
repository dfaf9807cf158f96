//! Annual summaries: classified rows grouped by (label, year).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::ClassifiedRow;

/// One bar of an annual chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub label: String,
    pub year: u32,
    pub value: f64,
    pub color: Option<String>,
}

/// Label → color, as seen in the classified rows.
///
/// Every label maps to exactly one type code, so all its rows agree on color.
pub fn color_map(rows: &[ClassifiedRow]) -> BTreeMap<String, Option<String>> {
    rows.iter()
        .map(|r| (r.label.clone(), r.color.clone()))
        .collect()
}

/// Sums values per (label, year).
///
/// Output is ordered by label, then year.
pub fn aggregate(rows: &[ClassifiedRow]) -> Vec<SummaryRow> {
    let colors = color_map(rows);
    let mut sums: BTreeMap<(&str, u32), f64> = BTreeMap::new();
    for r in rows {
        *sums.entry((r.label.as_str(), r.year)).or_insert(0.0) += r.value;
    }
    sums.into_iter()
        .map(|((label, year), value)| SummaryRow {
            label: label.to_string(),
            year,
            value,
            color: colors.get(label).cloned().flatten(),
        })
        .collect()
}

/// Total across labels for each year.
pub fn year_totals(summary: &[SummaryRow]) -> BTreeMap<u32, f64> {
    let mut totals = BTreeMap::new();
    for r in summary {
        *totals.entry(r.year).or_insert(0.0) += r.value;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, color: Option<&str>, year: u32, value: f64) -> ClassifiedRow {
        ClassifiedRow {
            label: label.to_string(),
            color: color.map(str::to_string),
            year,
            value,
        }
    }

    #[test]
    fn groups_by_label_and_year() {
        let rows = vec![
            row("COA", Some("#000000"), 2025, 1.0),
            row("COA", Some("#000000"), 2025, 2.5),
            row("COA", Some("#000000"), 2026, 4.0),
            row("SPV", None, 2025, 0.5),
        ];
        let summary = aggregate(&rows);
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].label, "COA");
        assert_eq!(summary[0].year, 2025);
        assert!((summary[0].value - 3.5).abs() < 1e-12);
        assert_eq!(summary[0].color.as_deref(), Some("#000000"));
        assert_eq!(summary[2].color, None);
    }

    #[test]
    fn aggregation_conserves_totals() {
        let rows: Vec<ClassifiedRow> = (0..20u32)
            .map(|i| {
                let label = if i % 3 == 0 { "COA" } else { "HYD" };
                row(label, None, 2025 + i % 2, f64::from(i) * 0.7)
            })
            .collect();
        let input_total: f64 = rows.iter().map(|r| r.value).sum();
        let summary = aggregate(&rows);
        let output_total: f64 = summary.iter().map(|r| r.value).sum();
        assert!((input_total - output_total).abs() < 1e-9);

        let by_year = year_totals(&summary);
        let even: f64 = rows.iter().filter(|r| r.year == 2025).map(|r| r.value).sum();
        assert!(by_year.get(&2025).is_some_and(|v| (v - even).abs() < 1e-9));
    }

    #[test]
    fn empty_input_gives_empty_summary() {
        assert!(aggregate(&[]).is_empty());
    }
}
