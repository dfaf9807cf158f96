//! Timeslice → hourly disaggregation.
//!
//! The pipeline is split into steps that can be tested on their own:
//! [`label_timeslices`] → [`decompose`] → [`join`] → [`to_power`] →
//! [`group_sum`] → [`pivot`]. [`disaggregate`] runs the last five.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::calendar::CalendarTable;
use crate::classify::{Scope, TechnologyClassifier};
use crate::error::Result;
use crate::grid::{Grid, SliceKey};
use crate::types::TimesliceRecord;

const MEGA: f64 = 1e6;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Converts an energy quantity into average power over a month of `days` days.
///
/// `energy × 1e6 / (days × 3600)`; PJ in, GW out.
pub fn energy_to_power(energy: f64, days: u32) -> f64 {
    energy * MEGA / (f64::from(days) * SECONDS_PER_HOUR)
}

/// Inverse of [`energy_to_power`] for the same `days`.
pub fn power_to_energy(power: f64, days: u32) -> f64 {
    power * f64::from(days) * SECONDS_PER_HOUR / MEGA
}

/// Splits a timeslice code into (season, daypart): the first two characters
/// and the rest. `None` for codes shorter than two characters.
pub fn split_timeslice(code: &str) -> Option<(&str, &str)> {
    if code.len() < 2 || !code.is_char_boundary(2) {
        return None;
    }
    Some(code.split_at(2))
}

/// A timeslice value whose technology has been replaced by its label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledTimeslice {
    pub label: String,
    pub color: Option<String>,
    pub timeslice: String,
    pub year: u32,
    pub value: f64,
}

/// Classifies timeslice records, dropping those out of scope.
pub fn label_timeslices(
    records: &[TimesliceRecord],
    classifier: &TechnologyClassifier,
    scope: &Scope,
) -> Result<Vec<LabeledTimeslice>> {
    let mut out = Vec::with_capacity(records.len());
    for r in records {
        if let Some(c) = classifier.classify(&r.technology, scope)? {
            out.push(LabeledTimeslice {
                label: c.label,
                color: c.color,
                timeslice: r.timeslice.clone(),
                year: r.year,
                value: r.value,
            });
        }
    }
    Ok(out)
}

/// A value keyed for the grid join.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceValue {
    pub key: SliceKey,
    pub value: f64,
}

/// Step 1: replaces each timeslice code with its (season, daypart) pair.
///
/// Codes too short to carry a season cannot join anything and are dropped.
pub fn decompose(values: &[LabeledTimeslice]) -> Vec<SliceValue> {
    let out: Vec<SliceValue> = values
        .iter()
        .filter_map(|v| {
            let (season, daypart) = split_timeslice(&v.timeslice)?;
            Some(SliceValue {
                key: SliceKey {
                    label: v.label.clone(),
                    season: season.to_string(),
                    daypart: daypart.to_string(),
                    year: v.year,
                },
                value: v.value,
            })
        })
        .collect();
    if out.len() < values.len() {
        debug!(
            dropped = values.len() - out.len(),
            "dropped values with short timeslice codes"
        );
    }
    out
}

/// A value placed on one grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedValue {
    pub label: String,
    /// Position of the month in calendar order.
    pub month: usize,
    pub hour: u8,
    pub year: u32,
    pub days: u32,
    pub value: f64,
}

/// Step 2: spreads every value over the grid cells sharing its key.
///
/// Values with no matching cell are dropped, not zero-filled.
pub fn join(values: &[SliceValue], grid: &Grid) -> Vec<JoinedValue> {
    let mut out = Vec::new();
    let mut unmatched = 0usize;
    for v in values {
        let before = out.len();
        out.extend(grid.matching(&v.key).map(|cell| JoinedValue {
            label: cell.label.clone(),
            month: cell.month,
            hour: cell.hour,
            year: cell.year,
            days: cell.days,
            value: v.value,
        }));
        if out.len() == before {
            unmatched += 1;
        }
    }
    debug!(
        values = values.len(),
        unmatched,
        joined = out.len(),
        "joined timeslice values onto grid"
    );
    out
}

/// Step 3: converts every joined value from energy to power.
pub fn to_power(mut joined: Vec<JoinedValue>) -> Vec<JoinedValue> {
    for j in &mut joined {
        j.value = energy_to_power(j.value, j.days);
    }
    joined
}

/// (month position, hour, year)
pub type HourKey = (usize, u8, u32);

/// Step 4: sums values sharing (month, hour, year, label).
pub fn group_sum(joined: &[JoinedValue]) -> BTreeMap<HourKey, BTreeMap<String, f64>> {
    let mut grouped: BTreeMap<HourKey, BTreeMap<String, f64>> = BTreeMap::new();
    for j in joined {
        *grouped
            .entry((j.month, j.hour, j.year))
            .or_default()
            .entry(j.label.clone())
            .or_insert(0.0) += j.value;
    }
    grouped
}

/// One (month, hour, year) row of the hourly matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyRow {
    pub month: String,
    pub hour: u8,
    pub year: u32,
    /// One value per label, in [`HourlyMatrix::labels`] order.
    pub values: Vec<f64>,
}

/// Hourly power by (month, hour, year) with one column per label.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HourlyMatrix {
    labels: Vec<String>,
    rows: Vec<HourlyRow>,
}

impl HourlyMatrix {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn rows(&self) -> &[HourlyRow] {
        &self.rows
    }

    /// True when no value survived the join. Callers must check before charting.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Value of one cell, `None` if the row or the label is absent.
    pub fn value(&self, month: &str, hour: u8, year: u32, label: &str) -> Option<f64> {
        let col = self.column(label)?;
        self.rows
            .iter()
            .find(|r| r.month == month && r.hour == hour && r.year == year)
            .map(|r| r.values[col])
    }

    /// Distinct years present, ascending.
    pub fn years(&self) -> Vec<u32> {
        self.rows
            .iter()
            .map(|r| r.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Rows of a single year, same labels.
    pub fn for_year(&self, year: u32) -> Self {
        Self {
            labels: self.labels.clone(),
            rows: self.rows.iter().filter(|r| r.year == year).cloned().collect(),
        }
    }
}

/// Step 5: pivots grouped values into the matrix.
///
/// Rows are the observed (month, hour, year) keys in calendar order; columns
/// are every label observed anywhere; holes are filled with zero. Month
/// positions resolve against the grid the values were joined on.
pub fn pivot(grouped: &BTreeMap<HourKey, BTreeMap<String, f64>>, grid: &Grid) -> HourlyMatrix {
    let labels: Vec<String> = grouped
        .values()
        .flat_map(|by_label| by_label.keys())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect();

    let rows = grouped
        .iter()
        .filter_map(|(&(month, hour, year), by_label)| {
            Some(HourlyRow {
                month: grid.month_name(month)?.to_string(),
                hour,
                year,
                values: labels
                    .iter()
                    .map(|l| by_label.get(l).copied().unwrap_or(0.0))
                    .collect(),
            })
        })
        .collect();

    HourlyMatrix { labels, rows }
}

/// Runs decompose → join → convert → sum → pivot.
///
/// # Arguments
///
/// * `values` - Labeled timeslice values, in annual-energy units
/// * `grid` - Calendar grid built with the same label scope
///
/// # Returns
///
/// The hourly matrix; empty when nothing joined.
pub fn disaggregate(values: &[LabeledTimeslice], grid: &Grid) -> HourlyMatrix {
    let decomposed = decompose(values);
    let joined = to_power(join(&decomposed, grid));
    let matrix = pivot(&group_sum(&joined), grid);
    debug!(
        rows = matrix.rows().len(),
        labels = matrix.labels().len(),
        "pivoted hourly matrix"
    );
    matrix
}

/// Recovers per-timeslice energy from a matrix.
///
/// Each cell is converted back with its month's day count, then cells of
/// the same (label, season, daypart, year) are averaged.
pub fn energy_by_timeslice(
    matrix: &HourlyMatrix,
    calendar: &CalendarTable,
) -> Result<BTreeMap<SliceKey, f64>> {
    let mut acc: BTreeMap<SliceKey, (f64, usize)> = BTreeMap::new();
    for row in matrix.rows() {
        let (season, days) = calendar.season_and_days(&row.month)?;
        let Some(daypart) = calendar.daypart(row.hour) else {
            continue;
        };
        for (label, &power) in matrix.labels().iter().zip(&row.values) {
            let entry = acc
                .entry(SliceKey {
                    label: label.clone(),
                    season: season.to_string(),
                    daypart: daypart.to_string(),
                    year: row.year,
                })
                .or_insert((0.0, 0));
            entry.0 += power_to_energy(power, days);
            entry.1 += 1;
        }
    }
    Ok(acc
        .into_iter()
        .map(|(k, (sum, n))| (k, sum / n as f64))
        .collect())
}

/// Annual energy per (label, year) recovered from a matrix.
pub fn annual_energy(
    matrix: &HourlyMatrix,
    calendar: &CalendarTable,
) -> Result<BTreeMap<(String, u32), f64>> {
    let mut totals: BTreeMap<(String, u32), f64> = BTreeMap::new();
    for (key, energy) in energy_by_timeslice(matrix, calendar)? {
        *totals.entry((key.label, key.year)).or_insert(0.0) += energy;
    }
    Ok(totals)
}
