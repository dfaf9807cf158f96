//! Full calendar grid over (label, month, hour, year).

use std::collections::{BTreeSet, HashMap};
use std::ops::RangeInclusive;

use tracing::debug;

use crate::calendar::{CalendarTable, HOURS};
use crate::classify::{Scope, TechnologyClassifier};
use crate::error::Result;

/// One hour of one month of one year for one label.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub label: String,
    /// Position of the month in calendar order.
    pub month: usize,
    pub hour: u8,
    pub year: u32,
    pub season: String,
    pub daypart: String,
    pub days: u32,
}

/// Join key shared by grid cells and timeslice values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SliceKey {
    pub label: String,
    pub season: String,
    pub daypart: String,
    pub year: u32,
}

/// The expanded grid, sorted by (label, year), indexed by [`SliceKey`].
#[derive(Debug, Clone, Default)]
pub struct Grid {
    cells: Vec<GridCell>,
    index: HashMap<SliceKey, Vec<usize>>,
    /// Month names of the calendar the grid was built from, in calendar order.
    month_names: Vec<String>,
}

impl Grid {
    /// Expands raw technology identifiers into the full calendar grid.
    ///
    /// Identifiers go through the same classifier as the result data, so
    /// only reported labels enter the grid, each exactly once.
    ///
    /// # Arguments
    ///
    /// * `identifiers` - Raw technology identifiers (e.g. from `TECHNOLOGY.csv`)
    /// * `classifier` - Domain filter and labeler
    /// * `scope` - Label scope, must match the one used for the values
    /// * `calendar` - Month and daypart lookups
    /// * `years` - Reported years, inclusive
    ///
    /// # Errors
    ///
    /// Propagates [`crate::Error::MalformedTechnology`] from classification.
    pub fn expand<'a>(
        identifiers: impl IntoIterator<Item = &'a str>,
        classifier: &TechnologyClassifier,
        scope: &Scope,
        calendar: &CalendarTable,
        years: RangeInclusive<u32>,
    ) -> Result<Self> {
        let mut labels = BTreeSet::new();
        for id in identifiers {
            if let Some(c) = classifier.classify(id, scope)? {
                labels.insert(c.label);
            }
        }
        Ok(Self::from_labels(&labels, calendar, years))
    }

    /// Cross product of already-classified labels with months, hours and years.
    pub fn from_labels(
        labels: &BTreeSet<String>,
        calendar: &CalendarTable,
        years: RangeInclusive<u32>,
    ) -> Self {
        let months = calendar.months();
        let capacity = labels.len() * months.len() * HOURS.len() * years.clone().count();
        let mut cells = Vec::with_capacity(capacity);

        // BTreeSet iteration keeps the (label, year) ordering.
        for label in labels {
            for year in years.clone() {
                for (month, def) in months.iter().enumerate() {
                    for hour in HOURS {
                        let Some(daypart) = calendar.daypart(hour) else {
                            continue;
                        };
                        cells.push(GridCell {
                            label: label.clone(),
                            month,
                            hour,
                            year,
                            season: def.season.clone(),
                            daypart: daypart.to_string(),
                            days: def.days,
                        });
                    }
                }
            }
        }

        let mut index: HashMap<SliceKey, Vec<usize>> = HashMap::new();
        for (i, c) in cells.iter().enumerate() {
            index
                .entry(SliceKey {
                    label: c.label.clone(),
                    season: c.season.clone(),
                    daypart: c.daypart.clone(),
                    year: c.year,
                })
                .or_default()
                .push(i);
        }

        debug!(
            labels = labels.len(),
            cells = cells.len(),
            slices = index.len(),
            "expanded calendar grid"
        );
        Self {
            cells,
            index,
            month_names: months.iter().map(|m| m.name.clone()).collect(),
        }
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells a timeslice value with this key spreads over; empty if none.
    pub fn matching<'a>(&'a self, key: &SliceKey) -> impl Iterator<Item = &'a GridCell> + use<'a> {
        self.index
            .get(key)
            .into_iter()
            .flatten()
            .map(|&i| &self.cells[i])
    }

    /// Name of the month at a [`GridCell::month`] position.
    pub fn month_name(&self, position: usize) -> Option<&str> {
        self.month_names.get(position).map(String::as_str)
    }
}
