//! Calendar lookups: month → (season, days) and hour → daypart.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::error::{Error, Result};

/// Hours of the day, 1-indexed.
pub const HOURS: RangeInclusive<u8> = 1..=24;

/// One row of the season table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthDef {
    /// Calendar month name, e.g. `"January"`.
    #[serde(rename = "month_name")]
    pub name: String,
    /// Two-character season code the month belongs to.
    pub season: String,
    /// Number of days in the month.
    pub days: u32,
}

/// A named hour interval of the day.
///
/// An hour `h` belongs to the daypart when `start_hour < h <= end_hour`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Daypart {
    #[serde(rename = "daypart")]
    pub name: String,
    pub start_hour: u8,
    pub end_hour: u8,
}

impl Daypart {
    pub fn contains(&self, hour: u8) -> bool {
        self.start_hour < hour && hour <= self.end_hour
    }
}

/// Static month and hour lookups, validated on construction.
///
/// # Examples
///
/// ```
/// use timeslice_profiles::calendar::{CalendarTable, Daypart, MonthDef};
///
/// let months = vec![MonthDef { name: "January".into(), season: "S1".into(), days: 31 }];
/// let dayparts = vec![
///     Daypart { name: "D1".into(), start_hour: 0, end_hour: 12 },
///     Daypart { name: "D2".into(), start_hour: 12, end_hour: 24 },
/// ];
/// let calendar = CalendarTable::new(months, dayparts).unwrap();
/// assert_eq!(calendar.daypart(12), Some("D1"));
/// assert_eq!(calendar.daypart(13), Some("D2"));
/// ```
#[derive(Debug, Clone)]
pub struct CalendarTable {
    months: Vec<MonthDef>,
    month_index: HashMap<String, usize>,
    dayparts: Vec<Daypart>,
    /// Daypart index for hours 1..=24, stored at `hour - 1`.
    hour_dayparts: [usize; 24],
}

impl CalendarTable {
    /// Builds the table from the season and daypart definitions.
    ///
    /// # Arguments
    ///
    /// * `months` - Season table rows, in canonical calendar order
    /// * `dayparts` - Daypart intervals
    ///
    /// # Errors
    ///
    /// Returns [`Error::DaypartCoverage`] when any hour of 1..=24 is covered
    /// by zero or several dayparts, and [`Error::Config`] for an empty or
    /// duplicated month list or a month with zero days.
    pub fn new(months: Vec<MonthDef>, dayparts: Vec<Daypart>) -> Result<Self> {
        if months.is_empty() {
            return Err(ConfigError::new("ts_seasons", "no months defined").into());
        }

        let mut month_index = HashMap::with_capacity(months.len());
        for (i, m) in months.iter().enumerate() {
            if m.days == 0 {
                return Err(ConfigError::new(
                    "ts_seasons.days",
                    format!("month \"{}\" has zero days", m.name),
                )
                .into());
            }
            if month_index.insert(m.name.clone(), i).is_some() {
                return Err(ConfigError::new(
                    "ts_seasons.month_name",
                    format!("month \"{}\" defined more than once", m.name),
                )
                .into());
            }
        }

        let mut hour_dayparts = [0usize; 24];
        for hour in HOURS {
            let mut matched = dayparts
                .iter()
                .enumerate()
                .filter(|(_, d)| d.contains(hour))
                .map(|(i, _)| i);
            match (matched.next(), matched.count()) {
                (Some(i), 0) => hour_dayparts[usize::from(hour) - 1] = i,
                (first, rest) => {
                    return Err(Error::DaypartCoverage {
                        hour,
                        matches: usize::from(first.is_some()) + rest,
                    });
                }
            }
        }

        Ok(Self {
            months,
            month_index,
            dayparts,
            hour_dayparts,
        })
    }

    /// Months in canonical calendar order.
    pub fn months(&self) -> &[MonthDef] {
        &self.months
    }

    pub fn dayparts(&self) -> &[Daypart] {
        &self.dayparts
    }

    /// Position of a month in calendar order.
    pub fn month_position(&self, name: &str) -> Option<usize> {
        self.month_index.get(name).copied()
    }

    /// Looks up a month definition by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMonth`] if the season table has no such month.
    pub fn month(&self, name: &str) -> Result<&MonthDef> {
        self.month_position(name)
            .map(|i| &self.months[i])
            .ok_or_else(|| Error::UnknownMonth(name.to_string()))
    }

    /// Returns `(season, days)` for a month name.
    pub fn season_and_days(&self, name: &str) -> Result<(&str, u32)> {
        let m = self.month(name)?;
        Ok((m.season.as_str(), m.days))
    }

    /// Daypart name for an hour, `None` outside 1..=24.
    pub fn daypart(&self, hour: u8) -> Option<&str> {
        if !HOURS.contains(&hour) {
            return None;
        }
        let i = self.hour_dayparts[usize::from(hour) - 1];
        Some(self.dayparts[i].name.as_str())
    }
}
