//! Hourly generation profiles and annual summaries from timeslice-resolved
//! energy model results.

pub mod aggregate;
/// Months, seasons and dayparts.
pub mod calendar;
pub mod classify;
pub mod cli;
pub mod config;
pub mod disaggregate;
pub mod error;
pub mod grid;
pub mod io;
pub mod report;
pub mod types;

#[cfg(feature = "api")]
pub mod api;

pub use error::{Error, Result};
