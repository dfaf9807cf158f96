//! API query and response types.

use serde::{Deserialize, Serialize};

/// Optional country filter for the summary endpoints.
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// Three-letter country code; omitted for the system view.
    pub country: Option<String>,
}

/// Optional year filter for the hourly endpoint.
#[derive(Debug, Deserialize)]
pub struct HourlyQuery {
    pub year: Option<u32>,
}

/// Error response body for 4xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
