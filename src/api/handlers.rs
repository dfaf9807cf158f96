//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;

use super::AppState;
use super::types::{ErrorResponse, HourlyQuery, SummaryQuery};
use crate::report::{HourlyTable, Metric, SummaryTable};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn not_found(message: String) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new(message)))
}

fn summary(state: &AppState, metric: Metric, query: SummaryQuery) -> ApiResult<SummaryTable> {
    let report = &state.report;
    let table = match query.country {
        None => match metric {
            Metric::Capacity => &report.capacity,
            Metric::Generation => &report.generation,
        },
        Some(ref code) => {
            let country = report
                .country(code)
                .ok_or_else(|| not_found(format!("no results for country `{code}`")))?;
            match metric {
                Metric::Capacity => &country.capacity,
                Metric::Generation => &country.generation,
            }
        }
    };
    let table = table.non_empty().map_err(|e| not_found(e.to_string()))?;
    Ok(Json(table.clone()))
}

/// `GET /summary/capacity[?country=CC]` → 200 + `SummaryTable`, 404 for an
/// unreported country or a summary without rows.
pub async fn get_capacity(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<SummaryTable> {
    summary(&state, Metric::Capacity, query)
}

/// `GET /summary/generation[?country=CC]`
pub async fn get_generation(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<SummaryTable> {
    summary(&state, Metric::Generation, query)
}

/// `GET /hourly[?year=Y]` → 200 + `HourlyTable`; 404 when there is no data
/// for the requested year.
pub async fn get_hourly(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HourlyQuery>,
) -> ApiResult<HourlyTable> {
    let hourly = &state.report.hourly;
    let mut table = hourly.clone();
    if let Some(year) = query.year {
        table.matrix = hourly.matrix.for_year(year);
    }
    if table.matrix.is_empty() {
        let message = match query.year {
            Some(y) => format!("no hourly data for {y}"),
            None => "no hourly data".to_string(),
        };
        return Err(not_found(message));
    }
    Ok(Json(table))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::calendar::tests::small_calendar;
    use crate::classify::tests::classifier;
    use crate::config::RunConfig;
    use crate::io::read::ResultTables;
    use crate::report;
    use crate::types::{AnnualRecord, TimesliceRecord};

    fn make_test_state() -> Arc<AppState> {
        let mut config = RunConfig::default();
        config.scenario.start_year = 2025;
        config.scenario.end_year = 2026;
        config.scenario.geographic_scope = vec!["IND".to_string(), "NPL".to_string()];
        config.scenario.results_by_country = true;

        let annual = |year| AnnualRecord {
            technology: "PWRCOAIND".to_string(),
            year,
            value: 2.0,
        };
        let tables = ResultTables {
            technologies: vec!["PWRCOAIND".to_string()],
            capacity: vec![annual(2025), annual(2026)],
            annual_production: vec![annual(2025)],
            production: vec![TimesliceRecord {
                timeslice: "S2D1".to_string(),
                technology: "PWRCOAIND".to_string(),
                year: 2025,
                value: 4.0,
            }],
        };
        let report = report::build(&config, &small_calendar(), &classifier(), &tables).unwrap();
        Arc::new(AppState { report })
    }

    async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = router(make_test_state());
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn system_capacity_returns_200() {
        let (status, json) = get("/summary/capacity").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["title"], "Total System Capacity");
        assert_eq!(json["rows"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["colors"]["COA"], "#000000");
    }

    #[tokio::test]
    async fn country_generation_uses_country_labels() {
        let (status, json) = get("/summary/generation?country=IND").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["legend_title"], "Country-Powerplant");
        assert_eq!(json["rows"][0]["label"], "IND-COA");
    }

    #[tokio::test]
    async fn unknown_country_returns_404() {
        let (status, json) = get("/summary/capacity?country=BTN").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn reported_country_without_rows_returns_404() {
        let (status, json) = get("/summary/capacity?country=NPL").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "no data: capacity summary has no rows");
    }

    #[tokio::test]
    async fn hourly_filters_by_year() {
        let (status, json) = get("/hourly?year=2025").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["unit"], "Gigawatts (GW)");
        let rows = json["matrix"]["rows"].as_array().cloned().unwrap_or_default();
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|r| r["year"] == 2025));
    }

    #[tokio::test]
    async fn hourly_without_data_returns_404() {
        let (status, _) = get("/hourly?year=2026").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
