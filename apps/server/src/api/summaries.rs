use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use sellerledger_core::summaries::DailySummary;

/// Days returned when the query names no start date.
const DEFAULT_RANGE_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummariesQuery {
    marketplace_id: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

async fn get_summaries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SummariesQuery>,
) -> ApiResult<Json<Vec<DailySummary>>> {
    let end = query.end.unwrap_or_else(|| Utc::now().date_naive());
    let start = query
        .start
        .unwrap_or_else(|| end - Duration::days(DEFAULT_RANGE_DAYS - 1));
    if start > end {
        return Err(ApiError::BadRequest(format!(
            "start {} is after end {}",
            start, end
        )));
    }

    let summaries = state
        .summary_service
        .get_summaries(query.marketplace_id.as_deref(), start, end)?;
    Ok(Json(summaries))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/summaries", get(get_summaries))
}
