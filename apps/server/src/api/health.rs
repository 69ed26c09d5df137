use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::{error::ApiResult, main_lib::AppState};
use sellerledger_core::sync::SyncRunStatus;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
    last_sync_status: Option<SyncRunStatus>,
}

/// Liveness plus the outcome of the latest sync. Fails when the store is unreadable.
async fn healthz(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthStatus>> {
    let latest = state.sync_runs.get_latest(None)?;
    Ok(Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        last_sync_status: latest.map(|run| run.status),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/healthz", get(healthz))
}
