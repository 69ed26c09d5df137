use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use sellerledger_core::sync::SyncRun;
use sellerledger_sync::{SyncReport, SyncRequest};

const DEFAULT_RUN_LIMIT: i64 = 20;
const MAX_RUN_LIMIT: i64 = 200;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunsQuery {
    marketplace_id: Option<String>,
    limit: Option<i64>,
}

/// Runs one sync and returns its report once the run is finished.
async fn trigger_sync(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SyncRequest>,
) -> ApiResult<Json<SyncReport>> {
    tracing::info!(
        "Sync requested: {} (dry run: {})",
        request.run_type.as_str(),
        request.dry_run
    );
    let report = state.orchestrator.run(request).await?;
    Ok(Json(report))
}

async fn list_runs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RunsQuery>,
) -> ApiResult<Json<Vec<SyncRun>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RUN_LIMIT)
        .clamp(1, MAX_RUN_LIMIT);
    let runs = state
        .sync_runs
        .get_recent(query.marketplace_id.as_deref(), limit)?;
    Ok(Json(runs))
}

async fn latest_run(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RunsQuery>,
) -> ApiResult<Json<SyncRun>> {
    state
        .sync_runs
        .get_latest(query.marketplace_id.as_deref())?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No sync run recorded yet".to_string()))
}

async fn get_run(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SyncRun>> {
    state
        .sync_runs
        .get_by_id(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Sync run {} not found", id)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sync", post(trigger_sync))
        .route("/sync/runs", get(list_runs))
        .route("/sync/runs/latest", get(latest_run))
        .route("/sync/runs/{id}", get(get_run))
}
