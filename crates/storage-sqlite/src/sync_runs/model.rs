//! Database models for sync runs.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use sellerledger_core::sync::{SyncRun, SyncRunStatus, SyncRunType};

use crate::utils::{enum_to_text, text_to_enum, text_to_timestamp};

/// Database model for sync runs
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::sync_runs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct SyncRunDB {
    pub id: String,
    pub run_type: String,
    pub status: String,
    pub marketplace_id: String,
    pub window_start: String,
    pub window_end: String,
    pub lookback_days: i32,
    pub limits: Option<String>,
    pub dry_run: bool,
    pub summary: Option<String>,
    pub warnings: String,
    pub error: Option<String>,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub duration_ms: Option<i64>,
}

// Millisecond precision keeps runs started within the same second ordered.
fn run_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<SyncRunDB> for SyncRun {
    fn from(db: SyncRunDB) -> Self {
        Self {
            id: db.id,
            run_type: text_to_enum(&db.run_type).unwrap_or(SyncRunType::Full),
            status: text_to_enum(&db.status).unwrap_or(SyncRunStatus::Running),
            marketplace_id: db.marketplace_id,
            window_start: text_to_timestamp(&db.window_start),
            window_end: text_to_timestamp(&db.window_end),
            lookback_days: u32::try_from(db.lookback_days).unwrap_or(0),
            limits: db.limits.and_then(|s| serde_json::from_str(&s).ok()),
            dry_run: db.dry_run,
            summary: db.summary.and_then(|s| serde_json::from_str(&s).ok()),
            warnings: serde_json::from_str(&db.warnings).unwrap_or_default(),
            error: db.error,
            started_at: text_to_timestamp(&db.started_at),
            finished_at: db.finished_at.as_deref().map(text_to_timestamp),
            duration_ms: db.duration_ms,
        }
    }
}

impl From<SyncRun> for SyncRunDB {
    fn from(domain: SyncRun) -> Self {
        Self {
            id: domain.id,
            run_type: enum_to_text(&domain.run_type),
            status: enum_to_text(&domain.status),
            marketplace_id: domain.marketplace_id,
            window_start: run_timestamp(&domain.window_start),
            window_end: run_timestamp(&domain.window_end),
            lookback_days: i32::try_from(domain.lookback_days).unwrap_or(i32::MAX),
            limits: domain.limits.map(|v| v.to_string()),
            dry_run: domain.dry_run,
            summary: domain.summary.map(|v| v.to_string()),
            warnings: serde_json::to_string(&domain.warnings).unwrap_or_else(|_| "[]".to_string()),
            error: domain.error,
            started_at: run_timestamp(&domain.started_at),
            finished_at: domain.finished_at.as_ref().map(run_timestamp),
            duration_ms: domain.duration_ms,
        }
    }
}
