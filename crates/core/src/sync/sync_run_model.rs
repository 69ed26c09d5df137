//! Sync run ledger domain models.

use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::time_utils::SyncWindow;

/// What a sync run collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncRunType {
    /// Orders, then financial events, then summaries
    #[default]
    Full,
    Orders,
    FinancialEvents,
}

impl SyncRunType {
    pub fn includes_orders(self) -> bool {
        matches!(self, SyncRunType::Full | SyncRunType::Orders)
    }

    pub fn includes_events(self) -> bool {
        matches!(self, SyncRunType::Full | SyncRunType::FinancialEvents)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SyncRunType::Full => "full",
            SyncRunType::Orders => "orders",
            SyncRunType::FinancialEvents => "financial_events",
        }
    }
}

/// Status of a sync run: `running` until it ends in `success` or `failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncRunStatus {
    #[default]
    Running,
    Success,
    Failed,
}

impl SyncRunStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SyncRunStatus::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SyncRunStatus::Running => "running",
            SyncRunStatus::Success => "success",
            SyncRunStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncWarningKind {
    /// Line items of an order could not be fetched; the order was kept header-only.
    ItemFetchFailed,
    /// Orders beyond the item-fetch limit.
    ItemsSkipped,
    /// A refund whose order has no allocatable items.
    RefundUnattributed,
    PageLimitHit,
    OrderLimitHit,
}

/// A non-fatal condition recorded on the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncWarning {
    pub kind: SyncWarningKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub message: String,
}

impl SyncWarning {
    pub fn new(kind: SyncWarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            order_id: None,
            message: message.into(),
        }
    }

    pub fn for_order(
        kind: SyncWarningKind,
        order_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            order_id: Some(order_id.into()),
            message: message.into(),
        }
    }
}

/// One ledger entry per sync invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRun {
    pub id: String,
    pub run_type: SyncRunType,
    pub status: SyncRunStatus,
    pub marketplace_id: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub lookback_days: u32,
    /// Limits the run was started with
    pub limits: Option<Value>,
    pub dry_run: bool,
    /// Counts and diagnostics once finished
    pub summary: Option<Value>,
    pub warnings: Vec<SyncWarning>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
}

impl SyncRun {
    /// Creates a new run in `running` state.
    pub fn new(
        run_type: SyncRunType,
        marketplace_id: String,
        window: SyncWindow,
        lookback_days: u32,
        limits: Option<Value>,
        dry_run: bool,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            run_type,
            status: SyncRunStatus::Running,
            marketplace_id,
            window_start: window.start,
            window_end: window.end,
            lookback_days,
            limits,
            dry_run,
            summary: None,
            warnings: Vec::new(),
            error: None,
            started_at: Utc::now(),
            finished_at: None,
            duration_ms: None,
        }
    }

    /// Mark the run as completed successfully
    pub fn complete(&mut self, summary: Value, warnings: Vec<SyncWarning>) {
        self.status = SyncRunStatus::Success;
        self.summary = Some(summary);
        self.warnings = warnings;
        self.finish();
    }

    /// Mark the run as failed. Warnings gathered before the failure are kept.
    pub fn fail(&mut self, error: String, warnings: Vec<SyncWarning>) {
        self.status = SyncRunStatus::Failed;
        self.error = Some(error);
        self.warnings = warnings;
        self.finish();
    }

    fn finish(&mut self) {
        let now = Utc::now();
        self.finished_at = Some(now);
        self.duration_ms = Some((now - self.started_at).num_milliseconds().max(0));
    }
}

/// Trait for SyncRun persistence operations
#[async_trait]
pub trait SyncRunRepositoryTrait: Send + Sync {
    async fn create(&self, run: SyncRun) -> Result<SyncRun>;

    async fn update(&self, run: SyncRun) -> Result<SyncRun>;

    fn get_by_id(&self, id: &str) -> Result<Option<SyncRun>>;

    /// Most recent runs first, optionally for one marketplace.
    fn get_recent(&self, marketplace_id: Option<&str>, limit: i64) -> Result<Vec<SyncRun>>;

    fn get_latest(&self, marketplace_id: Option<&str>) -> Result<Option<SyncRun>>;
}
