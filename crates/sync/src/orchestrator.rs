//! Sync orchestrator: one ledger-tracked run over orders, financial events and
//! daily summaries.

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde_json::json;
use std::sync::Arc;

use sellerledger_core::constants::DEFAULT_CURRENCY;
use sellerledger_core::errors::{Error, Result};
use sellerledger_core::finances::{FinancialEventRepositoryTrait, FlattenContext};
use sellerledger_core::orders::OrderRepositoryTrait;
use sellerledger_core::products::ProductRepositoryTrait;
use sellerledger_core::summaries::DailySummaryService;
use sellerledger_core::sync::{SyncRun, SyncRunRepositoryTrait, SyncWarning};
use sellerledger_core::utils::time_utils::SyncWindow;
use sellerledger_marketplace::{FinancialEventsQuery, MarketplaceApiClient, OrdersQuery};

use crate::config::{ResolvedRequest, SyncConfig, SyncRequest};
use crate::event_collector::FinancialEventCollector;
use crate::order_collector::{OrderCollector, OrderLimits};
use crate::reconciliation::ReconciliationWriter;
use crate::report::{SyncCounts, SyncDiagnostics, SyncReport};

/// Repositories the orchestrator reads and writes.
#[derive(Clone)]
pub struct SyncRepositories {
    pub orders: Arc<dyn OrderRepositoryTrait>,
    pub events: Arc<dyn FinancialEventRepositoryTrait>,
    pub products: Arc<dyn ProductRepositoryTrait>,
    pub runs: Arc<dyn SyncRunRepositoryTrait>,
}

/// Results of the run body, whether or not it finished.
#[derive(Default)]
struct RunProgress {
    counts: SyncCounts,
    diagnostics: SyncDiagnostics,
    warnings: Vec<SyncWarning>,
}

pub struct SyncOrchestrator {
    client: Arc<dyn MarketplaceApiClient>,
    repositories: SyncRepositories,
    summary_service: Arc<DailySummaryService>,
    writer: ReconciliationWriter,
    config: SyncConfig,
}

impl SyncOrchestrator {
    pub fn new(
        client: Arc<dyn MarketplaceApiClient>,
        repositories: SyncRepositories,
        summary_service: Arc<DailySummaryService>,
        config: SyncConfig,
    ) -> Self {
        let writer = ReconciliationWriter::new(
            repositories.orders.clone(),
            repositories.events.clone(),
            repositories.products.clone(),
        )
        .with_write_concurrency(config.write_concurrency)
        .with_event_batch_size(config.event_batch_size);

        Self {
            client,
            repositories,
            summary_service,
            writer,
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Runs one sync. The ledger row is written before any upstream call and
    /// finalized as `success` or `failed`; failures are returned after the
    /// row is updated.
    pub async fn run(&self, request: SyncRequest) -> Result<SyncReport> {
        let resolved = request.resolve(&self.config)?;
        let now = Utc::now();
        let window = SyncWindow::lookback(now, resolved.lookback_days);

        let run = SyncRun::new(
            resolved.run_type,
            resolved.marketplace_id.clone(),
            window,
            resolved.lookback_days,
            Some(resolved.limits_json()),
            resolved.dry_run,
        );
        let mut run = self.repositories.runs.create(run).await?;
        info!(
            "Sync run {} started: {} for {} ({} to {}){}",
            run.id,
            resolved.run_type.as_str(),
            resolved.marketplace_id,
            window.start,
            window.end,
            if resolved.dry_run { " [dry run]" } else { "" }
        );

        let mut progress = RunProgress::default();
        let result = match self.config.sync_timeout {
            Some(budget) => {
                match tokio::time::timeout(budget, self.execute(&resolved, window, now, &mut progress))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(Error::Timeout(budget.as_secs())),
                }
            }
            None => self.execute(&resolved, window, now, &mut progress).await,
        };

        match result {
            Ok(()) => {
                let summary = json!({
                    "counts": progress.counts,
                    "diagnostics": progress.diagnostics,
                });
                run.complete(summary, progress.warnings.clone());
                let run = self.repositories.runs.update(run).await?;
                info!(
                    "Sync run {} succeeded in {}ms with {} warnings",
                    run.id,
                    run.duration_ms.unwrap_or_default(),
                    run.warnings.len()
                );

                Ok(SyncReport {
                    run_id: run.id,
                    dry_run: resolved.dry_run,
                    counts: progress.counts,
                    diagnostics: progress.diagnostics,
                    warnings: progress.warnings,
                })
            }
            Err(err) => {
                error!("Sync run {} failed: {}", run.id, err);
                run.fail(err.to_string(), progress.warnings);
                if let Err(update_err) = self.repositories.runs.update(run).await {
                    error!("Failed to record sync run failure: {}", update_err);
                }
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        request: &ResolvedRequest,
        window: SyncWindow,
        collected_at: DateTime<Utc>,
        progress: &mut RunProgress,
    ) -> Result<()> {
        let client = self.client.as_ref();

        let orders = if request.run_type.includes_orders() {
            let limits = OrderLimits {
                max_pages: request.max_pages,
                max_orders: request.max_orders,
                max_orders_with_items: request.max_orders_with_items,
                item_fetch_concurrency: self.config.item_fetch_concurrency,
            };
            let query = OrdersQuery {
                marketplace_id: request.marketplace_id.clone(),
                created_after: window.start,
                created_before: window.end,
                page_size: request.page_size,
            };
            let collection = OrderCollector::new(client, limits).collect(&query).await?;
            progress.diagnostics.orders = Some(collection.diagnostics);
            progress.warnings.extend(collection.warnings);
            collection.orders
        } else {
            Vec::new()
        };

        let events = if request.run_type.includes_events() {
            let query = FinancialEventsQuery {
                posted_after: window.start,
                posted_before: window.end,
                page_size: request.page_size,
            };
            let context = FlattenContext {
                collected_at,
                default_currency: DEFAULT_CURRENCY.to_string(),
            };
            let collection = FinancialEventCollector::new(client, request.max_pages)
                .collect(&query, &context)
                .await?;
            progress.diagnostics.events = Some(collection.diagnostics);
            progress.warnings.extend(collection.warnings);
            collection.events
        } else {
            Vec::new()
        };

        let plan = self.writer.plan(&request.marketplace_id, orders, events)?;
        progress.counts = plan.counts;
        progress.warnings.extend(plan.warnings.iter().cloned());

        let dates = window.dates();
        progress.counts.summary_days = dates.len();

        if request.dry_run {
            info!("Dry run: skipping writes and summary recompute");
            return Ok(());
        }

        let applied = self.writer.apply(plan).await?;
        if applied.events.inserted != progress.counts.events_inserted {
            warn!(
                "Planned {} new events but inserted {}",
                progress.counts.events_inserted, applied.events.inserted
            );
        }

        if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
            self.summary_service
                .recompute(&request.marketplace_id, *first, *last)
                .await?;
        }

        Ok(())
    }
}
