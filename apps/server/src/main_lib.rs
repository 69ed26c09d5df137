use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use sellerledger_core::summaries::DailySummaryService;
use sellerledger_core::sync::SyncRunRepositoryTrait;
use sellerledger_marketplace::{MarketplaceApiClient, RetryPolicy, RetryingClient, SpApiClient};
use sellerledger_storage_sqlite::{
    db, DailySummaryRepository, FinancialEventRepository, OrderRepository, ProductRepository,
    SyncRunRepository,
};
use sellerledger_sync::{SyncOrchestrator, SyncRepositories};

pub struct AppState {
    pub orchestrator: Arc<SyncOrchestrator>,
    pub summary_service: Arc<DailySummaryService>,
    pub sync_runs: Arc<dyn SyncRunRepositoryTrait>,
}

pub fn init_tracing() {
    let log_format = std::env::var("SL_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let order_repo = Arc::new(OrderRepository::new(pool.clone(), writer.clone()));
    let event_repo = Arc::new(FinancialEventRepository::new(pool.clone(), writer.clone()));
    let product_repo = Arc::new(ProductRepository::new(pool.clone(), writer.clone()));
    let summary_repo = Arc::new(DailySummaryRepository::new(pool.clone(), writer.clone()));
    let sync_run_repo: Arc<dyn SyncRunRepositoryTrait> =
        Arc::new(SyncRunRepository::new(pool.clone(), writer.clone()));

    let summary_service = Arc::new(DailySummaryService::new(
        order_repo.clone(),
        event_repo.clone(),
        product_repo.clone(),
        summary_repo,
    ));

    let sp_api = Arc::new(SpApiClient::new(config.credentials.clone())?);
    let client: Arc<dyn MarketplaceApiClient> =
        Arc::new(RetryingClient::new(sp_api, RetryPolicy::default()));
    tracing::info!(
        "Marketplace client ready for {} at {}",
        config.credentials.marketplace_id,
        config.credentials.endpoint
    );

    let repositories = SyncRepositories {
        orders: order_repo,
        events: event_repo,
        products: product_repo,
        runs: sync_run_repo.clone(),
    };
    let orchestrator = Arc::new(SyncOrchestrator::new(
        client,
        repositories,
        summary_service.clone(),
        config.sync.clone(),
    ));

    Ok(Arc::new(AppState {
        orchestrator,
        summary_service,
        sync_runs: sync_run_repo,
    }))
}
