use churnguard::{
    config::Settings,
    database::connection::{establish_connection, test_connection},
    database::executor::QueryExecutor,
    database::warehouse::{PgWarehouse, Warehouse},
    handlers,
    services::account_metrics::AccountMetricsService,
    services::history::HistoryService,
    services::metrics_cache::MetricsCache,
    AppState,
};

use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&settings.logging.level))
        .init();

    info!("Starting ChurnGuard");
    info!("Configuration loaded successfully");

    // Establish warehouse connection
    let pool = establish_connection(&settings.warehouse.url).await?;
    test_connection(&pool).await?;

    let executor = QueryExecutor::new(
        pool,
        Duration::from_secs(settings.cache.query_timeout_seconds),
    );
    let warehouse: Arc<dyn Warehouse> = Arc::new(PgWarehouse::new(executor));

    let cache = Arc::new(MetricsCache::with_max_age(
        warehouse.clone(),
        chrono::Duration::hours(settings.cache.max_age_hours),
    ));

    let state = AppState {
        account_metrics: Arc::new(AccountMetricsService::new(warehouse.clone(), cache)),
        history: Arc::new(HistoryService::new(warehouse)),
    };

    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/accounts", get(handlers::list_accounts))
        .route("/api/accounts/:id/history", get(handlers::account_history))
        .route("/api/risk-summary", get(handlers::risk_summary))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = settings.api.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server running on {}:{}", settings.api.host, settings.api.port);
    info!("  GET /health - Service health");
    info!("  GET /api/accounts?period=weekly|monthly - Scored account list");
    info!("  GET /api/accounts/{{id}}/history - 12-week account history");
    info!("  GET /api/risk-summary - Dashboard risk summary");

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                error!("Web server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Shutting down ChurnGuard");
    Ok(())
}
