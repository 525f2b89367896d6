use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Router};
use studyhall_api::AppState;
use studyhall_core::GradingQueue;
use studyhall_provider::{HttpModelProvider, ProviderConfig};
use studyhall_storage::{MemoryGradingQueue, PgGradingQueue};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::Config::load()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Studyhall content server");

    // Select queue backing
    let queue: Arc<dyn GradingQueue> = if config.uses_postgres() {
        let pool = studyhall_storage::create_pool(&config.database_url).await?;
        studyhall_storage::ensure_schema(&pool).await?;
        tracing::info!("Database pool initialized");
        Arc::new(PgGradingQueue::new(pool))
    } else {
        tracing::warn!("No database_url configured, using the in-memory queue");
        Arc::new(MemoryGradingQueue::new())
    };

    // Model provider
    let provider_config = ProviderConfig::new(
        config.provider_base_url.clone(),
        config.provider_api_key.clone(),
        config.provider_model.clone(),
    );
    let provider = Arc::new(HttpModelProvider::new(provider_config)?);
    tracing::info!(model = %config.provider_model, "Model provider initialized");

    // Build application state
    let api_state = AppState::new(queue, provider)
        .with_batch_size(config.grading_batch_size)
        .with_worker_secret(config.worker_secret.clone());

    let app = Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", studyhall_api::routes(api_state))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
