mod calendar;
mod config;
mod error;
mod extractors;
mod handlers;
mod middleware;
mod models;
mod openapi;
mod startup;
mod upstream;

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use handlers::MetricsState;

use upstream::{CareDataSource, HttpCareApi, RosterCache};

pub struct AppState {
    pub care_api: Arc<dyn CareDataSource>,
    pub roster: RosterCache,
    pub config: AppConfig,
    pub metrics: Arc<MetricsState>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    handlers::debug::mark_started();

    // Initialize tracing with conditional JSON/text output
    let use_json = std::env::var("LOG_FORMAT")
        .unwrap_or_else(|_| "text".to_string()) == "json";

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,carecal_axum=debug,tower_http=debug".into());

    if use_json {
        // Structured JSON logging for production
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Human-readable for development
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration error: {}", e);
        e
    })?;

    // Upstream care API client
    let care_api = HttpCareApi::new(
        &config.care_api_url,
        Duration::from_secs(config.care_api_timeout_secs),
    )
    .map_err(|e| {
        tracing::error!("Failed to build care API client: {}", e);
        e
    })?;
    tracing::info!(url = care_api.base_url(), "Care API client created");

    // Initialize metrics recorder
    let metrics_state = Arc::new(handlers::setup_metrics_recorder()?);
    tracing::info!("Metrics recorder initialized");

    // Caregiver roster cache
    let roster = RosterCache::new(Duration::from_secs(config.roster_cache_ttl_secs));

    let bind_addr = config.bind_addr.clone();

    // Create application state
    let state = Arc::new(AppState {
        care_api: Arc::new(care_api),
        roster,
        config,
        metrics: metrics_state,
    });

    // Build router
    let app = startup::build_router(state);

    // Start server
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
