//! Application setup and initialization
//!
//! Everything `main` needs to go from a loaded `Config` to a router, kept out
//! of `main.rs` so the integration tests can reuse the pieces.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    // Setup database (in-memory when DATABASE_URL is unset)
    let pool = database::setup_database(&config).await?;
    let videos = database::video_repository(pool.clone());

    // Setup storage
    let storage = storage::setup_storage(&config).await?;

    // Build pipelines and application state
    let state = services::initialize_services(&config, pool, videos, storage)?;

    // Setup routes
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
