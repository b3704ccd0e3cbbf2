//! Route configuration and setup.
//!
//! Upload routes live in [domains](domains); the health check in [health](health).

mod domains;
mod health;

use crate::constants::MULTIPART_OVERHEAD_BYTES;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tubely_core::{Config, ThumbnailStorage};

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let protected_routes = domains::upload_routes().layer(axum::middleware::from_fn_with_state(
        state.auth.clone(),
        crate::auth::auth_middleware,
    ));

    let mut app = Router::new()
        .route("/health", get(health::health_check))
        .merge(protected_routes);

    if config.thumbnail_storage() == ThumbnailStorage::Disk {
        tracing::info!(assets_root = %config.assets_root(), "Serving thumbnail assets at /assets");
        app = app.nest_service("/assets", ServeDir::new(config.assets_root()));
    }

    // The pipelines enforce the per-kind caps; this bounds the raw request
    let body_limit = config
        .max_video_size_bytes()
        .max(config.max_thumbnail_size_bytes())
        + MULTIPART_OVERHEAD_BYTES;

    let app = app
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
