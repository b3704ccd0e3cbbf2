//! Application state and sub-state extractors.
//!
//! Handlers take `State<Arc<AppState>>` and reach into the sub-state they need.

use crate::auth::AuthState;
use sqlx::PgPool;
use std::sync::Arc;
use tubely_core::{Config, StorageBackend, ThumbnailStorage};
use tubely_processing::{ThumbnailPipeline, VideoUploadPipeline};

/// The two upload pipelines, built once at startup
#[derive(Clone)]
pub struct UploadState {
    pub video: VideoUploadPipeline,
    pub thumbnail: ThumbnailPipeline,
}

/// What the health endpoint reports on
#[derive(Clone)]
pub struct HealthState {
    /// `None` when running against the in-memory repository
    pub pool: Option<PgPool>,
    pub storage_backend: StorageBackend,
    pub thumbnail_storage: ThumbnailStorage,
}

pub struct AppState {
    pub config: Config,
    pub uploads: UploadState,
    pub auth: Arc<AuthState>,
    pub health: HealthState,
}
