//! Pipeline construction and application state setup

use crate::auth::{AuthState, JwtService};
use crate::state::{AppState, HealthState, UploadState};
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{
    FfmpegTool, MediaTool, PipelineConfig, ThumbnailPipeline, VideoUploadPipeline,
};

use super::storage::StorageSetup;

/// Build the upload pipelines around the ffmpeg toolchain
pub fn initialize_services(
    config: &Config,
    pool: Option<PgPool>,
    videos: Arc<dyn VideoRepository>,
    storage: StorageSetup,
) -> Result<Arc<AppState>> {
    let media: Arc<dyn MediaTool> =
        Arc::new(FfmpegTool::from_config(config).context("Invalid media tool configuration")?);

    Ok(build_state(config, pool, media, videos, storage))
}

/// Assemble `AppState` from already-constructed collaborators
pub fn build_state(
    config: &Config,
    pool: Option<PgPool>,
    media: Arc<dyn MediaTool>,
    videos: Arc<dyn VideoRepository>,
    storage: StorageSetup,
) -> Arc<AppState> {
    let pipeline_config = PipelineConfig::from_config(config);
    tracing::debug!(
        max_video_bytes = pipeline_config.max_video_bytes,
        max_thumbnail_bytes = pipeline_config.max_thumbnail_bytes,
        temp_dir = %pipeline_config.temp_dir.display(),
        timeout = ?pipeline_config.timeout,
        "Pipeline configuration"
    );

    let health = HealthState {
        pool,
        storage_backend: storage.videos.backend_type(),
        thumbnail_storage: storage.thumbnails.mode(),
    };

    let uploads = UploadState {
        video: VideoUploadPipeline::new(
            media,
            storage.videos,
            videos.clone(),
            pipeline_config.clone(),
        ),
        thumbnail: ThumbnailPipeline::new(storage.thumbnails, videos, pipeline_config),
    };

    Arc::new(AppState {
        config: config.clone(),
        uploads,
        auth: Arc::new(AuthState {
            jwt: JwtService::new(config.jwt_secret()),
        }),
        health,
    })
}
