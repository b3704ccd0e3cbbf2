//! Storage setup and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::{Config, ThumbnailStorage};
use tubely_processing::ThumbnailSink;
use tubely_storage::{create_asset_storage, create_storage, Storage};

/// Object store for videos and the sink for thumbnails
pub struct StorageSetup {
    pub videos: Arc<dyn Storage>,
    pub thumbnails: ThumbnailSink,
}

pub async fn setup_storage(config: &Config) -> Result<StorageSetup> {
    tracing::info!("Initializing storage abstraction...");
    let videos = create_storage(config)
        .await
        .context("Failed to initialize video storage")?;
    tracing::info!(
        backend = ?videos.backend_type(),
        "Storage abstraction initialized successfully"
    );

    let thumbnails = match config.thumbnail_storage() {
        ThumbnailStorage::Disk => {
            let assets = create_asset_storage(config)
                .await
                .context("Failed to initialize thumbnail assets directory")?;
            tracing::info!(
                assets_root = %assets.base_path().display(),
                assets_base_url = %config.assets_base_url(),
                "Thumbnails stored on disk"
            );
            ThumbnailSink::Disk(Arc::new(assets))
        }
        ThumbnailStorage::DataUrl => {
            tracing::info!("Thumbnails stored inline as data URLs");
            ThumbnailSink::DataUrl
        }
    };

    Ok(StorageSetup { videos, thumbnails })
}
