//! Test helpers: build AppState and router for integration tests.
//!
//! The app runs against in-memory doubles: `MockStorage` for the object store,
//! `InMemoryVideoRepository` for video records and `StaticMediaTool` in place
//! of ffprobe/ffmpeg. Run with `cargo test -p tubely-api`.

#![allow(dead_code)]

pub mod auth;
pub mod fixtures;

use axum_test::TestServer;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::setup::{routes, services, storage::StorageSetup};
use tubely_core::models::Video;
use tubely_core::{
    BaseConfig, Config, StorageBackend, ThumbnailStorage, TubelyConfig,
};
use tubely_db::VideoRepository;
use tubely_processing::test_helpers::{InMemoryVideoRepository, MockStorage, StaticMediaTool};
use tubely_processing::ThumbnailSink;
use tubely_storage::LocalStorage;
use uuid::Uuid;

pub const ASSETS_BASE_URL: &str = "http://localhost:8091/assets";

/// Test application: server plus handles on every double it was built with.
pub struct TestApp {
    pub server: TestServer,
    pub storage: MockStorage,
    pub videos: InMemoryVideoRepository,
    pub media: StaticMediaTool,
    pub assets_root: PathBuf,
    pub temp_dir: PathBuf,
    pub _scratch: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Insert a video owned by `owner` and return it.
    pub async fn seed_video(&self, owner: Uuid) -> Video {
        let video = Video::new(owner, "Boots", "A pair of boots on a table");
        self.videos.insert(video.clone()).await;
        video
    }

    pub async fn stored_video(&self, id: Uuid) -> Video {
        self.videos
            .get_video(id)
            .await
            .expect("lookup failed")
            .expect("video missing")
    }

    /// Files left in the staging directory
    pub fn leftover_temp_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(&self.temp_dir)
            .expect("read temp dir")
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect()
    }
}

fn test_config(scratch: &TempDir, thumbnail_storage: ThumbnailStorage) -> Config {
    let assets_root = scratch.path().join("assets");
    let temp_dir = scratch.path().join("tmp");
    std::fs::create_dir_all(&assets_root).expect("create assets root");
    std::fs::create_dir_all(&temp_dir).expect("create temp dir");

    Config(Box::new(TubelyConfig {
        base: BaseConfig {
            server_port: 8091,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            jwt_secret: auth::TEST_JWT_SECRET.to_string(),
            log_format: "compact".to_string(),
            database_url: None,
            db_max_connections: 1,
            db_timeout_seconds: 1,
        },
        storage_backend: StorageBackend::S3,
        s3_bucket: Some("tubely-test".to_string()),
        s3_region: Some("us-east-1".to_string()),
        s3_endpoint: None,
        public_base_url: None,
        local_storage_path: None,
        local_storage_base_url: None,
        thumbnail_storage,
        assets_root: assets_root.to_string_lossy().into_owned(),
        assets_base_url: ASSETS_BASE_URL.to_string(),
        max_video_size_bytes: 1024 * 1024,
        max_thumbnail_size_bytes: 64 * 1024,
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        temp_dir: Some(temp_dir.to_string_lossy().into_owned()),
        probe_timeout_secs: 5,
        remux_timeout_secs: 5,
        pipeline_timeout_secs: 30,
    }))
}

/// Setup a test app whose media tool reports the given geometry.
pub async fn setup_test_app(
    media: StaticMediaTool,
    thumbnail_storage: ThumbnailStorage,
) -> TestApp {
    let scratch = TempDir::new().expect("create scratch dir");
    let config = test_config(&scratch, thumbnail_storage);

    let storage = MockStorage::new();
    let videos = InMemoryVideoRepository::new();

    let thumbnails = match thumbnail_storage {
        ThumbnailStorage::Disk => ThumbnailSink::Disk(Arc::new(
            LocalStorage::new(config.assets_root(), config.assets_base_url().to_string())
                .await
                .expect("create asset storage"),
        )),
        ThumbnailStorage::DataUrl => ThumbnailSink::DataUrl,
    };

    let state = services::build_state(
        &config,
        None,
        Arc::new(media.clone()),
        Arc::new(videos.clone()),
        StorageSetup {
            videos: Arc::new(storage.clone()),
            thumbnails,
        },
    );
    let router = routes::setup_routes(&config, state).expect("build router");

    TestApp {
        server: TestServer::new(router).expect("start test server"),
        storage,
        videos,
        media,
        assets_root: PathBuf::from(config.assets_root()),
        temp_dir: config.temp_dir(),
        _scratch: scratch,
    }
}

/// Landscape media, inline thumbnails
pub async fn setup_default_app() -> TestApp {
    setup_test_app(StaticMediaTool::new(1920, 1080), ThumbnailStorage::DataUrl).await
}
