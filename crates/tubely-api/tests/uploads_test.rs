//! Upload API integration tests.
//!
//! Run with: `cargo test -p tubely-api --test uploads_test`

mod helpers;

use axum::http::StatusCode;
use helpers::auth::bearer;
use helpers::fixtures::{create_fake_mp4, create_minimal_png, file_form};
use helpers::{setup_default_app, setup_test_app};
use tubely_core::models::Video;
use tubely_core::ThumbnailStorage;
use tubely_processing::test_helpers::StaticMediaTool;
use uuid::Uuid;

fn video_path(id: impl std::fmt::Display) -> String {
    format!("/api/video_upload/{}", id)
}

fn thumbnail_path(id: impl std::fmt::Display) -> String {
    format!("/api/thumbnail_upload/{}", id)
}

#[tokio::test]
async fn test_health() {
    let app = setup_default_app().await;

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["thumbnails"], "data_url");
}

#[tokio::test]
async fn test_upload_without_token_is_unauthorized() {
    let app = setup_default_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&video_path(video.id))
        .multipart(file_form("video", "boots.mp4", "video/mp4", create_fake_mp4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(app.storage.put_count(), 0);
}

#[tokio::test]
async fn test_upload_with_invalid_token_is_unauthorized() {
    let app = setup_default_app().await;
    let video = app.seed_video(Uuid::new_v4()).await;

    let response = app
        .client()
        .post(&video_path(video.id))
        .add_header("Authorization", "Bearer not-a-jwt")
        .multipart(file_form("video", "boots.mp4", "video/mp4", create_fake_mp4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_video_id_is_bad_request() {
    let app = setup_default_app().await;

    let response = app
        .client()
        .post(&video_path("not-a-uuid"))
        .add_header("Authorization", bearer(Uuid::new_v4()))
        .multipart(file_form("video", "boots.mp4", "video/mp4", create_fake_mp4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_unknown_video_is_not_found() {
    let app = setup_default_app().await;

    let response = app
        .client()
        .post(&video_path(Uuid::new_v4()))
        .add_header("Authorization", bearer(Uuid::new_v4()))
        .multipart(file_form("video", "boots.mp4", "video/mp4", create_fake_mp4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(app.storage.put_count(), 0);
}

#[tokio::test]
async fn test_landscape_video_upload() {
    let app = setup_default_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;
    let data = create_fake_mp4();

    let response = app
        .client()
        .post(&video_path(video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("video", "boots.mp4", "video/mp4", data.clone()))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let returned: Video = response.json();
    let url = returned.video_url.clone().expect("video_url set");
    assert!(url.contains("/landscape/"), "unexpected url {}", url);
    assert!(url.ends_with(".mp4"));

    let puts = app.storage.puts();
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].content_type, "video/mp4");
    assert!(puts[0].key.starts_with("landscape/"));
    assert_eq!(puts[0].data, data);

    assert_eq!(app.stored_video(video.id).await.video_url, Some(url));
    assert!(app.leftover_temp_files().is_empty());
}

#[tokio::test]
async fn test_portrait_video_upload() {
    let app = setup_test_app(StaticMediaTool::new(1080, 1920), ThumbnailStorage::DataUrl).await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&video_path(video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("video", "tall.mp4", "video/mp4", create_fake_mp4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let puts = app.storage.puts();
    assert_eq!(puts.len(), 1);
    assert!(puts[0].key.starts_with("portrait/"));
}

#[tokio::test]
async fn test_video_upload_by_non_owner() {
    let app = setup_default_app().await;
    let video = app.seed_video(Uuid::new_v4()).await;

    let response = app
        .client()
        .post(&video_path(video.id))
        .add_header("Authorization", bearer(Uuid::new_v4()))
        .multipart(file_form("video", "boots.mp4", "video/mp4", create_fake_mp4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.storage.put_count(), 0);
    assert_eq!(app.media.calls(), 0);
    assert_eq!(app.stored_video(video.id).await.video_url, None);
}

#[tokio::test]
async fn test_video_upload_rejects_non_mp4() {
    let app = setup_default_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&video_path(video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("video", "clip.mov", "video/quicktime", create_fake_mp4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(app.storage.put_count(), 0);
    assert_eq!(app.media.calls(), 0);
}

#[tokio::test]
async fn test_video_upload_missing_field() {
    let app = setup_default_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&video_path(video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("file", "boots.mp4", "video/mp4", create_fake_mp4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(app.storage.put_count(), 0);
}

#[tokio::test]
async fn test_video_upload_over_limit() {
    let app = setup_default_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;
    // Configured cap is 1 MiB
    let data = vec![0u8; 1024 * 1024 + 1];

    let response = app
        .client()
        .post(&video_path(video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("video", "big.mp4", "video/mp4", data))
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.storage.put_count(), 0);
    assert!(app.leftover_temp_files().is_empty());
}

#[tokio::test]
async fn test_video_upload_exactly_at_limit() {
    let app = setup_default_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;
    let data = vec![0u8; 1024 * 1024];

    let response = app
        .client()
        .post(&video_path(video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("video", "full.mp4", "video/mp4", data.clone()))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let puts = app.storage.puts();
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].data.len(), data.len());
    assert!(app.leftover_temp_files().is_empty());
}

#[tokio::test]
async fn test_thumbnail_exactly_at_limit() {
    let app = setup_default_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;
    // Configured thumbnail cap is 64 KiB
    let mut png = create_minimal_png();
    png.resize(64 * 1024, 0);

    let response = app
        .client()
        .post(&thumbnail_path(video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("thumbnail", "big.png", "image/png", png))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let mut over = create_minimal_png();
    over.resize(64 * 1024 + 1, 0);
    let response = app
        .client()
        .post(&thumbnail_path(video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("thumbnail", "bigger.png", "image/png", over))
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_video_without_streams_fails_processing() {
    let app = setup_test_app(StaticMediaTool::without_streams(), ThumbnailStorage::DataUrl).await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&video_path(video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("video", "boots.mp4", "video/mp4", create_fake_mp4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "MEDIA_PROCESSING_ERROR");
    assert_eq!(app.storage.put_count(), 0);
    assert!(app.leftover_temp_files().is_empty());
}

#[tokio::test]
async fn test_gif_thumbnail_is_unsupported() {
    let app = setup_default_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&thumbnail_path(video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("thumbnail", "anim.gif", "image/gif", b"GIF89a".to_vec()))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(app.stored_video(video.id).await.thumbnail_url, None);
    assert_eq!(app.storage.put_count(), 0);
}

#[tokio::test]
async fn test_thumbnail_data_url() {
    let app = setup_default_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&thumbnail_path(video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("thumbnail", "thumb.png", "image/png", create_minimal_png()))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let returned: Video = response.json();
    let url = returned.thumbnail_url.expect("thumbnail_url set");
    assert!(url.starts_with("data:image/png;base64,"));
    assert_eq!(
        app.stored_video(video.id).await.thumbnail_url,
        Some(url)
    );
}

#[tokio::test]
async fn test_thumbnail_on_disk_is_served() {
    let app = setup_test_app(StaticMediaTool::new(1920, 1080), ThumbnailStorage::Disk).await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;
    let png = create_minimal_png();

    let response = app
        .client()
        .post(&thumbnail_path(video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("thumbnail", "thumb.png", "image/png", png.clone()))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let returned: Video = response.json();
    let url = returned.thumbnail_url.expect("thumbnail_url set");
    let file_name = url
        .strip_prefix(&format!("{}/", helpers::ASSETS_BASE_URL))
        .expect("url under the assets base url");
    assert!(file_name.ends_with(".png"));
    assert!(app.assets_root.join(file_name).is_file());

    let served = app.client().get(&format!("/assets/{}", file_name)).await;
    assert_eq!(served.status_code(), StatusCode::OK);
    assert_eq!(served.as_bytes().as_ref(), png.as_slice());
}

#[tokio::test]
async fn test_thumbnail_by_non_owner() {
    let app = setup_default_app().await;
    let video = app.seed_video(Uuid::new_v4()).await;

    let response = app
        .client()
        .post(&thumbnail_path(video.id))
        .add_header("Authorization", bearer(Uuid::new_v4()))
        .multipart(file_form("thumbnail", "thumb.png", "image/png", create_minimal_png()))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.stored_video(video.id).await.thumbnail_url, None);
}
