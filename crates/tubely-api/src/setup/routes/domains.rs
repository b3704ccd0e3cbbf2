//! Upload route group

use crate::constants::API_BASE;
use crate::handlers;
use crate::state::AppState;
use axum::routing::post;
use axum::Router;
use std::sync::Arc;

pub fn upload_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/video_upload/{{video_id}}", API_BASE),
            post(handlers::video_upload::upload_video),
        )
        .route(
            &format!("{}/thumbnail_upload/{{video_id}}", API_BASE),
            post(handlers::thumbnail_upload::upload_thumbnail),
        )
}
