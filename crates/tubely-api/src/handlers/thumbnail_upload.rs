use crate::auth::AuthUser;
use crate::constants::THUMBNAIL_FIELD;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::{
    declared_file_size, file_part, missing_field, multipart_error, parse_video_id,
};
use axum::{
    extract::{Multipart, Path, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;
use tubely_core::models::Video;
use tubely_processing::ThumbnailUpload;

/// `POST /api/thumbnail_upload/{videoID}`
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Video>, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    tracing::info!(video_id = %video_id, user_id = %user.user_id, "Uploading thumbnail");

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(THUMBNAIL_FIELD) {
            continue;
        }

        let part = file_part(field)?;
        let upload = ThumbnailUpload {
            video_id,
            user_id: user.user_id,
            content_type: part.content_type,
            declared_size: declared_file_size(&headers),
            body: part.reader,
        };

        let video = state.uploads.thumbnail.run(upload).await?;
        return Ok(Json(video));
    }

    Err(missing_field(THUMBNAIL_FIELD).into())
}
