use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tokio::io::{AsyncRead, AsyncReadExt};
use tubely_core::models::Video;
use tubely_core::ThumbnailStorage;
use tubely_db::VideoRepository;
use tubely_storage::{AssetKey, Storage};
use uuid::Uuid;

use super::video::authorize;
use super::{advance, PipelineConfig, PipelineError, PipelineStage};
use crate::staging::StageError;
use crate::validator::MediaValidator;

/// One thumbnail upload request.
pub struct ThumbnailUpload<R> {
    pub video_id: Uuid,
    pub user_id: Uuid,
    pub content_type: String,
    pub declared_size: Option<u64>,
    pub body: R,
}

/// Where thumbnail bytes end up.
#[derive(Clone)]
pub enum ThumbnailSink {
    /// Written as `{file_id}.{ext}` to an asset store whose URLs are served publicly
    Disk(Arc<dyn Storage>),
    /// Embedded in the record as a `data:` URL
    DataUrl,
}

impl ThumbnailSink {
    pub fn mode(&self) -> ThumbnailStorage {
        match self {
            ThumbnailSink::Disk(_) => ThumbnailStorage::Disk,
            ThumbnailSink::DataUrl => ThumbnailStorage::DataUrl,
        }
    }
}

/// Validates, stores and records a video thumbnail.
#[derive(Clone)]
pub struct ThumbnailPipeline {
    sink: ThumbnailSink,
    videos: Arc<dyn VideoRepository>,
    validator: MediaValidator,
    config: PipelineConfig,
}

impl ThumbnailPipeline {
    pub fn new(
        sink: ThumbnailSink,
        videos: Arc<dyn VideoRepository>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            validator: MediaValidator::thumbnail(config.max_thumbnail_bytes),
            sink,
            videos,
            config,
        }
    }

    #[tracing::instrument(skip(self, upload), fields(video_id = %upload.video_id, user_id = %upload.user_id, thumbnail.mode = %self.sink.mode()))]
    pub async fn run<R>(&self, upload: ThumbnailUpload<R>) -> Result<Video, PipelineError>
    where
        R: AsyncRead + Send + Unpin,
    {
        let mut stage = PipelineStage::Received;

        let outcome = tokio::time::timeout(self.config.timeout, self.execute(upload, &mut stage)).await;

        match outcome {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(stage = %stage, "Thumbnail pipeline timed out");
                Err(PipelineError::Timeout {
                    stage,
                    after: self.config.timeout,
                })
            }
        }
    }

    async fn execute<R>(
        &self,
        upload: ThumbnailUpload<R>,
        stage: &mut PipelineStage,
    ) -> Result<Video, PipelineError>
    where
        R: AsyncRead + Send + Unpin,
    {
        let video_id = upload.video_id;

        let media_type = self
            .validator
            .validate_content_type(&upload.content_type)
            .map_err(PipelineError::from_validation)?;
        if let Some(declared) = upload.declared_size {
            self.validator
                .validate_declared_size(declared)
                .map_err(PipelineError::from_validation)?;
        }
        advance(stage, PipelineStage::Validated, video_id);

        let mut video = authorize(self.videos.as_ref(), video_id, upload.user_id).await?;

        let data = self.read_bounded(upload.body).await?;
        advance(stage, PipelineStage::Staged, video_id);

        let url = match &self.sink {
            ThumbnailSink::Disk(assets) => {
                let key = AssetKey::unprefixed(&media_type);
                assets
                    .upload_with_key(key.as_str(), data, &media_type)
                    .await
                    .map_err(PipelineError::Persist)?
            }
            ThumbnailSink::DataUrl => data_url(&media_type, &data),
        };
        advance(stage, PipelineStage::Uploaded, video_id);

        video.thumbnail_url = Some(url);
        self.videos
            .update_video(&video)
            .await
            .map_err(|source| PipelineError::Commit {
                key: format!("thumbnail:{}", video_id),
                source,
            })?;
        advance(stage, PipelineStage::Committed, video_id);

        tracing::info!("Thumbnail committed");
        Ok(video)
    }

    /// Read the whole body, failing once it passes the thumbnail cap.
    async fn read_bounded<R>(&self, body: R) -> Result<Vec<u8>, PipelineError>
    where
        R: AsyncRead + Send + Unpin,
    {
        let max = self.validator.max_file_size();
        let mut data = Vec::new();
        body.take(max + 1)
            .read_to_end(&mut data)
            .await
            .map_err(|e| PipelineError::Stage(StageError::Write(e)))?;

        self.validator
            .validate_file_size(data.len() as u64)
            .map_err(PipelineError::from_validation)?;

        Ok(data)
    }
}

/// `data:{media_type};base64,{payload}`
pub fn data_url(media_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_format() {
        assert_eq!(data_url("image/png", b"abc"), "data:image/png;base64,YWJj");
    }
}
