use std::sync::Arc;

use tokio::io::AsyncRead;
use tubely_core::models::Video;
use tubely_db::VideoRepository;
use tubely_storage::keys::extension_for;
use tubely_storage::{AssetKey, Storage};
use uuid::Uuid;

use super::{advance, PipelineConfig, PipelineError, PipelineStage};
use crate::staging::Stager;
use crate::uploader::upload_file;
use crate::validator::MediaValidator;
use crate::video::{classify, MediaTool};

/// One video upload request.
pub struct VideoUpload<R> {
    pub video_id: Uuid,
    /// Authenticated requester
    pub user_id: Uuid,
    /// Content type declared for the file part
    pub content_type: String,
    /// Size announced by the client, if any
    pub declared_size: Option<u64>,
    pub body: R,
}

/// Sequences a video upload from the raw request body to a committed `video_url`.
#[derive(Clone)]
pub struct VideoUploadPipeline {
    media: Arc<dyn MediaTool>,
    storage: Arc<dyn Storage>,
    videos: Arc<dyn VideoRepository>,
    validator: MediaValidator,
    stager: Stager,
    config: PipelineConfig,
}

impl VideoUploadPipeline {
    pub fn new(
        media: Arc<dyn MediaTool>,
        storage: Arc<dyn Storage>,
        videos: Arc<dyn VideoRepository>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            validator: MediaValidator::video(config.max_video_bytes),
            stager: Stager::new(config.temp_dir.clone(), config.max_video_bytes),
            media,
            storage,
            videos,
            config,
        }
    }

    /// Run the pipeline to completion and return the updated video.
    ///
    /// The whole run is bounded by the configured timeout; on expiry the
    /// error names the last stage reached. Temporary files and child
    /// processes are released on every exit path.
    #[tracing::instrument(skip(self, upload), fields(video_id = %upload.video_id, user_id = %upload.user_id))]
    pub async fn run<R>(&self, upload: VideoUpload<R>) -> Result<Video, PipelineError>
    where
        R: AsyncRead + Send + Unpin,
    {
        let mut stage = PipelineStage::Received;
        let start = std::time::Instant::now();

        let outcome = tokio::time::timeout(self.config.timeout, self.execute(upload, &mut stage)).await;

        match outcome {
            Ok(Ok(video)) => {
                tracing::info!(
                    duration_ms = start.elapsed().as_millis(),
                    video_url = video.video_url.as_deref().unwrap_or_default(),
                    "Video upload committed"
                );
                Ok(video)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                tracing::warn!(stage = %stage, timeout = ?self.config.timeout, "Video pipeline timed out");
                Err(PipelineError::Timeout {
                    stage,
                    after: self.config.timeout,
                })
            }
        }
    }

    async fn execute<R>(
        &self,
        upload: VideoUpload<R>,
        stage: &mut PipelineStage,
    ) -> Result<Video, PipelineError>
    where
        R: AsyncRead + Send + Unpin,
    {
        let video_id = upload.video_id;

        let content_type = self
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

        let extension = extension_for(&content_type);
        let staged = self
            .stager
            .stage(upload.body, &extension)
            .await
            .map_err(PipelineError::from_stage)?;
        self.validator
            .validate_file_size(staged.size())
            .map_err(PipelineError::from_validation)?;
        advance(stage, PipelineStage::Staged, video_id);

        let geometry = self
            .media
            .inspect(staged.path())
            .await
            .map_err(PipelineError::Probe)?;
        advance(stage, PipelineStage::Probed, video_id);

        let category = classify(geometry.width, geometry.height);
        tracing::debug!(
            width = geometry.width,
            height = geometry.height,
            category = %category,
            "Video classified"
        );
        advance(stage, PipelineStage::Classified, video_id);

        let remuxed = self
            .media
            .remux(staged.path())
            .await
            .map_err(PipelineError::Remux)?;
        drop(staged);
        advance(stage, PipelineStage::Remuxed, video_id);

        let key = AssetKey::generate(category.prefix(), &content_type);
        let url = upload_file(self.storage.as_ref(), &key, remuxed.path(), &content_type)
            .await
            .map_err(PipelineError::Upload)?;
        drop(remuxed);
        advance(stage, PipelineStage::Uploaded, video_id);

        video.video_url = Some(url);
        if let Err(source) = self.videos.update_video(&video).await {
            tracing::warn!(
                video_id = %video_id,
                key = %key,
                error = %source,
                "Video record not updated; uploaded object is orphaned"
            );
            return Err(PipelineError::Commit {
                key: key.to_string(),
                source,
            });
        }
        advance(stage, PipelineStage::Committed, video_id);

        Ok(video)
    }
}

/// Fetch the target video and check that `user_id` owns it.
pub(super) async fn authorize(
    videos: &dyn VideoRepository,
    video_id: Uuid,
    user_id: Uuid,
) -> Result<Video, PipelineError> {
    let video = videos
        .get_video(video_id)
        .await
        .map_err(PipelineError::Lookup)?
        .ok_or(PipelineError::NotFound(video_id))?;

    if !video.is_owned_by(user_id) {
        tracing::debug!(video_id = %video_id, user_id = %user_id, "Upload rejected: not the owner");
        return Err(PipelineError::Unauthorized(video_id));
    }

    Ok(video)
}
