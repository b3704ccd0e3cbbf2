use std::time::Duration;

use tubely_core::AppError;
use tubely_storage::StorageError;
use uuid::Uuid;

use super::PipelineStage;
use crate::staging::StageError;
use crate::validator::ValidationError;
use crate::video::{ProbeError, RemuxError};

/// Terminal failure of an upload pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("upload exceeds the {max} byte limit")]
    TooLarge { max: u64 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("video {0} not found")]
    NotFound(Uuid),

    #[error("not authorized to modify video {0}")]
    Unauthorized(Uuid),

    #[error("staging failed: {0}")]
    Stage(#[source] StageError),

    #[error("probe failed: {0}")]
    Probe(#[source] ProbeError),

    #[error("remux failed: {0}")]
    Remux(#[source] RemuxError),

    #[error("upload failed: {0}")]
    Upload(#[source] StorageError),

    #[error("failed to persist thumbnail: {0}")]
    Persist(#[source] StorageError),

    #[error("video lookup failed: {0}")]
    Lookup(#[source] AppError),

    #[error("failed to record {key} on the video: {source}")]
    Commit {
        key: String,
        #[source]
        source: AppError,
    },

    #[error("pipeline timed out after {after:?} (last stage: {stage})")]
    Timeout {
        stage: PipelineStage,
        after: Duration,
    },
}

impl PipelineError {
    /// Last stage the run completed before failing.
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::UnsupportedMediaType(_)
            | PipelineError::TooLarge { .. }
            | PipelineError::InvalidInput(_) => PipelineStage::Received,
            PipelineError::NotFound(_)
            | PipelineError::Unauthorized(_)
            | PipelineError::Lookup(_)
            | PipelineError::Stage(_) => PipelineStage::Validated,
            PipelineError::Probe(_) => PipelineStage::Staged,
            PipelineError::Remux(_) => PipelineStage::Classified,
            PipelineError::Upload(_) => PipelineStage::Remuxed,
            PipelineError::Persist(_) => PipelineStage::Staged,
            PipelineError::Commit { .. } => PipelineStage::Uploaded,
            PipelineError::Timeout { stage, .. } => *stage,
        }
    }

    /// Map a validation failure from the request's declared metadata.
    pub(crate) fn from_validation(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidContentType { content_type, .. } => {
                PipelineError::UnsupportedMediaType(content_type)
            }
            ValidationError::FileTooLarge { max, .. } => PipelineError::TooLarge { max },
            ValidationError::EmptyFile => PipelineError::InvalidInput("file is empty".to_string()),
        }
    }

    /// Map a staging failure; an oversized body is a validation failure, not an I/O one.
    pub(crate) fn from_stage(err: StageError) -> Self {
        match err {
            StageError::TooLarge { max } => PipelineError::TooLarge { max },
            other => PipelineError::Stage(other),
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let stage = err.stage();
        match err {
            PipelineError::UnsupportedMediaType(content_type) => AppError::UnsupportedMediaType(
                format!("Unsupported content type: {}", content_type),
            ),
            PipelineError::TooLarge { max } => {
                AppError::PayloadTooLarge(format!("Upload exceeds the {} byte limit", max))
            }
            PipelineError::InvalidInput(msg) => AppError::InvalidInput(msg),
            PipelineError::NotFound(id) => AppError::NotFound(format!("Video {} not found", id)),
            PipelineError::Unauthorized(_) => {
                AppError::Unauthorized("You are not the owner of this video".to_string())
            }
            PipelineError::Stage(e) => {
                AppError::Internal(format!("{} (after stage: {})", e, stage))
            }
            PipelineError::Probe(ProbeError::ExecutionFailed { message, stderr }) => {
                AppError::MediaProcessing(format!("ffprobe: {}; stderr: {}", message, stderr))
            }
            PipelineError::Remux(RemuxError::ExecutionFailed { message, stderr }) => {
                AppError::MediaProcessing(format!("ffmpeg: {}; stderr: {}", message, stderr))
            }
            PipelineError::Probe(ProbeError::Timeout(after))
            | PipelineError::Remux(RemuxError::Timeout(after)) => AppError::Timeout(format!(
                "media tool exceeded {:?} (after stage: {})",
                after, stage
            )),
            PipelineError::Probe(e) => AppError::MediaProcessing(e.to_string()),
            PipelineError::Remux(e) => AppError::MediaProcessing(e.to_string()),
            PipelineError::Upload(e) | PipelineError::Persist(e) => {
                AppError::Storage(e.to_string())
            }
            PipelineError::Lookup(source) => source,
            PipelineError::Commit { source, .. } => source,
            PipelineError::Timeout { stage, after } => AppError::Timeout(format!(
                "pipeline exceeded {:?} (last stage: {})",
                after, stage
            )),
        }
    }
}
