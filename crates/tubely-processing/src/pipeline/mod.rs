//! Upload pipelines: validate → authorize → stage → probe → classify → remux
//! → upload → commit for videos, and validate → authorize → read → persist
//! → commit for thumbnails.
//!
//! Each run is one request. Every failure is terminal and reported with the
//! last stage the run reached; nothing is retried.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tubely_core::Config;
use uuid::Uuid;

mod error;
mod thumbnail;
mod video;

pub use error::PipelineError;
pub use thumbnail::{ThumbnailPipeline, ThumbnailSink, ThumbnailUpload};
pub use video::{VideoUpload, VideoUploadPipeline};

/// Progress of a pipeline run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Received,
    Validated,
    Staged,
    Probed,
    Classified,
    Remuxed,
    Uploaded,
    Committed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Received => "received",
            PipelineStage::Validated => "validated",
            PipelineStage::Staged => "staged",
            PipelineStage::Probed => "probed",
            PipelineStage::Classified => "classified",
            PipelineStage::Remuxed => "remuxed",
            PipelineStage::Uploaded => "uploaded",
            PipelineStage::Committed => "committed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record that a run reached `next`.
fn advance(stage: &mut PipelineStage, next: PipelineStage, video_id: Uuid) {
    tracing::debug!(video_id = %video_id, from = %stage, to = %next, "Pipeline stage transition");
    *stage = next;
}

/// Limits and locations shared by both pipelines.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_video_bytes: u64,
    pub max_thumbnail_bytes: u64,
    pub temp_dir: PathBuf,
    pub timeout: Duration,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_video_bytes: config.max_video_size_bytes() as u64,
            max_thumbnail_bytes: config.max_thumbnail_size_bytes() as u64,
            temp_dir: config.temp_dir(),
            timeout: config.pipeline_timeout(),
        }
    }
}
