//! Tubely Processing Library
//!
//! The upload-processing core: content validation, local staging, ffprobe
//! inspection, aspect-ratio classification, faststart remuxing and the
//! pipelines that sequence them into an object-store upload plus a metadata
//! commit.

pub mod pipeline;
pub mod staging;
pub mod uploader;
pub mod validator;
pub mod video;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

// Re-export commonly used types
pub use pipeline::{
    PipelineConfig, PipelineError, PipelineStage, ThumbnailPipeline, ThumbnailSink,
    ThumbnailUpload, VideoUpload, VideoUploadPipeline,
};
pub use staging::{StageError, StagedFile, Stager};
pub use validator::{normalize_mime_type, MediaValidator, ValidationError};
pub use video::{
    classify, parse_probe_output, AspectCategory, FfmpegTool, MediaGeometry, MediaTool,
    ProbeError, RemuxError, RemuxedFile,
};
