//! Video processing module
//!
//! Geometry inspection, aspect-ratio classification and faststart remuxing,
//! behind the `MediaTool` seam so the pipeline can run against test doubles.

pub mod classifier;
pub mod probe;
pub mod remux;
pub mod tool;

pub use classifier::{classify, AspectCategory};
pub use probe::{parse_probe_output, MediaGeometry, ProbeError};
pub use remux::{RemuxError, RemuxedFile};
pub use tool::{FfmpegTool, MediaTool};
