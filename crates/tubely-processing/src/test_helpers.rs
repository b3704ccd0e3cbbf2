//! Test helpers for pipeline tests
//!
//! `StaticMediaTool` stands in for ffprobe/ffmpeg; storage and metadata store
//! doubles are re-exported so downstream tests need a single import.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempPath;

pub use tubely_db::InMemoryVideoRepository;
pub use tubely_storage::test_helpers::{MockStorage, RecordedPut};

use crate::video::remux::{output_path_for, verify_output};
use crate::video::{MediaGeometry, MediaTool, ProbeError, RemuxError, RemuxedFile};

/// What `StaticMediaTool::remux` does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemuxBehavior {
    /// Copy the input to `{input}.processing`
    Copy,
    /// Write an empty output file
    Empty,
    /// Fail as if ffmpeg exited non-zero
    Fail,
}

/// `MediaTool` with canned results.
///
/// Every path it is handed is recorded, so tests can check that temporary
/// files are gone once a run finishes.
#[derive(Clone)]
pub struct StaticMediaTool {
    geometry: Option<MediaGeometry>,
    remux: RemuxBehavior,
    delay: Option<Duration>,
    seen_paths: Arc<Mutex<Vec<PathBuf>>>,
    calls: Arc<AtomicUsize>,
}

impl StaticMediaTool {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            geometry: Some(MediaGeometry { width, height }),
            remux: RemuxBehavior::Copy,
            delay: None,
            seen_paths: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Probe reports a file without streams
    pub fn without_streams() -> Self {
        Self {
            geometry: None,
            ..Self::new(0, 0)
        }
    }

    pub fn with_remux(mut self, behavior: RemuxBehavior) -> Self {
        self.remux = behavior;
        self
    }

    /// Sleep this long inside `inspect`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every staged or remuxed path the tool touched
    pub fn seen_paths(&self) -> Vec<PathBuf> {
        self.seen_paths.lock().unwrap().clone()
    }

    /// Number of inspect/remux invocations
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self, path: &Path) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_paths.lock().unwrap().push(path.to_path_buf());
    }
}

#[async_trait]
impl MediaTool for StaticMediaTool {
    async fn inspect(&self, path: &Path) -> Result<MediaGeometry, ProbeError> {
        self.record(path);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.geometry.ok_or(ProbeError::NoStreams)
    }

    async fn remux(&self, path: &Path) -> Result<RemuxedFile, RemuxError> {
        self.record(path);
        let output = TempPath::from_path(output_path_for(path));
        self.seen_paths.lock().unwrap().push(output.to_path_buf());

        match self.remux {
            RemuxBehavior::Copy => {
                tokio::fs::copy(path, &output)
                    .await
                    .map_err(RemuxError::Stat)?;
            }
            RemuxBehavior::Empty => {
                tokio::fs::write(&output, b"").await.map_err(RemuxError::Stat)?;
            }
            RemuxBehavior::Fail => {
                return Err(RemuxError::ExecutionFailed {
                    message: "ffmpeg exited with exit status: 1".to_string(),
                    stderr: "moov atom not found".to_string(),
                })
            }
        }

        verify_output(output).await
    }
}
