//! External media tooling (ffprobe / ffmpeg)

use std::io;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tempfile::TempPath;
use tokio::process::Command;
use tubely_core::Config;

use super::probe::{parse_probe_output, MediaGeometry, ProbeError};
use super::remux::{output_path_for, verify_output, RemuxError, RemuxedFile};

/// Inspection and container rewriting of local media files.
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Geometry of the first stream in the file at `path`
    async fn inspect(&self, path: &Path) -> Result<MediaGeometry, ProbeError>;

    /// Rewrite the file at `path` with its index moved to the front, without re-encoding.
    /// The output lives next to the input and is removed when the result is dropped.
    async fn remux(&self, path: &Path) -> Result<RemuxedFile, RemuxError>;
}

/// Validate that a tool path doesn't contain shell metacharacters or dangerous sequences
fn validate_tool_path(path: &str) -> Result<()> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty() || path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(anyhow!("Path contains dangerous characters: {}", path));
    }

    if path.contains("..") {
        return Err(anyhow!("Path contains directory traversal: {}", path));
    }

    Ok(())
}

/// Outcome of a bounded subprocess run
enum RunOutcome {
    Finished(Output),
    TimedOut,
}

/// Run `command` to completion, killing it if it outlives `timeout`.
///
/// The child is also killed if the calling future is dropped, which is what
/// happens when the pipeline deadline fires first.
async fn run_bounded(mut command: Command, timeout: Duration) -> io::Result<RunOutcome> {
    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(output) => output.map(RunOutcome::Finished),
        Err(_) => Ok(RunOutcome::TimedOut),
    }
}

/// ffprobe/ffmpeg-backed `MediaTool`.
#[derive(Debug, Clone)]
pub struct FfmpegTool {
    ffprobe_path: String,
    ffmpeg_path: String,
    probe_timeout: Duration,
    remux_timeout: Duration,
}

impl FfmpegTool {
    pub fn new(
        ffprobe_path: String,
        ffmpeg_path: String,
        probe_timeout: Duration,
        remux_timeout: Duration,
    ) -> Result<Self> {
        validate_tool_path(&ffprobe_path).context("Invalid ffprobe_path")?;
        validate_tool_path(&ffmpeg_path).context("Invalid ffmpeg_path")?;

        Ok(Self {
            ffprobe_path,
            ffmpeg_path,
            probe_timeout,
            remux_timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.ffprobe_path().to_string(),
            config.ffmpeg_path().to_string(),
            config.probe_timeout(),
            config.remux_timeout(),
        )
    }
}

#[async_trait]
impl MediaTool for FfmpegTool {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn inspect(&self, path: &Path) -> Result<MediaGeometry, ProbeError> {
        let start = std::time::Instant::now();

        let mut command = Command::new(&self.ffprobe_path);
        command
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path);

        let output = match run_bounded(command, self.probe_timeout).await {
            Ok(RunOutcome::Finished(output)) => output,
            Ok(RunOutcome::TimedOut) => return Err(ProbeError::Timeout(self.probe_timeout)),
            Err(e) => {
                return Err(ProbeError::ExecutionFailed {
                    message: format!("failed to execute ffprobe: {}", e),
                    stderr: String::new(),
                })
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::warn!(status = %output.status, stderr = %stderr, "ffprobe exited with failure");
            return Err(ProbeError::ExecutionFailed {
                message: format!("ffprobe exited with {}", output.status),
                stderr,
            });
        }

        let geometry = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            width = geometry.width,
            height = geometry.height,
            "Video probe completed"
        );

        Ok(geometry)
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "remux"
    ))]
    async fn remux(&self, path: &Path) -> Result<RemuxedFile, RemuxError> {
        let start = std::time::Instant::now();

        // Registered before the child starts so partial output is removed on every exit path
        let output_path = TempPath::from_path(output_path_for(path));

        let mut command = Command::new(&self.ffmpeg_path);
        command
            .arg("-i")
            .arg(path)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(&*output_path);

        let output = match run_bounded(command, self.remux_timeout).await {
            Ok(RunOutcome::Finished(output)) => output,
            Ok(RunOutcome::TimedOut) => return Err(RemuxError::Timeout(self.remux_timeout)),
            Err(e) => {
                return Err(RemuxError::ExecutionFailed {
                    message: format!("failed to execute ffmpeg: {}", e),
                    stderr: String::new(),
                })
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::warn!(status = %output.status, stderr = %stderr, "ffmpeg exited with failure");
            return Err(RemuxError::ExecutionFailed {
                message: format!("ffmpeg exited with {}", output.status),
                stderr,
            });
        }

        let remuxed = verify_output(output_path).await?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            size_bytes = remuxed.size(),
            "Faststart remux completed"
        );

        Ok(remuxed)
    }
}
