use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempPath;

/// Suffix appended to the input path to name the remuxed output
pub const REMUX_OUTPUT_SUFFIX: &str = ".processing";

#[derive(Debug, thiserror::Error)]
pub enum RemuxError {
    #[error("ffmpeg failed: {message}")]
    ExecutionFailed { message: String, stderr: String },

    #[error("could not stat remuxed output: {0}")]
    Stat(#[source] io::Error),

    #[error("remuxed output is empty")]
    EmptyOutput,

    #[error("ffmpeg timed out after {0:?}")]
    Timeout(Duration),
}

/// Remuxed copy of a staged file. Deleted when dropped.
#[derive(Debug)]
pub struct RemuxedFile {
    path: TempPath,
    size: u64,
}

impl RemuxedFile {
    pub fn new(path: TempPath, size: u64) -> Self {
        Self { path, size }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// `{input}.processing`
pub fn output_path_for(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(REMUX_OUTPUT_SUFFIX);
    PathBuf::from(name)
}

/// Verify the remux post-condition: the output exists and is non-empty.
pub async fn verify_output(path: TempPath) -> Result<RemuxedFile, RemuxError> {
    let metadata = tokio::fs::metadata(&path).await.map_err(RemuxError::Stat)?;
    if metadata.len() == 0 {
        return Err(RemuxError::EmptyOutput);
    }

    Ok(RemuxedFile::new(path, metadata.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_output_path_appends_suffix() {
        let out = output_path_for(Path::new("/tmp/tubely-upload123.mp4"));
        assert_eq!(out, PathBuf::from("/tmp/tubely-upload123.mp4.processing"));
    }

    #[tokio::test]
    async fn test_missing_output_is_stat_error() {
        let dir = tempdir().unwrap();
        let path = TempPath::from_path(dir.path().join("never-written.processing"));
        assert!(matches!(
            verify_output(path).await,
            Err(RemuxError::Stat(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_output_rejected_and_removed() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("empty.processing");
        std::fs::write(&out, b"").unwrap();

        let err = verify_output(TempPath::from_path(&out)).await.unwrap_err();
        assert!(matches!(err, RemuxError::EmptyOutput));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_non_empty_output_accepted() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("ok.processing");
        std::fs::write(&out, b"ftyp").unwrap();

        let remuxed = verify_output(TempPath::from_path(&out)).await.unwrap();
        assert_eq!(remuxed.size(), 4);
        drop(remuxed);
        assert!(!out.exists());
    }
}
