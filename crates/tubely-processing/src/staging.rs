//! Local staging of incoming upload bodies.
//!
//! A `StagedFile` owns a uniquely named temporary file. The file is removed
//! when the handle is dropped, whatever the outcome of the request (success,
//! error, timeout or a panic unwinding through the pipeline).

use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

const STAGED_FILE_PREFIX: &str = "tubely-upload";

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("failed to create staging file: {0}")]
    Create(#[source] io::Error),

    #[error("failed to write staging file: {0}")]
    Write(#[source] io::Error),

    #[error("failed to rewind staging file: {0}")]
    Seek(#[source] io::Error),

    #[error("upload exceeds the {max} byte limit")]
    TooLarge { max: u64 },
}

/// Temporary file holding one upload, rewound to the start.
#[derive(Debug)]
pub struct StagedFile {
    file: File,
    path: TempPath,
    size: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes written while staging
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }
}

/// Writes upload bodies to scoped temporary files.
#[derive(Debug, Clone)]
pub struct Stager {
    dir: PathBuf,
    max_bytes: u64,
}

impl Stager {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    /// Copy `reader` to a new temporary file named `tubely-upload*.{extension}`.
    ///
    /// The file is registered for removal before the first write, so a failed
    /// copy never leaves it behind. Reading stops one byte past the cap.
    #[tracing::instrument(skip(self, reader), fields(staging.dir = %self.dir.display()))]
    pub async fn stage<R>(&self, reader: R, extension: &str) -> Result<StagedFile, StageError>
    where
        R: AsyncRead + Unpin,
    {
        let suffix = format!(".{}", extension);
        let named = tempfile::Builder::new()
            .prefix(STAGED_FILE_PREFIX)
            .suffix(&suffix)
            .tempfile_in(&self.dir)
            .map_err(StageError::Create)?;

        let (std_file, path) = named.into_parts();
        let mut file = File::from_std(std_file);

        let mut limited = reader.take(self.max_bytes + 1);
        let size = tokio::io::copy(&mut limited, &mut file)
            .await
            .map_err(StageError::Write)?;

        if size > self.max_bytes {
            return Err(StageError::TooLarge {
                max: self.max_bytes,
            });
        }

        file.flush().await.map_err(StageError::Write)?;
        file.seek(SeekFrom::Start(0))
            .await
            .map_err(StageError::Seek)?;

        tracing::debug!(
            path = %path.display(),
            size_bytes = size,
            "Upload staged"
        );

        Ok(StagedFile { file, path, size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tempfile::tempdir;
    use tokio::io::ReadBuf;

    /// Yields some bytes, then fails.
    struct BrokenReader {
        sent: bool,
    }

    impl AsyncRead for BrokenReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if self.sent {
                return Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "client went away",
                )));
            }
            self.sent = true;
            buf.put_slice(b"partial");
            Poll::Ready(Ok(()))
        }
    }

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_stage_writes_and_rewinds() {
        let dir = tempdir().unwrap();
        let stager = Stager::new(dir.path(), 1024);

        let mut staged = stager.stage(&b"hello video"[..], "mp4").await.unwrap();
        assert_eq!(staged.size(), 11);

        let name = staged.path().file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.starts_with("tubely-upload"));
        assert!(name.ends_with(".mp4"));

        let mut contents = String::new();
        staged.file_mut().read_to_string(&mut contents).await.unwrap();
        assert_eq!(contents, "hello video");
    }

    #[tokio::test]
    async fn test_staged_file_removed_on_drop() {
        let dir = tempdir().unwrap();
        let stager = Stager::new(dir.path(), 1024);

        let staged = stager.stage(&b"bytes"[..], "mp4").await.unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected_and_cleaned() {
        let dir = tempdir().unwrap();
        let stager = Stager::new(dir.path(), 4);

        let err = stager.stage(&b"12345"[..], "mp4").await.unwrap_err();
        assert!(matches!(err, StageError::TooLarge { max: 4 }));
        assert_eq!(entries(dir.path()), 0);

        assert!(stager.stage(&b"1234"[..], "mp4").await.is_ok());
    }

    #[tokio::test]
    async fn test_write_failure_leaves_nothing_behind() {
        let dir = tempdir().unwrap();
        let stager = Stager::new(dir.path(), 1024);

        let err = stager
            .stage(BrokenReader { sent: false }, "mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::Write(_)));
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_missing_directory_is_create_error() {
        let dir = tempdir().unwrap();
        let stager = Stager::new(dir.path().join("missing"), 1024);

        let err = stager.stage(&b"x"[..], "mp4").await.unwrap_err();
        assert!(matches!(err, StageError::Create(_)));
    }
}
