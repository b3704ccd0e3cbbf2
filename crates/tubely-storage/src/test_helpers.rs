//! Mock Storage implementation for testing

use crate::{Storage, StorageBackend, StorageError, StorageResult};
use async_trait::async_trait;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncRead, AsyncReadExt};

const MOCK_BASE_URL: &str = "https://mock-storage.test";

/// One completed put, kept for test assertions
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPut {
    pub key: String,
    pub content_type: String,
    pub data: Vec<u8>,
    /// Length announced by the caller, if any
    pub content_length: Option<u64>,
}

/// Mock storage implementation that stores files in memory
///
/// Clones share the recorded puts, so a test can hand one clone to the code
/// under test and inspect the other.
#[derive(Clone, Default)]
pub struct MockStorage {
    puts: Arc<Mutex<Vec<RecordedPut>>>,
    fail_uploads: Arc<AtomicBool>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent upload fail
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// All puts so far, oldest first
    pub fn puts(&self) -> Vec<RecordedPut> {
        self.puts.lock().unwrap().clone()
    }

    pub fn put_count(&self) -> usize {
        self.puts.lock().unwrap().len()
    }

    fn record(
        &self,
        key: &str,
        content_type: &str,
        content_length: Option<u64>,
        data: Vec<u8>,
    ) -> StorageResult<String> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed(
                "mock storage configured to fail".to_string(),
            ));
        }
        self.puts.lock().unwrap().push(RecordedPut {
            key: key.to_string(),
            content_type: content_type.to_string(),
            data,
            content_length,
        });
        Ok(self.object_url(key))
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn upload_stream(
        &self,
        storage_key: &str,
        content_type: &str,
        content_length: Option<u64>,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        self.record(storage_key, content_type, content_length, data)
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let len = data.len() as u64;
        self.record(storage_key, content_type, Some(len), data)
    }

    fn object_url(&self, storage_key: &str) -> String {
        format!("{}/{}", MOCK_BASE_URL, storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
