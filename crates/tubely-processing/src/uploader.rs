//! Streams a processed local file to the object store.

use std::path::Path;

use tubely_storage::{AssetKey, Storage, StorageError, StorageResult};

/// Upload the file at `path` under `key` and return its public URL.
///
/// The file is streamed; it is never read into memory whole.
#[tracing::instrument(skip(storage, path), fields(storage.key = %key, storage.backend = %storage.backend_type()))]
pub async fn upload_file(
    storage: &dyn Storage,
    key: &AssetKey,
    path: &Path,
    content_type: &str,
) -> StorageResult<String> {
    let file = tokio::fs::File::open(path).await.map_err(|e| {
        StorageError::UploadFailed(format!("Failed to open {}: {}", path.display(), e))
    })?;
    let content_length = file
        .metadata()
        .await
        .map_err(|e| {
            StorageError::UploadFailed(format!("Failed to stat {}: {}", path.display(), e))
        })?
        .len();

    storage
        .upload_stream(key.as_str(), content_type, Some(content_length), Box::pin(file))
        .await
}
