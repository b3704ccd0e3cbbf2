//! Shared key generation for storage backends.
//!
//! Key format: `{prefix}/{file_id}.{ext}` for partitioned objects, `{file_id}.{ext}` otherwise.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

/// Number of random bytes behind every file id.
const FILE_ID_BYTES: usize = 32;

/// Random, URL-safe identifier for a stored file.
pub fn random_file_id() -> String {
    let mut bytes = [0u8; FILE_ID_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// File extension for a media type: its subtype, without parameters.
///
/// `video/mp4` gives `mp4`, `image/jpeg; charset=binary` gives `jpeg`.
/// Anything that is not plain alphanumeric falls back to `bin`.
pub fn extension_for(content_type: &str) -> String {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    let subtype = essence.split_once('/').map(|(_, s)| s).unwrap_or("");

    if subtype.is_empty() || !subtype.chars().all(|c| c.is_ascii_alphanumeric()) {
        return "bin".to_string();
    }
    subtype.to_ascii_lowercase()
}

/// Object key for a freshly uploaded file. Generated once and never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey(String);

impl AssetKey {
    /// `{prefix}/{file_id}.{ext}`
    pub fn generate(prefix: &str, content_type: &str) -> Self {
        AssetKey(format!(
            "{}/{}.{}",
            prefix.trim_matches('/'),
            random_file_id(),
            extension_for(content_type)
        ))
    }

    /// `{file_id}.{ext}`
    pub fn unprefixed(content_type: &str) -> Self {
        AssetKey(format!("{}.{}", random_file_id(), extension_for(content_type)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
