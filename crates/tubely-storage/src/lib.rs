//! Tubely Storage Library
//!
//! This crate provides the object store abstraction used for processed videos
//! and thumbnail assets. It includes the Storage trait and implementations for
//! S3 and the local filesystem.
//!
//! # Storage key format
//!
//! Video keys are partitioned by aspect ratio: `{category}/{file_id}.{ext}`,
//! where `file_id` is 32 random bytes in unpadded URL-safe base64. Thumbnail
//! assets use the bare `{file_id}.{ext}`.
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-local")]
pub use factory::create_asset_storage;
pub use factory::create_storage;
pub use keys::AssetKey;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
