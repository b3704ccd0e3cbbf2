//! Database repositories for data access layer
//!
//! `VideoRepository` is the seam the pipelines depend on. `PgVideoRepository`
//! backs it with Postgres; `InMemoryVideoRepository` is used for tests and for
//! running without a database.

use async_trait::async_trait;
use tubely_core::models::Video;
use tubely_core::AppError;
use uuid::Uuid;

mod memory;
mod video;

pub use memory::InMemoryVideoRepository;
pub use video::PgVideoRepository;

/// Lookup and update access to video records.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Fetch a video by id. `Ok(None)` when no such record exists.
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Persist the mutable fields of an existing video.
    ///
    /// Returns `AppError::NotFound` if the record disappeared in the meantime.
    async fn update_video(&self, video: &Video) -> Result<(), AppError>;
}
