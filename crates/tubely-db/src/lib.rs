//! Tubely metadata store
//!
//! Repositories for the video records that the upload pipelines read and
//! update.

pub mod db;

pub use db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};
