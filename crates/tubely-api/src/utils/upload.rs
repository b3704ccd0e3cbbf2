//! Common utilities for file upload handlers

use axum::extract::multipart::{Field, MultipartError};
use crate::constants::MULTIPART_OVERHEAD_BYTES;
use axum::http::{header::CONTENT_LENGTH, HeaderMap};
use futures::TryStreamExt;
use std::io;
use std::pin::Pin;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use tubely_core::AppError;
use uuid::Uuid;

/// File part of a multipart form, exposed as a byte stream
pub struct FilePart<'a> {
    pub content_type: String,
    pub reader: Pin<Box<dyn AsyncRead + Send + 'a>>,
}

/// Parse the `{videoID}` path segment.
pub fn parse_video_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInput("Invalid ID".to_string()))
}

/// Size the client announced for the whole request body
pub fn declared_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Upper bound on the file part implied by `Content-Length`.
///
/// The request length includes multipart boundaries and part headers, so the
/// same framing allowance the body limit grants is taken off before the value
/// is compared with a per-file cap. Observed bytes are still checked exactly.
pub fn declared_file_size(headers: &HeaderMap) -> Option<u64> {
    declared_content_length(headers)
        .map(|len| len.saturating_sub(MULTIPART_OVERHEAD_BYTES as u64))
}

pub fn multipart_error(err: MultipartError) -> AppError {
    AppError::InvalidInput(format!("Failed to read multipart: {}", err))
}

pub fn missing_field(name: &str) -> AppError {
    AppError::InvalidInput(format!("Unable to parse form file: no '{}' field", name))
}

/// Turn a multipart field into a streaming file part without buffering it.
///
/// The part must declare its own content type; it is what the pipelines
/// validate against.
pub fn file_part(field: Field<'_>) -> Result<FilePart<'_>, AppError> {
    let content_type = field
        .content_type()
        .map(str::to_string)
        .ok_or_else(|| AppError::InvalidInput("Failed to parse content type".to_string()))?;

    let stream = field.map_err(|e| io::Error::other(e.to_string()));

    Ok(FilePart {
        content_type,
        reader: Box::pin(StreamReader::new(stream)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_parse_video_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_video_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_video_id("not-a-uuid"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_declared_content_length() {
        let mut headers = HeaderMap::new();
        assert_eq!(declared_content_length(&headers), None);

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("1048576"));
        assert_eq!(declared_content_length(&headers), Some(1_048_576));

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("lots"));
        assert_eq!(declared_content_length(&headers), None);
    }

    #[test]
    fn test_declared_file_size_excludes_multipart_framing() {
        let mut headers = HeaderMap::new();
        assert_eq!(declared_file_size(&headers), None);

        let request_len = 1_048_576 + MULTIPART_OVERHEAD_BYTES as u64;
        headers.insert(CONTENT_LENGTH, HeaderValue::from(request_len));
        assert_eq!(declared_file_size(&headers), Some(1_048_576));

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("200"));
        assert_eq!(declared_file_size(&headers), Some(0));
    }
}
