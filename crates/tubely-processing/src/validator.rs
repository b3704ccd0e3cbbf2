/// Content types accepted by the video upload path
pub const VIDEO_CONTENT_TYPES: &[&str] = &["video/mp4"];

/// Content types accepted by the thumbnail upload path
pub const THUMBNAIL_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Common validation errors for uploaded media
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Empty file")]
    EmptyFile,
}

/// Strip MIME parameters and normalize case: `Video/MP4; codecs=avc1` becomes `video/mp4`.
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Media file validator
///
/// Checks run before any I/O: the declared content type against an allow
/// list and sizes against a cap.
#[derive(Debug, Clone)]
pub struct MediaValidator {
    max_file_size: u64,
    allowed_content_types: Vec<String>,
}

impl MediaValidator {
    pub fn new(max_file_size: u64, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_content_types,
        }
    }

    pub fn video(max_file_size: u64) -> Self {
        Self::new(
            max_file_size,
            VIDEO_CONTENT_TYPES.iter().map(|s| s.to_string()).collect(),
        )
    }

    pub fn thumbnail(max_file_size: u64) -> Self {
        Self::new(
            max_file_size,
            THUMBNAIL_CONTENT_TYPES.iter().map(|s| s.to_string()).collect(),
        )
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Validate content type, returning the normalized media type on success
    pub fn validate_content_type(&self, content_type: &str) -> Result<String, ValidationError> {
        let normalized = normalize_mime_type(content_type);

        if !self
            .allowed_content_types
            .iter()
            .any(|ct| ct == &normalized)
        {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(normalized)
    }

    /// Validate the size of bytes actually received
    pub fn validate_file_size(&self, size: u64) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        self.validate_declared_size(size)
    }

    /// Validate a size announced up front (e.g. `Content-Length`); only the upper bound applies
    pub fn validate_declared_size(&self, size: u64) -> Result<(), ValidationError> {
        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mime_type() {
        assert_eq!(normalize_mime_type("video/mp4"), "video/mp4");
        assert_eq!(normalize_mime_type("Video/MP4; codecs=avc1"), "video/mp4");
        assert_eq!(normalize_mime_type("  image/png "), "image/png");
        assert_eq!(normalize_mime_type(""), "");
    }

    #[test]
    fn test_video_accepts_only_mp4() {
        let validator = MediaValidator::video(1024);
        assert_eq!(
            validator.validate_content_type("video/MP4").unwrap(),
            "video/mp4"
        );
        assert!(validator.validate_content_type("video/quicktime").is_err());
        assert!(validator.validate_content_type("image/png").is_err());
    }

    #[test]
    fn test_thumbnail_content_types() {
        let validator = MediaValidator::thumbnail(1024);
        assert!(validator.validate_content_type("image/jpeg").is_ok());
        assert!(validator.validate_content_type("image/png; q=1").is_ok());

        let err = validator.validate_content_type("image/gif").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidContentType { .. }));
    }

    #[test]
    fn test_validate_file_size() {
        let validator = MediaValidator::video(100);
        assert!(validator.validate_file_size(100).is_ok());
        assert!(matches!(
            validator.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        ));
        assert!(matches!(
            validator.validate_file_size(101),
            Err(ValidationError::FileTooLarge { size: 101, max: 100 })
        ));
    }

    #[test]
    fn test_declared_size_only_checks_upper_bound() {
        let validator = MediaValidator::thumbnail(10);
        assert!(validator.validate_declared_size(0).is_ok());
        assert!(validator.validate_declared_size(11).is_err());
    }
}
