use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Object store backend used for processed videos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

/// Where uploaded thumbnails end up.
///
/// `Disk` writes the image under the assets root and references it by URL;
/// `DataUrl` embeds the encoded bytes directly in the video record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThumbnailStorage {
    Disk,
    DataUrl,
}

impl FromStr for ThumbnailStorage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disk" => Ok(ThumbnailStorage::Disk),
            "data_url" | "data-url" | "inline" => Ok(ThumbnailStorage::DataUrl),
            _ => Err(anyhow::anyhow!("Invalid thumbnail storage mode: {}", s)),
        }
    }
}

impl Display for ThumbnailStorage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ThumbnailStorage::Disk => write!(f, "disk"),
            ThumbnailStorage::DataUrl => write!(f, "data_url"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backends_case_insensitively() {
        assert_eq!("S3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!(
            "local".parse::<StorageBackend>().unwrap(),
            StorageBackend::Local
        );
        assert!("nfs".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn parses_thumbnail_modes() {
        assert_eq!(
            "data_url".parse::<ThumbnailStorage>().unwrap(),
            ThumbnailStorage::DataUrl
        );
        assert_eq!(
            "Disk".parse::<ThumbnailStorage>().unwrap(),
            ThumbnailStorage::Disk
        );
        assert_eq!(ThumbnailStorage::DataUrl.to_string(), "data_url");
    }
}
