use std::fmt;

use serde::{Deserialize, Serialize};

const LANDSCAPE_RATIO: f64 = 16.0 / 9.0;
const PORTRAIT_RATIO: f64 = 9.0 / 16.0;
const TOLERANCE: f64 = 0.05;

/// Coarse aspect-ratio bucket used to partition stored videos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectCategory {
    Landscape,
    Portrait,
    Other,
    /// A zero width or height; stored like `Other`.
    Invalid,
}

impl AspectCategory {
    /// Key prefix objects of this category are stored under
    pub fn prefix(&self) -> &'static str {
        match self {
            AspectCategory::Landscape => "landscape",
            AspectCategory::Portrait => "portrait",
            AspectCategory::Other | AspectCategory::Invalid => "other",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectCategory::Landscape => "landscape",
            AspectCategory::Portrait => "portrait",
            AspectCategory::Other => "other",
            AspectCategory::Invalid => "invalid",
        }
    }
}

impl fmt::Display for AspectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a frame geometry. Total: every input maps to exactly one category.
pub fn classify(width: u32, height: u32) -> AspectCategory {
    if width == 0 || height == 0 {
        return AspectCategory::Invalid;
    }

    let ratio = f64::from(width) / f64::from(height);
    if (ratio - LANDSCAPE_RATIO).abs() < TOLERANCE {
        AspectCategory::Landscape
    } else if (ratio - PORTRAIT_RATIO).abs() < TOLERANCE {
        AspectCategory::Portrait
    } else {
        AspectCategory::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_resolutions() {
        assert_eq!(classify(1920, 1080), AspectCategory::Landscape);
        assert_eq!(classify(1280, 720), AspectCategory::Landscape);
        assert_eq!(classify(1080, 1920), AspectCategory::Portrait);
        assert_eq!(classify(720, 1280), AspectCategory::Portrait);
        assert_eq!(classify(1000, 1000), AspectCategory::Other);
        assert_eq!(classify(640, 480), AspectCategory::Other);
    }

    #[test]
    fn test_exact_ratios() {
        assert_eq!(classify(16, 9), AspectCategory::Landscape);
        assert_eq!(classify(9, 16), AspectCategory::Portrait);
    }

    #[test]
    fn test_zero_dimensions_are_invalid() {
        assert_eq!(classify(0, 1080), AspectCategory::Invalid);
        assert_eq!(classify(1920, 0), AspectCategory::Invalid);
        assert_eq!(classify(0, 0), AspectCategory::Invalid);
        assert_eq!(AspectCategory::Invalid.prefix(), "other");
        assert_eq!(AspectCategory::Invalid.to_string(), "invalid");
    }

    #[test]
    fn test_tolerance_band_edges() {
        // 1.77 and 1.82 sit inside the landscape band, 1.85 does not
        assert_eq!(classify(177, 100), AspectCategory::Landscape);
        assert_eq!(classify(182, 100), AspectCategory::Landscape);
        assert_eq!(classify(185, 100), AspectCategory::Other);
        // 0.60 inside the portrait band, 0.62 outside
        assert_eq!(classify(60, 100), AspectCategory::Portrait);
        assert_eq!(classify(62, 100), AspectCategory::Other);
    }

    #[test]
    fn test_classification_is_deterministic_and_exclusive() {
        for w in (0..=4000).step_by(37) {
            for h in (0..=4000).step_by(41) {
                let first = classify(w, h);
                assert_eq!(first, classify(w, h));
                let landscape = first == AspectCategory::Landscape;
                let portrait = first == AspectCategory::Portrait;
                assert!(!(landscape && portrait));
            }
        }
    }
}
