//! Stream geometry from `ffprobe -print_format json -show_streams`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Width and height of the first stream in a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaGeometry {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("ffprobe failed: {message}")]
    ExecutionFailed { message: String, stderr: String },

    #[error("could not parse ffprobe output: {0}")]
    ParseFailed(#[source] serde_json::Error),

    #[error("no streams found in media file")]
    NoStreams,

    #[error("ffprobe timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Deserialize)]
struct ProbeStream {
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

/// Parse ffprobe's JSON output. Missing dimensions on the first stream read as 0.
pub fn parse_probe_output(stdout: &[u8]) -> Result<MediaGeometry, ProbeError> {
    let output: ProbeOutput = serde_json::from_slice(stdout).map_err(ProbeError::ParseFailed)?;

    let stream = output.streams.first().ok_or(ProbeError::NoStreams)?;

    Ok(MediaGeometry {
        width: stream.width,
        height: stream.height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_first_stream() {
        let json = br#"{
            "streams": [
                {"index": 0, "codec_type": "video", "width": 1920, "height": 1080},
                {"index": 1, "codec_type": "audio"}
            ]
        }"#;
        let geometry = parse_probe_output(json).unwrap();
        assert_eq!(
            geometry,
            MediaGeometry {
                width: 1920,
                height: 1080
            }
        );
    }

    #[test]
    fn test_audio_first_reads_as_zero() {
        let json = br#"{"streams": [{"codec_type": "audio"}, {"width": 1280, "height": 720}]}"#;
        let geometry = parse_probe_output(json).unwrap();
        assert_eq!(geometry.width, 0);
        assert_eq!(geometry.height, 0);
    }

    #[test]
    fn test_no_streams() {
        assert!(matches!(
            parse_probe_output(br#"{"streams": []}"#),
            Err(ProbeError::NoStreams)
        ));
        assert!(matches!(
            parse_probe_output(br#"{}"#),
            Err(ProbeError::NoStreams)
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_probe_output(b"moov atom not found"),
            Err(ProbeError::ParseFailed(_))
        ));
    }
}
