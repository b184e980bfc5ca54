//! FFprobe media inspection.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::warn;

use crate::error::{MediaError, MediaResult};

/// Codecs FFprobe reports for still images wrapped in a "video" stream.
const IMAGE_CODECS: &[&str] = &["png", "mjpeg", "bmp", "webp", "gif", "tiff"];

/// Whether a clip carries a native audio stream.
///
/// Resolved once by a single probe and threaded through the mixer, rather
/// than re-probed at each branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioPresence {
    /// At least one audio stream present.
    WithNativeAudio,
    /// No audio stream; picture only.
    SilentVideo,
}

/// Measured media file information.
#[derive(Debug, Clone)]
pub struct MediaInfo {
    /// Duration in seconds (0.0 when the container reports none)
    pub duration: f64,
    /// Width in pixels (0 when there is no video stream)
    pub width: u32,
    /// Height in pixels (0 when there is no video stream)
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
    /// Video codec name, empty when there is no video stream
    pub video_codec: String,
    /// Whether the file has at least one audio stream
    pub has_audio: bool,
}

impl MediaInfo {
    /// The mixer's two-state audio view of this clip.
    pub fn audio_presence(&self) -> AudioPresence {
        if self.has_audio {
            AudioPresence::WithNativeAudio
        } else {
            AudioPresence::SilentVideo
        }
    }

    /// Whether this is a still image rather than a playable video.
    ///
    /// Single-frame containers report an image codec, or no duration and
    /// no audio.
    pub fn is_still_image(&self) -> bool {
        if self.video_codec.is_empty() {
            return false;
        }
        IMAGE_CODECS.contains(&self.video_codec.as_str())
            || (self.duration <= 0.05 && !self.has_audio)
    }
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
}

/// Probe a media file for duration and stream composition.
pub async fn probe_media(path: impl AsRef<Path>, timeout: Duration) -> MediaResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let mut child = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result?,
        Err(_) => {
            warn!(
                "FFprobe timed out after {} seconds: {}",
                timeout.as_secs(),
                path.display()
            );
            return Err(MediaError::Timeout(timeout.as_secs()));
        }
    };

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("FFprobe failed for {}", path.display()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    parse_probe_output(&output.stdout)
}

/// Parse FFprobe's JSON output into [`MediaInfo`].
pub(crate) fn parse_probe_output(stdout: &[u8]) -> MediaResult<MediaInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let video_stream = probe.streams.iter().find(|s| s.codec_type == "video");
    let has_audio = probe.streams.iter().any(|s| s.codec_type == "audio");

    // Container duration, falling back to the first stream that declares one.
    let duration = probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .or_else(|| {
            probe
                .streams
                .iter()
                .filter_map(|s| s.duration.as_deref())
                .find_map(|d| d.parse::<f64>().ok())
        })
        .unwrap_or(0.0);

    let fps = video_stream
        .and_then(|s| s.avg_frame_rate.as_deref().or(s.r_frame_rate.as_deref()))
        .and_then(parse_frame_rate)
        .unwrap_or(0.0);

    Ok(MediaInfo {
        duration,
        width: video_stream.and_then(|s| s.width).unwrap_or(0),
        height: video_stream.and_then(|s| s.height).unwrap_or(0),
        fps,
        video_codec: video_stream
            .and_then(|s| s.codec_name.clone())
            .unwrap_or_default(),
        has_audio,
    })
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("29.97").unwrap() - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_parse_video_with_audio() {
        let json = br#"{
            "format": { "duration": "14.000000" },
            "streams": [
                { "codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080, "avg_frame_rate": "30/1" },
                { "codec_type": "audio", "codec_name": "aac" }
            ]
        }"#;

        let info = parse_probe_output(json).unwrap();
        assert!((info.duration - 14.0).abs() < 1e-6);
        assert_eq!(info.width, 1920);
        assert_eq!(info.height, 1080);
        assert_eq!(info.video_codec, "h264");
        assert!(info.has_audio);
        assert_eq!(info.audio_presence(), AudioPresence::WithNativeAudio);
        assert!(!info.is_still_image());
    }

    #[test]
    fn test_parse_silent_video() {
        let json = br#"{
            "format": { "duration": "9.5" },
            "streams": [
                { "codec_type": "video", "codec_name": "h264", "width": 1280, "height": 720, "r_frame_rate": "25/1" }
            ]
        }"#;

        let info = parse_probe_output(json).unwrap();
        assert!(!info.has_audio);
        assert_eq!(info.audio_presence(), AudioPresence::SilentVideo);
        assert!(!info.is_still_image());
    }

    #[test]
    fn test_parse_audio_only() {
        let json = br#"{
            "format": { "duration": "120.3" },
            "streams": [
                { "codec_type": "audio", "codec_name": "mp3" }
            ]
        }"#;

        let info = parse_probe_output(json).unwrap();
        assert!((info.duration - 120.3).abs() < 1e-6);
        assert_eq!(info.width, 0);
        assert!(info.video_codec.is_empty());
        assert!(info.has_audio);
        assert!(!info.is_still_image());
    }

    #[test]
    fn test_parse_still_image() {
        let json = br#"{
            "format": {},
            "streams": [
                { "codec_type": "video", "codec_name": "png", "width": 1080, "height": 1920 }
            ]
        }"#;

        let info = parse_probe_output(json).unwrap();
        assert!(info.is_still_image());
        assert_eq!(info.duration, 0.0);
    }

    #[test]
    fn test_stream_duration_fallback() {
        let json = br#"{
            "format": {},
            "streams": [
                { "codec_type": "video", "codec_name": "h264", "width": 640, "height": 360, "duration": "7.25" }
            ]
        }"#;

        let info = parse_probe_output(json).unwrap();
        assert!((info.duration - 7.25).abs() < 1e-6);
        assert!(!info.is_still_image());
    }
}
