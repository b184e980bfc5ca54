//! Canonical encoding profile.
//!
//! Every fetched asset is rewritten into this profile before any merge, so
//! concatenation never fails on mismatched encodings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Canonical video width in pixels
pub const CANONICAL_WIDTH: u32 = 1920;
/// Canonical video height in pixels
pub const CANONICAL_HEIGHT: u32 = 1080;
/// Canonical frame rate
pub const CANONICAL_FPS: u32 = 30;
/// Canonical pixel format
pub const CANONICAL_PIXEL_FORMAT: &str = "yuv420p";
/// Canonical video codec (H.264)
pub const CANONICAL_VIDEO_CODEC: &str = "libx264";
/// Canonical encoding preset
pub const CANONICAL_PRESET: &str = "veryfast";
/// Canonical CRF (Constant Rate Factor)
pub const CANONICAL_CRF: u8 = 23;
/// Canonical audio codec
pub const CANONICAL_AUDIO_CODEC: &str = "aac";
/// Canonical audio sample rate in Hz
pub const CANONICAL_SAMPLE_RATE: u32 = 44100;
/// Canonical audio channel count
pub const CANONICAL_CHANNELS: u8 = 2;
/// Canonical audio bitrate
pub const CANONICAL_AUDIO_BITRATE: &str = "128k";

/// Duration of the video a still-image cover is expanded into, in seconds.
pub const COVER_IMAGE_DURATION_SECS: f64 = 3.0;

/// Target video encoding profile.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoProfile {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub pixel_format: String,
    pub codec: String,
    pub preset: String,
    pub crf: u8,
}

impl Default for VideoProfile {
    fn default() -> Self {
        Self {
            width: CANONICAL_WIDTH,
            height: CANONICAL_HEIGHT,
            fps: CANONICAL_FPS,
            pixel_format: CANONICAL_PIXEL_FORMAT.to_string(),
            codec: CANONICAL_VIDEO_CODEC.to_string(),
            preset: CANONICAL_PRESET.to_string(),
            crf: CANONICAL_CRF,
        }
    }
}

impl VideoProfile {
    /// Video filter that scales to fit and pads to preserve aspect ratio,
    /// then locks frame rate and pixel format.
    pub fn scale_pad_filter(&self) -> String {
        format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,\
             pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,\
             fps={fps},format={pix}",
            w = self.width,
            h = self.height,
            fps = self.fps,
            pix = self.pixel_format,
        )
    }

    /// Encoder arguments for FFmpeg output.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        vec![
            "-c:v".to_string(),
            self.codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
            "-crf".to_string(),
            self.crf.to_string(),
        ]
    }
}

/// Target audio encoding profile.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AudioProfile {
    pub codec: String,
    pub sample_rate: u32,
    pub channels: u8,
    pub bitrate: String,
}

impl Default for AudioProfile {
    fn default() -> Self {
        Self {
            codec: CANONICAL_AUDIO_CODEC.to_string(),
            sample_rate: CANONICAL_SAMPLE_RATE,
            channels: CANONICAL_CHANNELS,
            bitrate: CANONICAL_AUDIO_BITRATE.to_string(),
        }
    }
}

impl AudioProfile {
    /// Encoder arguments for FFmpeg output.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        vec![
            "-c:a".to_string(),
            self.codec.clone(),
            "-ar".to_string(),
            self.sample_rate.to_string(),
            "-ac".to_string(),
            self.channels.to_string(),
            "-b:a".to_string(),
            self.bitrate.clone(),
        ]
    }
}

/// The fixed profile every asset is normalized into before merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CanonicalProfile {
    pub video: VideoProfile,
    pub audio: AudioProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = CanonicalProfile::default();
        assert_eq!(profile.video.width, 1920);
        assert_eq!(profile.video.height, 1080);
        assert_eq!(profile.video.fps, 30);
        assert_eq!(profile.audio.sample_rate, 44100);
        assert_eq!(profile.audio.channels, 2);
    }

    #[test]
    fn test_scale_pad_filter() {
        let filter = VideoProfile::default().scale_pad_filter();
        assert!(filter.contains("scale=1920:1080:force_original_aspect_ratio=decrease"));
        assert!(filter.contains("pad=1920:1080:(ow-iw)/2:(oh-ih)/2"));
        assert!(filter.contains("fps=30"));
        assert!(filter.contains("format=yuv420p"));
    }

    #[test]
    fn test_video_args() {
        let args = VideoProfile::default().to_ffmpeg_args();
        assert!(args.contains(&"-c:v".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"-crf".to_string()));
        assert!(args.contains(&"23".to_string()));
    }

    #[test]
    fn test_audio_args() {
        let args = AudioProfile::default().to_ffmpeg_args();
        assert!(args.contains(&"-ar".to_string()));
        assert!(args.contains(&"44100".to_string()));
        assert!(args.contains(&"-ac".to_string()));
        assert!(args.contains(&"2".to_string()));
        assert!(args.contains(&"128k".to_string()));
    }
}
