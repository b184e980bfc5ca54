//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Render pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root directory workspaces are allocated under
    pub work_root: PathBuf,
    /// Maximum concurrent fetch+normalize tasks per request
    pub max_fetch_parallel: usize,
    /// Timeout for a single asset download
    pub fetch_timeout: Duration,
    /// Timeout for a single FFmpeg invocation
    pub ffmpeg_timeout: Duration,
    /// Timeout for a single FFprobe invocation
    pub probe_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_root: PathBuf::from("/tmp/vrender"),
            max_fetch_parallel: 4,
            fetch_timeout: Duration::from_secs(60),
            ffmpeg_timeout: Duration::from_secs(600),
            probe_timeout: Duration::from_secs(30),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            work_root: std::env::var("RENDER_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp/vrender")),
            max_fetch_parallel: std::env::var("RENDER_MAX_FETCH_PARALLEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4),
            fetch_timeout: Duration::from_secs(
                std::env::var("RENDER_FETCH_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            ffmpeg_timeout: Duration::from_secs(
                std::env::var("RENDER_FFMPEG_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
            probe_timeout: Duration::from_secs(
                std::env::var("RENDER_PROBE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}
