//! Pipeline error types.
//!
//! Every stage failure is non-recoverable locally: the controller
//! pattern-matches on these kinds to abort the render, and the HTTP layer
//! maps them onto the wire response.

use std::fmt;
use thiserror::Error;

use vrender_media::MediaError;
use vrender_models::RequestValidationError;
use vrender_storage::StorageError;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// The transcode stage an FFmpeg failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeStage {
    Normalize,
    Compose,
    Concat,
    BackgroundTrack,
    Mix,
}

impl TranscodeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscodeStage::Normalize => "normalize",
            TranscodeStage::Compose => "compose",
            TranscodeStage::Concat => "concat",
            TranscodeStage::BackgroundTrack => "bg-track",
            TranscodeStage::Mix => "mix",
        }
    }
}

impl fmt::Display for TranscodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that abort a render.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Asset unreachable: {0}")]
    AssetUnreachable(String),

    #[error("Asset download failed: {0}")]
    AssetDownloadFailed(String),

    #[error("Transcode failed (stage={stage}): {message}")]
    TranscodeFailed {
        stage: TranscodeStage,
        message: String,
    },

    #[error("Duration probe failed: {0}")]
    DurationProbeFailed(String),

    #[error("Publish failed: {0}")]
    PublishFailed(#[from] StorageError),

    #[error("Workspace error: {0}")]
    Workspace(#[from] std::io::Error),
}

impl PipelineError {
    /// Tag a media error with the transcode stage it occurred in.
    pub fn transcode(stage: TranscodeStage, err: MediaError) -> Self {
        Self::TranscodeFailed {
            stage,
            message: err.to_string(),
        }
    }

    /// Map a fetch error onto the reachability/transfer kinds.
    pub fn from_fetch(err: MediaError) -> Self {
        match err {
            MediaError::AssetUnreachable { url, message } => {
                Self::AssetUnreachable(format!("{}: {}", url, message))
            }
            MediaError::DownloadFailed { url, message } => {
                Self::AssetDownloadFailed(format!("{}: {}", url, message))
            }
            other => Self::AssetDownloadFailed(other.to_string()),
        }
    }

    /// Map a probe error onto the duration-probe kind.
    pub fn from_probe(err: MediaError) -> Self {
        Self::DurationProbeFailed(err.to_string())
    }
}

impl From<RequestValidationError> for PipelineError {
    fn from(err: RequestValidationError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_kinds_are_preserved() {
        let unreachable = PipelineError::from_fetch(MediaError::unreachable(
            "https://cdn.example.com/a.mp4",
            "connection refused",
        ));
        assert!(matches!(unreachable, PipelineError::AssetUnreachable(_)));

        let truncated = PipelineError::from_fetch(MediaError::download_failed(
            "https://cdn.example.com/a.mp4",
            "truncated",
        ));
        assert!(matches!(truncated, PipelineError::AssetDownloadFailed(_)));
    }

    #[test]
    fn test_transcode_errors_carry_their_stage() {
        let err = PipelineError::transcode(
            TranscodeStage::BackgroundTrack,
            MediaError::ffmpeg_failed("boom", None, Some(1)),
        );
        assert!(err.to_string().contains("stage=bg-track"));
    }

    #[test]
    fn test_timeout_is_a_transcode_failure() {
        let err = PipelineError::transcode(TranscodeStage::Mix, MediaError::Timeout(600));
        assert!(matches!(
            err,
            PipelineError::TranscodeFailed {
                stage: TranscodeStage::Mix,
                ..
            }
        ));
    }
}
