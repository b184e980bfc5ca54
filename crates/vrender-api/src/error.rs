//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use vrender_pipeline::PipelineError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Pipeline(e) => match e {
                PipelineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                PipelineError::AssetUnreachable(_) | PipelineError::AssetDownloadFailed(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                PipelineError::PublishFailed(_) => StatusCode::BAD_GATEWAY,
                PipelineError::TranscodeFailed { .. }
                | PipelineError::DurationProbeFailed(_)
                | PipelineError::Workspace(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

/// Error body: `{"status": "error", "message": "..."}`.
#[derive(Serialize)]
struct ErrorResponse {
    status: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal failure details stay out of production responses.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR
            && std::env::var("ENVIRONMENT").unwrap_or_default() == "production"
        {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            status: "error",
            message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vrender_pipeline::TranscodeStage;

    #[test]
    fn test_status_mapping() {
        let invalid = ApiError::from(PipelineError::InvalidRequest("missing scenes".into()));
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        let unreachable =
            ApiError::from(PipelineError::AssetUnreachable("http 404".into()));
        assert_eq!(unreachable.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let transcode = ApiError::from(PipelineError::TranscodeFailed {
            stage: TranscodeStage::Mix,
            message: "exit 1".into(),
        });
        assert_eq!(transcode.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_body_shape() {
        let err = ApiError::bad_request("Missing scenes or background_music_url");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
