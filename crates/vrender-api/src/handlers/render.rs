//! Render endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

use vrender_models::{RenderRequest, RenderRequestBody, RequestId};
use vrender_pipeline::PipelineError;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Success body: `{"status": "success", "url": "..."}`.
#[derive(Serialize)]
pub struct RenderResponse {
    pub status: &'static str,
    pub url: String,
}

/// Render a composition and publish the result.
///
/// Blocks until the render completes; the response carries the public URL
/// of the uploaded video.
pub async fn render(
    State(state): State<AppState>,
    body: Result<Json<RenderRequestBody>, JsonRejection>,
) -> ApiResult<Json<RenderResponse>> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let request = RenderRequest::from_body(body)
        .map_err(|e| PipelineError::InvalidRequest(e.to_string()))?;

    let request_id = RequestId::new();
    info!(
        request_id = %request_id,
        scenes = request.scenes.len(),
        has_cover = request.cover.is_some(),
        "Render request accepted"
    );

    let url = state
        .pipeline
        .render_with_id(&request, &request_id)
        .await?;

    Ok(Json(RenderResponse {
        status: "success",
        url,
    }))
}
