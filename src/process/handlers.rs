use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{error, warn};

use crate::{
    app_state::AppState,
    pipeline::PipelineError,
    process::dtos::{ErrorResponse, ProcessUrlRequest, ProcessUrlResponse},
};

#[utoipa::path(
    post,
    path = "/api/process-url",
    tag = "process",
    request_body = ProcessUrlRequest,
    responses(
        (status = 200, description = "Summary and quiz generated", body = ProcessUrlResponse),
        (status = 400, description = "Invalid URL, extraction failure or rejected summary", body = ErrorResponse),
        (status = 500, description = "Summarization or quiz generation failed", body = ErrorResponse)
    )
)]
pub async fn process_url(
    State(state): State<AppState>,
    payload: Result<Json<ProcessUrlRequest>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            warn!(error = %rejection, "rejected request body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Invalid request body")),
            )
                .into_response();
        }
    };

    let url = payload.url.unwrap_or_default();
    match Arc::clone(&state.pipeline).process(url).await {
        Ok(processed) => (StatusCode::OK, Json(ProcessUrlResponse::from(processed))).into_response(),
        Err(err) => err.into_response(),
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let stage = self.stage().map(|stage| stage.to_string());

        if let PipelineError::Internal(detail) = &self {
            error!(error = ?detail, "unexpected error while processing URL");
        } else if status.is_server_error() {
            error!(stage = ?stage, error = %self, "pipeline failed");
        } else {
            warn!(stage = ?stage, error = %self, "request rejected");
        }

        let mut body = ErrorResponse::new(self.to_string());
        if let Some(url) = self.url() {
            body = body.with_url(url);
        }
        (status, Json(body)).into_response()
    }
}
