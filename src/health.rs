use axum::Json;
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

pub const SERVICE_NAME: &str = "URL Summarization & Quiz App";

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    debug!("health check");
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
    })
}
