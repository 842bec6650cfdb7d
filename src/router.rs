use axum::{
    Json, Router,
    body::Body,
    http::{HeaderName, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::any::Any;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info_span};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::{
    app_state::AppState,
    extractor::ContentType,
    health::{self, HealthResponse},
    pipeline::ProcessedUrl,
    process::{
        dtos::{ErrorResponse, ProcessUrlRequest, ProcessUrlResponse, ResponseStatus},
        handlers,
    },
    quiz::QuizQuestion,
};

static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

#[derive(OpenApi)]
#[openapi(
    paths(handlers::process_url, health::health_check),
    components(schemas(
        ProcessUrlRequest,
        ProcessUrlResponse,
        ProcessedUrl,
        QuizQuestion,
        ContentType,
        ErrorResponse,
        ResponseStatus,
        HealthResponse
    )),
    tags(
        (name = "process", description = "URL summarization and quiz generation"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

#[derive(Debug, Clone, Copy, Default)]
struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

pub fn build_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/api/process-url", post(handlers::process_url))
        .route("/api/health", get(health::health_check))
        .route("/api/openapi.json", get(openapi_json))
        .fallback(not_found)
        .with_state(state);

    with_middleware(routes)
}

fn with_middleware(router: Router) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER.clone(), UuidRequestId))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(&REQUEST_ID_HEADER)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");
                    info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }),
            )
            .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER.clone()))
            .layer(CatchPanicLayer::custom(handle_panic)),
    )
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Endpoint not found")),
    )
        .into_response()
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Internal server error")),
    )
        .into_response()
}
