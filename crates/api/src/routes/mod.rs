//! API routes.

pub mod data;
pub mod health;
pub mod track;

use axum::{
    http::{header, HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;

use crate::response::ApiError;
use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    // Content-Type is the only header clients may send;
    // Content-Disposition the only one they may read.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health::root_handler))
        .route("/track", post(track::track_handler))
        .route("/data", get(data::data_handler))
        .route("/health", get(health::health_handler))
        .fallback(fallback_handler)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Unknown routes.
async fn fallback_handler() -> ApiError {
    ApiError::not_found()
}

/// Top-level boundary for faults escaping a handler: log, answer with a
/// generic 500, keep serving.
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> axum::response::Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    error!(detail, "Unhandled fault in request processing");

    ApiError::internal().into_response()
}
