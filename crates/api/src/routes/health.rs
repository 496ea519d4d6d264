//! Health and liveness endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::error;

use crate::response::{HealthErrorResponse, HealthResponse};
use crate::state::AppState;

/// GET /health - live database ping, independent of table content.
pub async fn health_handler(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                timestamp: Utc::now().to_rfc3339(),
                environment: state.environment.clone(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Health check ping failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthErrorResponse {
                    status: "unhealthy".to_string(),
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET / - plain liveness text.
pub async fn root_handler() -> &'static str {
    "Consent tracking API is running"
}
