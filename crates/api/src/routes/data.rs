//! Read-back listing endpoint.

use axum::{extract::State, Json};
use telemetry::FailedOperation;
use tracing::error;

use crate::response::{ApiError, DataResponse};
use crate::state::AppState;

/// GET /data - all stored events, most recent first.
pub async fn data_handler(State(state): State<AppState>) -> Result<Json<DataResponse>, ApiError> {
    match state.store.list().await {
        Ok(events) => Ok(Json(DataResponse {
            success: true,
            data: events,
        })),
        Err(e) => {
            error!(error = %e, "Failed to list tracking events");
            state
                .error_log
                .record(FailedOperation::new("list_tracking_events", e.to_string()))
                .await;
            Err(ApiError::persistence(e.to_string(), !state.is_production()))
        }
    }
}
