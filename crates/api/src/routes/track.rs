//! Consent event ingestion endpoint.
//!
//! Runs the validation boundary, then a single-row insert. A record is
//! accepted or rejected as a unit; the 400 body carries every violated
//! rule so the client never has to resubmit to discover the next one.

use axum::{extract::State, Json};
use telemetry::{metrics, FailedOperation};
use tracing::{error, info, warn};

use tracker_core::TrackSubmission;

use crate::extractors::{ClientIp, JsonPayload};
use crate::middleware::rate_limit::RateDecision;
use crate::response::{ApiError, TrackResponse};
use crate::state::AppState;

/// POST /track - accept one consent/permission decision record.
pub async fn track_handler(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    JsonPayload(mut submission): JsonPayload<TrackSubmission>,
) -> Result<Json<TrackResponse>, ApiError> {
    metrics().submissions_received.inc();

    let limiter_key = client_ip.clone().unwrap_or_else(|| "unknown".to_string());
    if let RateDecision::Limited { retry_after_secs } = state.rate_limiter.check(&limiter_key) {
        metrics().rate_limited.inc();
        warn!(client = %limiter_key, "Rate limit exceeded on /track");
        return Err(ApiError::rate_limited(retry_after_secs));
    }

    // Browser clients usually cannot see their own public address;
    // fall back to what the transport reports.
    if submission.ip_address.is_none() {
        submission.ip_address = client_ip;
    }

    let event = match tracker_core::validate(&submission) {
        Ok(event) => event,
        Err(failure) => {
            metrics().events_rejected.inc();
            info!(
                violations = failure.errors.len(),
                "Rejected tracking submission"
            );
            return Err(ApiError::validation(&failure));
        }
    };

    match state.store.insert(&event).await {
        Ok(id) => {
            metrics().events_accepted.inc();
            info!(id, session_id = %event.session_id, "Stored tracking event");
            Ok(Json(TrackResponse::accepted(id)))
        }
        Err(e) => {
            error!(error = %e, "Failed to store tracking event");
            state
                .error_log
                .record(
                    FailedOperation::new("insert_tracking_event", e.to_string())
                        .with_payload(serde_json::to_value(&submission).unwrap_or_default()),
                )
                .await;
            Err(ApiError::persistence(e.to_string(), !state.is_production()))
        }
    }
}
