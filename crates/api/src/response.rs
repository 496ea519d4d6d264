//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use pg_store::StoredEvent;
use tracker_core::ValidationFailure;

/// Success response for POST /track.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrackResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl TrackResponse {
    pub fn accepted(id: i64) -> Self {
        Self {
            success: true,
            message: "Data saved successfully".to_string(),
            id: Some(id),
        }
    }
}

/// Success response for GET /data.
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse {
    pub success: bool,
    pub data: Vec<StoredEvent>,
}

/// Healthy response for GET /health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub environment: String,
}

/// Unhealthy response for GET /health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthErrorResponse {
    pub status: String,
    pub error: String,
}

/// Error body shared by all failure responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// API error type.
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
    pub retry_after: Option<u64>,
}

impl ApiError {
    /// 400 with the full joined field-error list in `message`.
    pub fn validation(failure: &ValidationFailure) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                success: false,
                error: "Validation failed".to_string(),
                message: Some(failure.to_string()),
            },
            retry_after: None,
        }
    }

    /// 400 for a body that never deserialized. Same envelope as
    /// [`ApiError::validation`], with the parser's detail in `message`.
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                success: false,
                error: "Validation failed".to_string(),
                message: Some(detail.into()),
            },
            retry_after: None,
        }
    }

    /// 429 with a Retry-After hint.
    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: ErrorBody {
                success: false,
                error: "Too many requests, please try again later".to_string(),
                message: None,
            },
            retry_after: Some(retry_after_secs),
        }
    }

    /// 500 for a persistence failure. Diagnostic detail is only exposed
    /// outside production; the full error always goes to the logs.
    pub fn persistence(detail: impl Into<String>, expose_detail: bool) -> Self {
        let error = if expose_detail {
            detail.into()
        } else {
            "Internal server error".to_string()
        };
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                success: false,
                error,
                message: None,
            },
            retry_after: None,
        }
    }

    /// Generic 500, never leaks internals.
    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                success: false,
                error: "Internal server error".to_string(),
                message: None,
            },
            retry_after: None,
        }
    }

    /// 404 for unknown routes.
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorBody {
                success: false,
                error: "Not found".to_string(),
                message: None,
            },
            retry_after: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();

        // Add Retry-After header for rate limit responses
        if let Some(retry_after) = self.retry_after {
            if let Ok(value) = retry_after.to_string().parse() {
                response.headers_mut().insert("Retry-After", value);
            }
        }

        response
    }
}
