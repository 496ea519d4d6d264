//! Request extractors.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
};

use crate::response::ApiError;

/// Client IP address, taken from proxy headers.
///
/// The service sits behind a reverse proxy in deployment, so the
/// transport-level peer address is the proxy's; the real client address
/// arrives in `X-Forwarded-For` (first hop) or `X-Real-IP`.
#[derive(Debug, Clone)]
pub struct ClientIp(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(xff) = parts.headers.get("X-Forwarded-For") {
            if let Ok(xff_str) = xff.to_str() {
                if let Some(ip) = xff_str.split(',').next() {
                    let ip = ip.trim();
                    if !ip.is_empty() {
                        return Ok(ClientIp(Some(ip.to_string())));
                    }
                }
            }
        }

        if let Some(real_ip) = parts.headers.get("X-Real-IP") {
            if let Ok(ip) = real_ip.to_str() {
                return Ok(ClientIp(Some(ip.to_string())));
            }
        }

        Ok(ClientIp(None))
    }
}

/// JSON body extractor that keeps rejections inside the API's error
/// envelope.
///
/// A body that is not valid JSON, or carries a type-mismatched field,
/// answers with the same 400 shape as a field-rule violation; clients
/// only ever see one failure format.
pub struct JsonPayload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonPayload<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::malformed(rejection.body_text())),
        }
    }
}
