use crate::error::CommerceError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::sync::OnceLock;
use tracing::error;

static DEV_MODE: OnceLock<bool> = OnceLock::new();

/// Enables detailed error bodies for server faults. First call wins.
pub fn set_dev_mode(enabled: bool) {
    let _ = DEV_MODE.set(enabled);
}

fn dev_mode() -> bool {
    DEV_MODE.get().copied().unwrap_or(false)
}

/// Response-side wrapper turning [`CommerceError`] into the JSON error
/// envelope `{success: false, message, errors?|error?}`.
pub struct ApiError(pub CommerceError);

impl<E: Into<CommerceError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            CommerceError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "message": "Validation failed",
                    "errors": errors,
                }),
            ),
            CommerceError::Coupon(err) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": err.to_string() }),
            ),
            CommerceError::Conflict(message) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": message }),
            ),
            CommerceError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                json!({ "success": false, "message": message }),
            ),
            CommerceError::ExternalService(message) => {
                error!(%message, "upstream service failure");
                (
                    StatusCode::BAD_GATEWAY,
                    json!({ "success": false, "message": "Upstream service unavailable" }),
                )
            }
            err => {
                error!(error = %err, "request failed");
                let mut body = json!({
                    "success": false,
                    "message": "Internal server error",
                });
                if dev_mode() {
                    body["error"] = json!(err.to_string());
                }
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };
        (status, Json(body)).into_response()
    }
}
