//! JSON error envelope: `{ "error": { "code", "message" } }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use ts_core::error::RouterError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }
}

impl From<RouterError> for ApiError {
    fn from(err: RouterError) -> Self {
        let (status, code) = match &err {
            RouterError::NoModelsAvailable => (StatusCode::SERVICE_UNAVAILABLE, "no_models_available"),
            RouterError::Config(_) | RouterError::InvalidModel { .. } => (StatusCode::BAD_REQUEST, "bad_request"),
            RouterError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };
        Self::new(status, code, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let envelope = json!({ "error": { "code": self.code, "message": self.message } });
        (self.status, Json(envelope)).into_response()
    }
}
