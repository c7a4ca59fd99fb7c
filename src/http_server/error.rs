//! Error responses.
//!
//! Every failure leaves the server as `{"error": "<message>", "code": <status>}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::auth::AuthError;
use crate::services::FacadeError;

/// Error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

/// Handler error
#[derive(Debug)]
pub struct ApiError(pub FacadeError);

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

impl From<FacadeError> for ApiError {
    fn from(err: FacadeError) -> Self {
        Self(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(FacadeError::validation(format!(
            "Invalid input payload: {}",
            rejection.body_text()
        )))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.status_code();
        if let FacadeError::Internal(detail) = &self.0 {
            error!(detail = %detail, "request failed");
        }

        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            error: self.0.to_string(),
            code,
        };
        (status, Json(body)).into_response()
    }
}
