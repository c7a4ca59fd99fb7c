//! # Facade Errors
//!
//! The single error type handed to the HTTP layer. Lower-layer errors
//! convert into it with `?`.

use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;
use crate::model::ModelError;
use crate::repository::RepositoryError;

/// Result type for facade operations
pub type FacadeResult<T> = Result<T, FacadeError>;

/// Business-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FacadeError {
    /// Bad input or a violated business rule
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Missing or invalid credentials
    #[error("{0}")]
    Authentication(String),

    /// Authenticated but not allowed
    #[error("{0}")]
    Authorization(String),

    /// Storage-level unique key collision
    #[error("{0}")]
    Conflict(String),

    /// Anything else. The detail is for logs, never for clients.
    #[error("Internal server error")]
    Internal(String),
}

impl FacadeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unauthorized_action() -> Self {
        Self::Authorization("Unauthorized action".to_string())
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            FacadeError::Validation(_) => 400,
            FacadeError::Authentication(_) => 401,
            FacadeError::Authorization(_) => 403,
            FacadeError::NotFound(_) => 404,
            FacadeError::Conflict(_) => 409,
            FacadeError::Internal(_) => 500,
        }
    }
}

/// "users" -> "User", "amenities" -> "Amenity"
fn entity_label(kind: &str) -> &'static str {
    match kind {
        "users" => "User",
        "places" => "Place",
        "amenities" => "Amenity",
        "reviews" => "Review",
        _ => "Entity",
    }
}

impl From<ModelError> for FacadeError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Validation(msg) => FacadeError::Validation(msg),
            other => FacadeError::Internal(other.to_string()),
        }
    }
}

impl From<RepositoryError> for FacadeError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { kind, .. } => {
                FacadeError::NotFound(format!("{} not found", entity_label(kind)))
            }
            RepositoryError::Conflict(msg) => FacadeError::Conflict(msg),
            RepositoryError::Model(model) => model.into(),
            other => {
                if other.is_fatal() {
                    error!(error = %other, code = other.code(), "stored data failed verification");
                }
                FacadeError::Internal(format!("{} ({})", other, other.code()))
            }
        }
    }
}

impl From<AuthError> for FacadeError {
    fn from(err: AuthError) -> Self {
        match err.status_code() {
            401 => FacadeError::Authentication(err.to_string()),
            403 => FacadeError::Authorization(err.to_string()),
            _ => FacadeError::Internal(err.to_string()),
        }
    }
}
