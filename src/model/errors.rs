//! # Model Errors
//!
//! Error types raised by entity constructors and mutators.

use thiserror::Error;

/// Result type for entity operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Entity construction and mutation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A field failed validation; the message is safe to show to clients
    #[error("{0}")]
    Validation(String),

    /// The password could not be hashed
    #[error("Internal error: password hashing failed")]
    PasswordHashing,
}

impl ModelError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
