//! # Repository Errors
//!
//! Error codes:
//! - HBNB_NOT_FOUND: no entity with the requested id
//! - HBNB_CONFLICT: id or unique key already taken
//! - HBNB_STORAGE_IO: disk or lock failure
//! - HBNB_DATA_CORRUPTION: table file failed its checksum or could not be parsed

use thiserror::Error;
use uuid::Uuid;

use crate::model::ModelError;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },

    /// Id or unique key collision
    #[error("{0}")]
    Conflict(String),

    /// A patch failed entity validation; nothing was stored
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Data corruption: {0}")]
    Corruption(String),
}

impl RepositoryError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }

    /// Stable error code for logs
    pub fn code(&self) -> &'static str {
        match self {
            RepositoryError::NotFound { .. } => "HBNB_NOT_FOUND",
            RepositoryError::Conflict(_) => "HBNB_CONFLICT",
            RepositoryError::Model(_) => "HBNB_VALIDATION",
            RepositoryError::Storage(_) => "HBNB_STORAGE_IO",
            RepositoryError::Corruption(_) => "HBNB_DATA_CORRUPTION",
        }
    }

    /// Corruption means the data directory cannot be trusted
    pub fn is_fatal(&self) -> bool {
        matches!(self, RepositoryError::Corruption(_))
    }
}
