//! # Caller Context
//!
//! Identity of the current request, resolved once from the bearer token and
//! passed explicitly to the facade.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use uuid::Uuid;

use super::errors::{AuthError, AuthResult};
use crate::model::OwnedByUser;

/// Authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// The authenticated user's ID
    pub subject_id: Uuid,

    /// Admin claim from the token. Only honored together with the stored flag.
    pub is_admin: bool,
}

impl Caller {
    pub fn new(subject_id: Uuid, is_admin: bool) -> Self {
        Self {
            subject_id,
            is_admin,
        }
    }

    /// Fail unless the caller is an administrator
    pub fn require_admin(&self) -> AuthResult<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AuthError::AdminRequired)
        }
    }

    /// Whether the caller may modify `entity`: its owner, or an admin whose
    /// stored account is still an admin. `stored_admin` is only consulted
    /// for non-owners carrying the admin claim.
    pub fn can_modify(
        &self,
        entity: &impl OwnedByUser,
        stored_admin: impl FnOnce(Uuid) -> bool,
    ) -> bool {
        entity.is_owner(self.subject_id) || (self.is_admin && stored_admin(self.subject_id))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> AuthResult<&str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::AuthenticationRequired)?
        .to_str()
        .map_err(|_| AuthError::MalformedToken)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MalformedToken)
}
