//! Request extractors: JSON bodies that fail with 400, and bearer-token
//! callers.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::error::ApiError;
use super::state::AppState;
use crate::auth::{AuthError, Caller};
use crate::services::FacadeError;

/// JSON body whose rejections (bad syntax, wrong types, missing fields,
/// wrong content type) are reported as 400.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Any authenticated caller
#[derive(Debug, Clone, Copy)]
pub struct Authenticated(pub Caller);

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self(state.auth.authenticate(&parts.headers)?))
    }
}

/// Authenticated caller whose token and stored account are both admin
#[derive(Debug, Clone, Copy)]
pub struct AdminOnly(pub Caller);

#[async_trait]
impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let caller = state.auth.authenticate_admin(&parts.headers)?;
        if !state.facade.is_admin(caller.subject_id) {
            return Err(AuthError::AdminRequired.into());
        }
        Ok(Self(caller))
    }
}

/// Parse a path id. Anything that is not a UUID cannot name an entity.
pub fn parse_id(raw: &str, label: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| FacadeError::not_found(format!("{} not found", label)).into())
}
