//! Auth HTTP Routes
//!
//! - `POST /auth/login`: credentials in, bearer token out
//! - `GET /auth/protected`: echoes the caller resolved from the token

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ApiResult;
use super::extract::{ApiJson, Authenticated};
use super::state::AppState;
use crate::auth::{LoginRequest, TokenResponse};

/// Auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login_handler))
        .route("/auth/protected", get(protected_handler))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProtectedResponse {
    pub message: String,
    pub user_id: Uuid,
    pub is_admin: bool,
}

/// Login handler
async fn login_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    Ok(Json(state.auth.login(&request)?))
}

/// Token echo
async fn protected_handler(Authenticated(caller): Authenticated) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: format!("Hello, user {}", caller.subject_id),
        user_id: caller.subject_id,
        is_admin: caller.is_admin,
    })
}
