//! User HTTP Routes
//!
//! Listing and reading need a token; creating and updating need an admin.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::error::ApiResult;
use super::extract::{parse_id, AdminOnly, ApiJson, Authenticated};
use super::state::AppState;
use crate::model::UserView;
use crate::services::{CreateUser, UpdateUser};

/// User routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/", get(list_users).post(create_user))
        .route("/users/:user_id", get(get_user).put(update_user))
}

pub(crate) async fn list_users(
    Authenticated(_): Authenticated,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<UserView>>> {
    let users = state.facade.get_all_users()?;
    Ok(Json(users.iter().map(|u| u.view()).collect()))
}

pub(crate) async fn create_user(
    AdminOnly(_): AdminOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateUser>,
) -> ApiResult<(StatusCode, Json<UserView>)> {
    let user = state.facade.create_user(request)?;
    Ok((StatusCode::CREATED, Json(user.view())))
}

async fn get_user(
    Authenticated(_): Authenticated,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserView>> {
    let user_id = parse_id(&user_id, "User")?;
    Ok(Json(state.facade.get_user(user_id)?.view()))
}

pub(crate) async fn update_user(
    AdminOnly(_): AdminOnly,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(request): ApiJson<UpdateUser>,
) -> ApiResult<Json<UserView>> {
    let user_id = parse_id(&user_id, "User")?;
    Ok(Json(state.facade.update_user(user_id, request)?.view()))
}
