//! Admin HTTP Routes
//!
//! Everything under `/admin` requires an admin. Place and review updates
//! here skip the ownership check.

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};

use super::amenity_routes::create_amenity;
use super::error::ApiResult;
use super::extract::{parse_id, AdminOnly, ApiJson};
use super::state::AppState;
use super::user_routes::{create_user, update_user};
use crate::model::{PlaceView, ReviewView, UserView};
use crate::services::{UpdatePlace, UpdateReview};

/// Admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users).post(create_user))
        .route("/admin/users/:user_id", put(update_user))
        .route("/admin/amenities", post(create_amenity))
        .route("/admin/places/:place_id", put(update_any_place))
        .route("/admin/reviews/:review_id", put(update_any_review))
}

/// Admin-only listing
async fn list_users(
    AdminOnly(_): AdminOnly,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<UserView>>> {
    let users = state.facade.get_all_users()?;
    Ok(Json(users.iter().map(|u| u.view()).collect()))
}

async fn update_any_place(
    AdminOnly(_): AdminOnly,
    State(state): State<AppState>,
    Path(place_id): Path<String>,
    ApiJson(request): ApiJson<UpdatePlace>,
) -> ApiResult<Json<PlaceView>> {
    let place_id = parse_id(&place_id, "Place")?;
    Ok(Json(state.facade.update_place(place_id, request, None)?.view()))
}

async fn update_any_review(
    AdminOnly(_): AdminOnly,
    State(state): State<AppState>,
    Path(review_id): Path<String>,
    ApiJson(request): ApiJson<UpdateReview>,
) -> ApiResult<Json<ReviewView>> {
    let review_id = parse_id(&review_id, "Review")?;
    Ok(Json(state.facade.update_review(review_id, request, None)?.view()))
}
