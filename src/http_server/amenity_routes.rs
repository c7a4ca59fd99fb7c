//! Amenity HTTP Routes
//!
//! Reads are public; writes need an admin.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::error::ApiResult;
use super::extract::{parse_id, AdminOnly, ApiJson};
use super::state::AppState;
use crate::model::AmenityView;
use crate::services::{CreateAmenity, UpdateAmenity};

/// Amenity routes
pub fn amenity_routes() -> Router<AppState> {
    Router::new()
        .route("/amenities", get(list_amenities).post(create_amenity))
        .route("/amenities/", get(list_amenities).post(create_amenity))
        .route("/amenities/:amenity_id", get(get_amenity).put(update_amenity))
}

async fn list_amenities(State(state): State<AppState>) -> ApiResult<Json<Vec<AmenityView>>> {
    let amenities = state.facade.get_all_amenities()?;
    Ok(Json(amenities.iter().map(|a| a.view()).collect()))
}

pub(crate) async fn create_amenity(
    AdminOnly(_): AdminOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateAmenity>,
) -> ApiResult<(StatusCode, Json<AmenityView>)> {
    let amenity = state.facade.create_amenity(request)?;
    Ok((StatusCode::CREATED, Json(amenity.view())))
}

async fn get_amenity(
    State(state): State<AppState>,
    Path(amenity_id): Path<String>,
) -> ApiResult<Json<AmenityView>> {
    let amenity_id = parse_id(&amenity_id, "Amenity")?;
    Ok(Json(state.facade.get_amenity(amenity_id)?.view()))
}

async fn update_amenity(
    AdminOnly(_): AdminOnly,
    State(state): State<AppState>,
    Path(amenity_id): Path<String>,
    ApiJson(request): ApiJson<UpdateAmenity>,
) -> ApiResult<Json<AmenityView>> {
    let amenity_id = parse_id(&amenity_id, "Amenity")?;
    Ok(Json(state.facade.update_amenity(amenity_id, request)?.view()))
}
