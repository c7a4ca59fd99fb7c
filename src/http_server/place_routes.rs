//! Place HTTP Routes
//!
//! Anyone may browse. Creating needs a token (the caller becomes the
//! owner); updating needs the owner or an admin.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::error::ApiResult;
use super::extract::{parse_id, ApiJson, Authenticated};
use super::state::AppState;
use crate::model::{PlaceDetail, PlaceSummary, PlaceView, ReviewView};
use crate::services::{CreatePlace, UpdatePlace};

/// Place routes
pub fn place_routes() -> Router<AppState> {
    Router::new()
        .route("/places", get(list_places).post(create_place))
        .route("/places/", get(list_places).post(create_place))
        .route("/places/:place_id", get(get_place).put(update_place))
        .route("/places/:place_id/reviews", get(list_place_reviews))
}

async fn list_places(State(state): State<AppState>) -> ApiResult<Json<Vec<PlaceSummary>>> {
    Ok(Json(state.facade.get_place_summaries()?))
}

async fn create_place(
    Authenticated(caller): Authenticated,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePlace>,
) -> ApiResult<(StatusCode, Json<PlaceView>)> {
    let place = state.facade.create_place(request, Some(caller.subject_id))?;
    Ok((StatusCode::CREATED, Json(place.view())))
}

async fn get_place(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> ApiResult<Json<PlaceDetail>> {
    let place_id = parse_id(&place_id, "Place")?;
    Ok(Json(state.facade.get_place_detail(place_id)?))
}

async fn update_place(
    Authenticated(caller): Authenticated,
    State(state): State<AppState>,
    Path(place_id): Path<String>,
    ApiJson(request): ApiJson<UpdatePlace>,
) -> ApiResult<Json<PlaceView>> {
    let place_id = parse_id(&place_id, "Place")?;
    let place = state.facade.update_place(place_id, request, Some(&caller))?;
    Ok(Json(place.view()))
}

async fn list_place_reviews(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> ApiResult<Json<Vec<ReviewView>>> {
    let place_id = parse_id(&place_id, "Place")?;
    let reviews = state.facade.get_reviews_by_place(place_id)?;
    Ok(Json(reviews.iter().map(|r| r.view()).collect()))
}
