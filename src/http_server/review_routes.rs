//! Review HTTP Routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use super::error::ApiResult;
use super::extract::{parse_id, ApiJson, Authenticated};
use super::state::AppState;
use crate::model::ReviewView;
use crate::services::{CreateReview, UpdateReview};

/// Review routes
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(list_reviews).post(create_review))
        .route("/reviews/", get(list_reviews).post(create_review))
        .route(
            "/reviews/:review_id",
            get(get_review).put(update_review).delete(delete_review),
        )
}

async fn list_reviews(State(state): State<AppState>) -> ApiResult<Json<Vec<ReviewView>>> {
    let reviews = state.facade.get_all_reviews()?;
    Ok(Json(reviews.iter().map(|r| r.view()).collect()))
}

/// The caller is always the author
async fn create_review(
    Authenticated(caller): Authenticated,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateReview>,
) -> ApiResult<(StatusCode, Json<ReviewView>)> {
    let review = state.facade.create_review(request, Some(caller.subject_id))?;
    Ok((StatusCode::CREATED, Json(review.view())))
}

async fn get_review(
    Authenticated(_): Authenticated,
    State(state): State<AppState>,
    Path(review_id): Path<String>,
) -> ApiResult<Json<ReviewView>> {
    let review_id = parse_id(&review_id, "Review")?;
    Ok(Json(state.facade.get_review(review_id)?.view()))
}

async fn update_review(
    Authenticated(caller): Authenticated,
    State(state): State<AppState>,
    Path(review_id): Path<String>,
    ApiJson(request): ApiJson<UpdateReview>,
) -> ApiResult<Json<ReviewView>> {
    let review_id = parse_id(&review_id, "Review")?;
    let review = state.facade.update_review(review_id, request, Some(&caller))?;
    Ok(Json(review.view()))
}

async fn delete_review(
    Authenticated(caller): Authenticated,
    State(state): State<AppState>,
    Path(review_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let review_id = parse_id(&review_id, "Review")?;
    state.facade.delete_review(review_id, Some(&caller))?;
    Ok(Json(json!({"message": "Review deleted successfully"})))
}
