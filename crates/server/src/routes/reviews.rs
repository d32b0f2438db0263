use axum::{extract::{Path, State}, http::StatusCode, Json};
use serde_json::{json, Value};

use service::document::Review;
use service::reviews::{IndexedReview, ReviewInput};

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::routes::AppState;

/// All reviews in insertion order; empty list when there are none
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Review>>, JsonApiError> {
    Ok(Json(state.reviews.list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ReviewInput>,
) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    let review = state.reviews.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Review submitted successfully!", "review": review })),
    ))
}

/// Reviews for one username, each tagged with its current index
pub async fn by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<IndexedReview>>, JsonApiError> {
    let hits = state.reviews.find_by_username(&username).await?;
    if hits.is_empty() {
        return Err(JsonApiError::not_found("No reviews found for this username"));
    }
    Ok(Json(hits))
}

/// `key` is a review id or an index, depending on the configured addressing
pub async fn update(
    State(state): State<AppState>,
    Path(key): Path<String>,
    ApiJson(input): ApiJson<ReviewInput>,
) -> Result<Json<Value>, JsonApiError> {
    let review = state.reviews.update(&key, input).await?;
    Ok(Json(json!({ "success": true, "message": "Review updated successfully.", "review": review })))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, JsonApiError> {
    let removed = state.reviews.delete(&key).await?;
    Ok(Json(json!({ "success": true, "message": "Review deleted successfully.", "deleted": [removed] })))
}

pub async fn update_owned(
    State(state): State<AppState>,
    Path((username, id)): Path<(String, String)>,
    ApiJson(input): ApiJson<ReviewInput>,
) -> Result<Json<Value>, JsonApiError> {
    let review = state.reviews.update_owned(&username, &id, input).await?;
    Ok(Json(json!({ "success": true, "message": "Review updated successfully.", "review": review })))
}

pub async fn delete_owned(
    State(state): State<AppState>,
    Path((username, id)): Path<(String, String)>,
) -> Result<Json<Value>, JsonApiError> {
    let removed = state.reviews.delete_owned(&username, &id).await?;
    Ok(Json(json!({ "success": true, "message": "Review deleted successfully!", "deleted": [removed] })))
}
