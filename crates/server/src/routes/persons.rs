use axum::{extract::{Path, State}, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use service::document::{GalleryItem, Person, Video};
use service::persons::PersonInput;

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::routes::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MessageBody {
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VoiceBody {
    pub voice: Option<String>,
}

fn ok() -> Json<Value> {
    Json(json!({ "success": true }))
}

fn ok_with(message: &str) -> Json<Value> {
    Json(json!({ "success": true, "message": message }))
}

/// List every person in stored order
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Person>>, JsonApiError> {
    Ok(Json(state.persons.list().await?))
}

/// Fetch the first person with the given id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Person>, JsonApiError> {
    Ok(Json(state.persons.get(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<PersonInput>,
) -> Result<(StatusCode, Json<Person>), JsonApiError> {
    let person = state.persons.create(input).await?;
    Ok((StatusCode::CREATED, Json(person)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, JsonApiError> {
    state.persons.delete(&id).await?;
    Ok(ok())
}

pub async fn set_custom_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<MessageBody>,
) -> Result<Json<Value>, JsonApiError> {
    state.persons.set_custom_message(&id, body.message).await?;
    Ok(ok())
}

pub async fn clear_custom_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, JsonApiError> {
    state.persons.clear_custom_message(&id).await?;
    Ok(ok())
}

/// Append an image reference; responds with the updated person
pub async fn add_gallery_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(item): ApiJson<GalleryItem>,
) -> Result<Json<Person>, JsonApiError> {
    Ok(Json(state.persons.add_gallery_item(&id, item).await?))
}

pub async fn remove_gallery_item(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, String)>,
) -> Result<Json<Value>, JsonApiError> {
    state.persons.remove_gallery_item(&id, &index).await?;
    Ok(ok_with("Image deleted."))
}

pub async fn add_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(video): ApiJson<Video>,
) -> Result<Json<Person>, JsonApiError> {
    Ok(Json(state.persons.add_video(&id, video).await?))
}

pub async fn remove_video(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, String)>,
) -> Result<Json<Value>, JsonApiError> {
    state.persons.remove_video(&id, &index).await?;
    Ok(ok_with("Video deleted."))
}

pub async fn set_voice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<VoiceBody>,
) -> Result<Json<Value>, JsonApiError> {
    state.persons.set_voice(&id, body.voice).await?;
    Ok(ok())
}

pub async fn clear_voice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, JsonApiError> {
    state.persons.clear_voice(&id).await?;
    Ok(ok_with("Voice deleted."))
}
