use axum::extract::State;
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::http::error::BoardApiError;
use crate::http::extract::{ApiJson, ApiPath};
use crate::http::middleware::caller_auth::CallerIdentity;
use crate::state::AppState;
use threadboard_core::domain::{Post, PostId, PostPatch};

pub const BOARDS_PATH: &str = "/api/boards";

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

pub async fn create_post(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    ApiJson(payload): ApiJson<CreatePostRequest>,
) -> Result<impl IntoResponse, BoardApiError> {
    let title = payload.title.as_deref().unwrap_or_default();
    let content = payload.content.as_deref().unwrap_or_default();
    let post = state.board.create_post(title, content, &caller).await?;
    let location = format!("{BOARDS_PATH}/{}", post.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(post)))
}

pub async fn list_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<Post>>, BoardApiError> {
    Ok(Json(state.board.list_posts().await?))
}

pub async fn get_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PostId>,
) -> Result<Json<Post>, BoardApiError> {
    Ok(Json(state.board.get_post(id).await?))
}

pub async fn update_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PostId>,
    CallerIdentity(caller): CallerIdentity,
    ApiJson(patch): ApiJson<PostPatch>,
) -> Result<Json<Post>, BoardApiError> {
    Ok(Json(state.board.update_post(id, &patch, &caller).await?))
}

pub async fn delete_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PostId>,
    CallerIdentity(caller): CallerIdentity,
) -> Result<StatusCode, BoardApiError> {
    state.board.delete_post(id, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}
