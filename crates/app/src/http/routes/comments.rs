use axum::extract::State;
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::http::error::BoardApiError;
use crate::http::extract::{ApiJson, ApiPath};
use crate::http::middleware::caller_auth::CallerIdentity;
use crate::http::routes::boards::BOARDS_PATH;
use crate::state::AppState;
use threadboard_core::domain::{Comment, CommentId, PostId};

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: Option<String>,
}

pub async fn list_comments(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<PostId>,
) -> Result<Json<Vec<Comment>>, BoardApiError> {
    Ok(Json(state.board.list_comments(post_id).await?))
}

pub async fn add_comment(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<PostId>,
    CallerIdentity(caller): CallerIdentity,
    ApiJson(payload): ApiJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, BoardApiError> {
    let content = payload.content.as_deref().unwrap_or_default();
    let comment = state.board.add_comment(post_id, content, &caller).await?;
    let location = format!("{BOARDS_PATH}/{post_id}/comments/{}", comment.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(comment)))
}

pub async fn list_replies(
    State(state): State<AppState>,
    ApiPath((post_id, comment_id)): ApiPath<(PostId, CommentId)>,
) -> Result<Json<Vec<Comment>>, BoardApiError> {
    Ok(Json(state.board.list_replies(post_id, comment_id).await?))
}

pub async fn add_reply(
    State(state): State<AppState>,
    ApiPath((post_id, comment_id)): ApiPath<(PostId, CommentId)>,
    CallerIdentity(caller): CallerIdentity,
    ApiJson(payload): ApiJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, BoardApiError> {
    let content = payload.content.as_deref().unwrap_or_default();
    let reply = state
        .board
        .add_reply(post_id, comment_id, content, &caller)
        .await?;
    let location = format!(
        "{BOARDS_PATH}/{post_id}/comments/{comment_id}/replies/{}",
        reply.id
    );
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(reply)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    ApiPath((post_id, id)): ApiPath<(PostId, CommentId)>,
    CallerIdentity(caller): CallerIdentity,
) -> Result<StatusCode, BoardApiError> {
    state.board.delete_comment(post_id, id, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}
