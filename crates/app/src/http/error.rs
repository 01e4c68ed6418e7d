use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use threadboard_core::BoardError;

#[derive(Debug, Error)]
pub enum BoardApiError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("{0}")]
    BadRequest(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl BoardApiError {
    fn status(&self) -> StatusCode {
        match self {
            BoardApiError::Board(err) => match err {
                BoardError::Validation(_) | BoardError::Mismatch { .. } => StatusCode::BAD_REQUEST,
                BoardError::NotFound { .. } => StatusCode::NOT_FOUND,
                BoardError::Forbidden(_) => StatusCode::FORBIDDEN,
                BoardError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            BoardApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for BoardApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "board storage failure");
            "internal storage error".to_string()
        } else {
            warn!(error = %self, status = status.as_u16(), "board api error");
            self.to_string()
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}
