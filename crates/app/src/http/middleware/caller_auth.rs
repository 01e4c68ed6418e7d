use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::warn;

use crate::http::error::ErrorBody;
use crate::state::AppState;
use threadboard_core::policy::Caller;

#[derive(Debug, Error)]
pub enum CallerAuthError {
    #[error("caller auth not configured")]
    MissingConfig,
    #[error("login required")]
    MissingToken,
    #[error("caller token invalid")]
    InvalidToken,
}

/// Identity of the caller, taken from a verified bearer token.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub Caller);

impl FromRequestParts<AppState> for CallerIdentity {
    type Rejection = CallerAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let authority = state.auth.as_ref().ok_or(CallerAuthError::MissingConfig)?;
        let token = extract_bearer_token(&parts.headers).ok_or(CallerAuthError::MissingToken)?;
        let subject = authority.verify(&token).map_err(|err| {
            warn!(error = %err, "caller token rejected");
            CallerAuthError::InvalidToken
        })?;
        Ok(CallerIdentity(Caller::new(subject)))
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let value = header.trim().strip_prefix("Bearer ")?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl IntoResponse for CallerAuthError {
    fn into_response(self) -> Response {
        let status = match self {
            CallerAuthError::MissingConfig => StatusCode::SERVICE_UNAVAILABLE,
            CallerAuthError::MissingToken | CallerAuthError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
        };
        (status, Json(ErrorBody { message: self.to_string() })).into_response()
    }
}
