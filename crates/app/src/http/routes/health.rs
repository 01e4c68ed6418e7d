use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;
use threadboard_core::store::BoardRepository;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage: StorageStatus,
    pub auth: AuthStatus,
}

#[derive(Debug, Serialize)]
pub struct StorageStatus {
    pub backend: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub configured: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        storage: StorageStatus {
            backend: state.board.repository().backend_name(),
        },
        auth: AuthStatus {
            configured: state.auth.is_some(),
        },
    })
}
