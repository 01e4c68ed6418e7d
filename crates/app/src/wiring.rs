use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::state::AppState;
use threadboard_core::store::{BoardRepository, MemoryBoardRepository};
use threadboard_core::BoardService;
use threadboard_infra::auth::{AuthTokenError, JwtAuthority};
use threadboard_infra::db::{connect_lazy, DbPoolError, PgBoardRepository};
use threadboard_infra::BoardBackend;

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("db error: {0}")]
    Db(#[from] DbPoolError),
    #[error("auth error: {0}")]
    Auth(#[from] AuthTokenError),
}

pub fn build_state(config: AppConfig) -> Result<AppState, WiringError> {
    let (backend, db) = match config.database_url.as_deref() {
        Some(url) => {
            let pool = connect_lazy(url, config.db_max_connections)?;
            (BoardBackend::Postgres(PgBoardRepository::new(pool.clone())), Some(pool))
        }
        None => {
            warn!("THREADBOARD_DATABASE_URL not set; using in-memory store");
            (BoardBackend::Memory(MemoryBoardRepository::new()), None)
        }
    };
    let auth = match config.jwt_secret.as_deref() {
        Some(secret) => Some(Arc::new(JwtAuthority::new(secret)?)),
        None => {
            warn!("THREADBOARD_JWT_SECRET not set; mutating routes will refuse requests");
            None
        }
    };
    info!(backend = backend.backend_name(), "board storage ready");
    Ok(AppState {
        config: Arc::new(config),
        board: Arc::new(BoardService::new(backend)),
        auth,
        db,
    })
}
