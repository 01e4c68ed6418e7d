use std::sync::Arc;

use crate::config::AppConfig;
use threadboard_core::BoardService;
use threadboard_infra::auth::JwtAuthority;
use threadboard_infra::db::DbPool;
use threadboard_infra::BoardBackend;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub board: Arc<BoardService<BoardBackend>>,
    pub auth: Option<Arc<JwtAuthority>>,
    pub db: Option<DbPool>,
}
