pub mod board_repo;
pub mod migrations;
pub mod pool;

pub use board_repo::{BoardRepoError, PgBoardRepository, PgBoardStore};
pub use migrations::run_migrations;
pub use pool::{connect_lazy, DbPool, DbPoolError};
