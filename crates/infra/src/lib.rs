pub mod auth;
pub mod backend;
pub mod db;

pub use backend::{BoardBackend, BoardBackendStore};
