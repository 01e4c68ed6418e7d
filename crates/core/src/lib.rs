pub mod domain;
pub mod error;
pub mod policy;
pub mod service;
pub mod store;
pub mod tree;
pub mod types;

pub use error::{BoardError, BoardResult};
pub use service::BoardService;
