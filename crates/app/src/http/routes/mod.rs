pub mod boards;
pub mod comments;
pub mod health;
