pub mod jwt;

pub use jwt::{AuthTokenError, JwtAuthority};
