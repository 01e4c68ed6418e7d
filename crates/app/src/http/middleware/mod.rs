pub mod caller_auth;
