use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthTokenError {
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("token subject is empty")]
    EmptySubject,
    #[error("jwt secret is empty")]
    EmptySecret,
}

#[derive(Debug, Serialize, Deserialize)]
struct CallerClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies HS256 caller tokens. The verified `sub` claim is the
/// caller identity handed to the board service.
#[derive(Clone)]
pub struct JwtAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtAuthority {
    pub fn new(secret: &str) -> Result<Self, AuthTokenError> {
        if secret.is_empty() {
            return Err(AuthTokenError::EmptySecret);
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn issue(&self, subject: &str, ttl_secs: i64) -> Result<String, AuthTokenError> {
        if subject.trim().is_empty() {
            return Err(AuthTokenError::EmptySubject);
        }
        let now = Utc::now().timestamp();
        let claims = CallerClaims {
            sub: subject.to_string(),
            iat: now,
            exp: now.saturating_add(ttl_secs),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Returns the caller identity carried by a valid, unexpired token.
    pub fn verify(&self, token: &str) -> Result<String, AuthTokenError> {
        let data = decode::<CallerClaims>(token, &self.decoding, &self.validation)?;
        if data.claims.sub.trim().is_empty() {
            return Err(AuthTokenError::EmptySubject);
        }
        Ok(data.claims.sub)
    }
}
