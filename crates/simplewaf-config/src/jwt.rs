use std::env;

use crate::env_or;

pub const DEFAULT_TOKEN_EXPIRY_SECS: i64 = 86_400;

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in seconds.
    pub token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "simplewaf-secret-change-in-production".to_string()),
            token_expiry: env_or("JWT_EXPIRY", DEFAULT_TOKEN_EXPIRY_SECS), // 24 hours
        }
    }

    pub fn new(secret: impl Into<String>, token_expiry: i64) -> Self {
        Self {
            secret: secret.into(),
            token_expiry,
        }
    }
}
