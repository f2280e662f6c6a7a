use std::env;

use crate::env_or;

/// Account created on first start when no user exists yet.
///
/// The account is always flagged for a password reset, so the default
/// password only ever grants access to `/auth/reset-password`.
#[derive(Clone, Debug)]
pub struct BootstrapConfig {
    pub admin_username: String,
    pub admin_password: String,
    pub password_cost: u32,
}

impl BootstrapConfig {
    pub fn from_env() -> Self {
        Self {
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string()),
            password_cost: env_or("BCRYPT_COST", 12),
        }
    }
}
