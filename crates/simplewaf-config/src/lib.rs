//! # SimpleWAF Config
//!
//! Configuration types for the SimpleWAF management API.
//!
//! Every structure is loaded from environment variables with sensible
//! defaults, after an optional `.env` file has been read by [`load_dotenv`]:
//!
//! - [`jwt`]: token signing secret and lifetime
//! - [`cors`]: allowed browser origins
//! - [`server`]: listen address and optional PostgreSQL connection
//! - [`bootstrap`]: first-run administrator account and bcrypt cost
//!
//! # Example
//!
//! ```ignore
//! use simplewaf_config::{JwtConfig, ServerConfig};
//!
//! simplewaf_config::load_dotenv();
//! let jwt = JwtConfig::from_env();
//! let server = ServerConfig::from_env();
//! ```

use std::path::PathBuf;

pub mod bootstrap;
pub mod cors;
pub mod jwt;
pub mod server;

// Re-export commonly used types at crate root
pub use bootstrap::BootstrapConfig;
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;

/// Reads `.env` from the working directory or one of its parents, returning
/// the file that was loaded. A missing file is not an error.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_dotenv_reports_loaded_file() {
        if let Some(path) = load_dotenv() {
            assert!(path.ends_with(".env"));
        }
    }

    #[test]
    fn test_env_or_falls_back_when_unset() {
        assert_eq!(env_or("SIMPLEWAF_CONFIG_TEST_UNSET", 42_u16), 42);
    }
}
