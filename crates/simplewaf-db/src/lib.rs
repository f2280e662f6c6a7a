//! # SimpleWAF DB
//!
//! Persistence for the SimpleWAF management API.
//!
//! Each resource has an `async_trait` repository trait with two
//! implementations: an in-memory store used by tests and single-node
//! deployments, and a PostgreSQL store backed by a [`sqlx::PgPool`].
//! [`Repositories`] bundles one of each trait behind `Arc<dyn ...>` so the
//! server never depends on which backend was chosen.
//!
//! # Example
//!
//! ```ignore
//! use simplewaf_db::{Repositories, init_db_pool, run_migrations};
//!
//! let repos = match database_url {
//!     Some(url) => {
//!         let pool = init_db_pool(&url, 10).await?;
//!         run_migrations(&pool).await?;
//!         Repositories::postgres(pool)
//!     }
//!     None => Repositories::memory(),
//! };
//! ```

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

pub mod audit;
pub mod certificates;
pub mod error;
pub mod settings;
pub mod sites;
pub mod users;
pub mod waf_logs;

pub use audit::{AuditRepository, MemoryAuditRepository, PgAuditRepository};
pub use certificates::{CertificateRepository, MemoryCertificateRepository, PgCertificateRepository};
pub use error::StoreError;
pub use settings::{MemorySettingsRepository, PgSettingsRepository, SettingsRepository};
pub use sites::{MemorySiteRepository, PgSiteRepository, SiteRepository};
pub use users::{MemoryUserRepository, PgUserRepository, UserRepository};
pub use waf_logs::{MemoryWafLogRepository, PgWafLogRepository, WafLogRepository};

/// Connects to PostgreSQL.
///
/// The returned pool is cheaply cloneable and should be created once during
/// startup.
pub async fn init_db_pool(database_url: &str, max_connections: u32) -> Result<sqlx::PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Applies the bundled schema migrations.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// One repository per resource, shared by every request.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub sites: Arc<dyn SiteRepository>,
    pub certificates: Arc<dyn CertificateRepository>,
    pub waf_logs: Arc<dyn WafLogRepository>,
    pub audit: Arc<dyn AuditRepository>,
    pub settings: Arc<dyn SettingsRepository>,
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}

impl Repositories {
    pub fn memory() -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::default()),
            sites: Arc::new(MemorySiteRepository::default()),
            certificates: Arc::new(MemoryCertificateRepository::default()),
            waf_logs: Arc::new(MemoryWafLogRepository::default()),
            audit: Arc::new(MemoryAuditRepository::default()),
            settings: Arc::new(MemorySettingsRepository::default()),
        }
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            sites: Arc::new(PgSiteRepository::new(pool.clone())),
            certificates: Arc::new(PgCertificateRepository::new(pool.clone())),
            waf_logs: Arc::new(PgWafLogRepository::new(pool.clone())),
            audit: Arc::new(PgAuditRepository::new(pool.clone())),
            settings: Arc::new(PgSettingsRepository::new(pool)),
        }
    }
}
