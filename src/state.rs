use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{OnceCell, broadcast};
use tracing::info;

use simplewaf_auth::TokenCodec;
use simplewaf_config::{BootstrapConfig, CorsConfig, JwtConfig, ServerConfig};
use simplewaf_core::{AppError, PermissionRegistry, hash_password_with_cost};
use simplewaf_db::{Repositories, init_db_pool, run_migrations};

use crate::bootstrap::ensure_admin;
use crate::pipeline::GateFactory;

/// A restart request published for the engine supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartRequest {
    pub requested_by: String,
    pub requested_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub repos: Repositories,
    pub tokens: Arc<TokenCodec>,
    pub permissions: Arc<PermissionRegistry>,
    pub cors_config: CorsConfig,
    pub password_cost: u32,
    pub restart_tx: broadcast::Sender<RestartRequest>,
    pub started_at: DateTime<Utc>,
    /// Hash checked when a login names no account, built on first use.
    pub decoy_hash: Arc<OnceCell<String>>,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        jwt_config: &JwtConfig,
        cors_config: CorsConfig,
        password_cost: u32,
    ) -> Self {
        let (restart_tx, _) = broadcast::channel(8);
        Self {
            repos,
            tokens: Arc::new(TokenCodec::from_config(jwt_config)),
            permissions: Arc::new(PermissionRegistry::new()),
            cors_config,
            password_cost,
            restart_tx,
            started_at: Utc::now(),
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// In-memory state with a fixed secret and a cheap bcrypt cost.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn for_tests() -> Self {
        Self::new(
            Repositories::memory(),
            &JwtConfig::new("test-secret", 3600),
            CorsConfig {
                allowed_origins: vec!["http://localhost:5173".to_string()],
            },
            4,
        )
    }

    pub fn gate_factory(&self) -> GateFactory {
        GateFactory::new(
            self.repos.users.clone(),
            self.tokens.clone(),
            self.permissions.clone(),
        )
    }

    /// A bcrypt hash at the configured cost that no password matches in
    /// practice, so failed logins cost the same whether or not the account
    /// exists.
    pub async fn login_decoy_hash(&self) -> Result<&str, AppError> {
        let hash = self
            .decoy_hash
            .get_or_try_init(|| async {
                hash_password_with_cost(&uuid::Uuid::new_v4().to_string(), self.password_cost)
            })
            .await?;
        Ok(hash.as_str())
    }

    pub fn subscribe_restarts(&self) -> broadcast::Receiver<RestartRequest> {
        self.restart_tx.subscribe()
    }
}

/// Connects storage, applies migrations and seeds the first administrator.
///
/// Without `DATABASE_URL` every repository is kept in memory.
pub async fn init_app_state(
    server: &ServerConfig,
    bootstrap: &BootstrapConfig,
) -> anyhow::Result<AppState> {
    let repos = match &server.database_url {
        Some(url) => {
            let pool = init_db_pool(url, server.database_max_connections).await?;
            run_migrations(&pool).await?;
            info!("connected to PostgreSQL");
            Repositories::postgres(pool)
        }
        None => {
            info!("DATABASE_URL not set, using in-memory storage");
            Repositories::memory()
        }
    };

    if let Some(admin) = ensure_admin(repos.users.as_ref(), bootstrap).await? {
        info!(username = %admin.username, "created bootstrap administrator");
    }

    Ok(AppState::new(
        repos,
        &JwtConfig::from_env(),
        CorsConfig::from_env(),
        bootstrap.password_cost,
    ))
}
