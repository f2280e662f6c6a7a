use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use tokio::sync::RwLock;

use simplewaf_models::config::GlobalConfig;

use crate::error::StoreError;

const GLOBAL_CONFIG_KEY: &str = "global";

/// Persistence for the global configuration document.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Returns `None` until a document has been saved.
    async fn load(&self) -> Result<Option<GlobalConfig>, StoreError>;
    async fn save(&self, config: &GlobalConfig) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemorySettingsRepository {
    config: RwLock<Option<GlobalConfig>>,
}

#[async_trait]
impl SettingsRepository for MemorySettingsRepository {
    async fn load(&self) -> Result<Option<GlobalConfig>, StoreError> {
        Ok(self.config.read().await.clone())
    }

    async fn save(&self, config: &GlobalConfig) -> Result<(), StoreError> {
        *self.config.write().await = Some(config.clone());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PgSettingsRepository {
    pool: PgPool,
}

impl PgSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for PgSettingsRepository {
    async fn load(&self) -> Result<Option<GlobalConfig>, StoreError> {
        let value: Option<Json<GlobalConfig>> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = $1")
                .bind(GLOBAL_CONFIG_KEY)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value.map(|Json(config)| config))
    }

    async fn save(&self, config: &GlobalConfig) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO settings (key, value, updated_at)
               VALUES ($1, $2, NOW())
               ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()"#,
        )
        .bind(GLOBAL_CONFIG_KEY)
        .bind(Json(config))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
