use tracing::{info, instrument};

use simplewaf_core::AppError;
use simplewaf_models::audit::{actions, resources};
use simplewaf_models::config::GlobalConfig;

use crate::modules::audit::AuditService;
use crate::pipeline::Identity;
use crate::state::AppState;

pub struct ConfigService;

impl ConfigService {
    /// The stored document, or the built-in defaults when nothing was saved yet.
    #[instrument(skip(state))]
    pub async fn get_config(state: &AppState) -> Result<GlobalConfig, AppError> {
        Ok(state.repos.settings.load().await?.unwrap_or_default())
    }

    #[instrument(skip(state, config))]
    pub async fn update_config(
        state: &AppState,
        actor: &Identity,
        config: GlobalConfig,
    ) -> Result<GlobalConfig, AppError> {
        state.repos.settings.save(&config).await?;
        info!(updated_by = %actor.username, "global configuration updated");

        AuditService::record(
            state,
            AuditService::entry(actor, actions::UPDATE, resources::CONFIG)
                .details(serde_json::to_value(&config).unwrap_or_default()),
        )
        .await;

        Ok(config)
    }
}
