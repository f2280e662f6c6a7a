use axum::extract::State;
use tracing::instrument;

use simplewaf_core::{ApiResponse, AppError};
use simplewaf_models::config::GlobalConfig;

use crate::middleware::CurrentUser;
use crate::modules::config::service::ConfigService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[instrument(skip(state))]
pub async fn get_config(State(state): State<AppState>) -> Result<ApiResponse<GlobalConfig>, AppError> {
    let config = ConfigService::get_config(&state).await?;
    Ok(ApiResponse::ok(config))
}

#[instrument(skip(state, config))]
pub async fn update_config(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ValidatedJson(config): ValidatedJson<GlobalConfig>,
) -> Result<ApiResponse<GlobalConfig>, AppError> {
    let config = ConfigService::update_config(&state, &actor, config).await?;
    Ok(ApiResponse::ok(config))
}
