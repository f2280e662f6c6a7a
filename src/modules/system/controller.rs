use axum::extract::State;
use axum::http::StatusCode;
use tracing::instrument;

use simplewaf_core::{ApiResponse, AppError};
use simplewaf_models::system::{RestartResponse, SystemStatus};

use crate::middleware::CurrentUser;
use crate::modules::system::service::SystemService;
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn status(State(state): State<AppState>) -> Result<ApiResponse<SystemStatus>, AppError> {
    let status = SystemService::status(&state).await?;
    Ok(ApiResponse::ok(status))
}

#[instrument(skip(state, actor))]
pub async fn restart(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<ApiResponse<RestartResponse>, AppError> {
    let response = SystemService::request_restart(&state, &actor).await?;
    Ok(ApiResponse::with_status(
        StatusCode::ACCEPTED,
        "restart requested",
        response,
    ))
}
