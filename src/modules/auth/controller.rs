use axum::extract::State;
use tracing::instrument;

use simplewaf_core::{ApiResponse, AppError};
use simplewaf_models::auth::{LoginRequest, LoginResponse, ResetPasswordRequest};
use simplewaf_models::users::UserResponse;

use crate::middleware::CurrentUser;
use crate::modules::auth::service::AuthService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[instrument(skip(state, dto))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, AppError> {
    let response = AuthService::login(&state, dto).await?;
    Ok(ApiResponse::ok(response))
}

/// Reachable while a reset is pending; this is how a flagged account clears
/// the flag.
#[instrument(skip(state, dto))]
pub async fn reset_password(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    ValidatedJson(dto): ValidatedJson<ResetPasswordRequest>,
) -> Result<ApiResponse<()>, AppError> {
    AuthService::reset_password(&state, &identity, dto).await?;
    Ok(ApiResponse::message("password updated"))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let user = AuthService::current_user(&state, &identity).await?;
    Ok(ApiResponse::ok(user))
}
