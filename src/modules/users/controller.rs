use axum::extract::State;
use tracing::instrument;

use simplewaf_core::{ApiResponse, AppError, Paginated, PaginationParams};
use simplewaf_models::users::{CreateUserRequest, UpdateUserRequest, UserResponse};

use crate::middleware::CurrentUser;
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::{IdPath, QueryParams, ValidatedJson};

#[instrument(skip(state, dto))]
pub async fn create_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ValidatedJson(dto): ValidatedJson<CreateUserRequest>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let user = UserService::create_user(&state, &actor, dto).await?;
    Ok(ApiResponse::created(user))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<PaginationParams>,
) -> Result<ApiResponse<Paginated<UserResponse>>, AppError> {
    let users = UserService::list_users(&state, params).await?;
    Ok(ApiResponse::ok(users))
}

#[instrument(skip(state, dto))]
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    IdPath(id): IdPath,
    ValidatedJson(dto): ValidatedJson<UpdateUserRequest>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let user = UserService::update_user(&state, &actor, id, dto).await?;
    Ok(ApiResponse::ok(user))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    IdPath(id): IdPath,
) -> Result<ApiResponse<()>, AppError> {
    UserService::delete_user(&state, &actor, id).await?;
    Ok(ApiResponse::message("user deleted"))
}
