use chrono::Utc;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use simplewaf_core::{AppError, Paginated, PaginationParams, hash_password_with_cost};
use simplewaf_models::audit::{actions, resources};
use simplewaf_models::users::{CreateUserRequest, UpdateUserRequest, User, UserResponse};

use crate::modules::audit::AuditService;
use crate::pipeline::Identity;
use crate::state::AppState;

pub struct UserService;

impl UserService {
    /// New accounts must pick their own password before doing anything else.
    #[instrument(skip(state, dto), fields(username = %dto.username))]
    pub async fn create_user(
        state: &AppState,
        actor: &Identity,
        dto: CreateUserRequest,
    ) -> Result<UserResponse, AppError> {
        let hash = hash_password_with_cost(&dto.password, state.password_cost)?;
        let user = state
            .repos
            .users
            .insert(User::new(dto.username, hash, dto.role, true))
            .await?;

        AuditService::record(
            state,
            AuditService::entry(actor, actions::CREATE, resources::USER)
                .resource(user.id)
                .details(json!({ "username": user.username, "role": user.role })),
        )
        .await;

        Ok(user.into())
    }

    #[instrument(skip(state))]
    pub async fn list_users(
        state: &AppState,
        params: PaginationParams,
    ) -> Result<Paginated<UserResponse>, AppError> {
        let page = state.repos.users.list(&params).await?;
        Ok(page.map(UserResponse::from))
    }

    #[instrument(skip(state, dto))]
    pub async fn update_user(
        state: &AppState,
        actor: &Identity,
        id: Uuid,
        dto: UpdateUserRequest,
    ) -> Result<UserResponse, AppError> {
        let mut user = state
            .repos
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))?;

        if dto.is_empty() {
            return Err(AppError::bad_request("no fields to update"));
        }

        let is_self = user.id == actor.user_id;
        if is_self && dto.role.as_ref().is_some_and(|role| *role != user.role) {
            return Err(AppError::bad_request("cannot change your own role"));
        }
        if is_self && dto.disabled == Some(true) {
            return Err(AppError::bad_request("cannot disable your own account"));
        }

        let mut changed = Vec::new();
        if let Some(username) = dto.username {
            user.username = username;
            changed.push("username");
        }
        if let Some(password) = dto.password {
            user.password_hash = hash_password_with_cost(&password, state.password_cost)?;
            // A password set by someone else is temporary.
            user.need_reset = !is_self;
            changed.push("password");
        }
        if let Some(role) = dto.role {
            user.role = role;
            changed.push("role");
        }
        if let Some(need_reset) = dto.need_reset {
            user.need_reset = need_reset;
            changed.push("needReset");
        }
        if let Some(disabled) = dto.disabled {
            user.disabled = disabled;
            changed.push("disabled");
        }
        user.updated_at = Utc::now();

        let user = state.repos.users.update(user).await?;

        AuditService::record(
            state,
            AuditService::entry(actor, actions::UPDATE, resources::USER)
                .resource(user.id)
                .details(json!({ "fields": changed })),
        )
        .await;

        Ok(user.into())
    }

    #[instrument(skip(state))]
    pub async fn delete_user(state: &AppState, actor: &Identity, id: Uuid) -> Result<(), AppError> {
        if id == actor.user_id {
            return Err(AppError::bad_request("cannot delete your own account"));
        }

        state.repos.users.delete(id).await?;

        AuditService::record(
            state,
            AuditService::entry(actor, actions::DELETE, resources::USER).resource(id),
        )
        .await;

        Ok(())
    }
}
