use chrono::Utc;
use tracing::{info, instrument};

use simplewaf_core::{AppError, hash_password_with_cost, verify_password};
use simplewaf_models::audit::{actions, resources};
use simplewaf_models::auth::{LoginRequest, LoginResponse, ResetPasswordRequest};
use simplewaf_models::users::{User, UserResponse};

use crate::modules::audit::AuditService;
use crate::pipeline::Identity;
use crate::pipeline::auth_gate::ACCOUNT_UNAVAILABLE;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "invalid username or password";

pub struct AuthService;

impl AuthService {
    #[instrument(skip(state, dto), fields(username = %dto.username))]
    pub async fn login(state: &AppState, dto: LoginRequest) -> Result<LoginResponse, AppError> {
        let Some(mut user) = state.repos.users.find_by_username(&dto.username).await? else {
            // Unknown accounts pay the same bcrypt cost as known ones.
            verify_password(&dto.password, state.login_decoy_hash().await?)?;
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        let password_ok = verify_password(&dto.password, &user.password_hash)?;
        if user.disabled || !password_ok {
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let issued = state.tokens.issue(user.id, &user.role)?;

        let now = Utc::now();
        state.repos.users.record_login(user.id, now).await?;
        user.last_login_at = Some(now);

        AuditService::record(
            state,
            AuditService::entry(&Identity::from(&user), actions::LOGIN, resources::USER)
                .resource(user.id),
        )
        .await;
        info!(user_id = %user.id, "user logged in");

        Ok(LoginResponse {
            token: issued.token,
            expires_at: issued.expires_at,
            user: user.into(),
        })
    }

    #[instrument(skip(state, dto), fields(user_id = %identity.user_id))]
    pub async fn reset_password(
        state: &AppState,
        identity: &Identity,
        dto: ResetPasswordRequest,
    ) -> Result<(), AppError> {
        let mut user = Self::load_account(state, identity).await?;

        if !verify_password(&dto.old_password, &user.password_hash)? {
            return Err(AppError::bad_request("old password is incorrect"));
        }
        if dto.old_password == dto.new_password {
            return Err(AppError::bad_request(
                "new password must differ from the old password",
            ));
        }

        user.password_hash = hash_password_with_cost(&dto.new_password, state.password_cost)?;
        user.need_reset = false;
        user.updated_at = Utc::now();
        state.repos.users.update(user).await?;

        AuditService::record(
            state,
            AuditService::entry(identity, actions::RESET_PASSWORD, resources::USER)
                .resource(identity.user_id),
        )
        .await;

        Ok(())
    }

    #[instrument(skip(state))]
    pub async fn current_user(
        state: &AppState,
        identity: &Identity,
    ) -> Result<UserResponse, AppError> {
        Ok(Self::load_account(state, identity).await?.into())
    }

    async fn load_account(state: &AppState, identity: &Identity) -> Result<User, AppError> {
        state
            .repos
            .users
            .find_by_id(identity.user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized(ACCOUNT_UNAVAILABLE))
    }
}
