use chrono::Utc;
use tracing::{info, instrument, warn};

use simplewaf_core::AppError;
use simplewaf_models::audit::{actions, resources};
use simplewaf_models::system::{RestartResponse, SystemStatus};

use crate::modules::audit::AuditService;
use crate::pipeline::Identity;
use crate::state::{AppState, RestartRequest};

pub struct SystemService;

impl SystemService {
    #[instrument(skip(state))]
    pub async fn status(state: &AppState) -> Result<SystemStatus, AppError> {
        let now = Utc::now();
        Ok(SystemStatus {
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: state.started_at,
            uptime_seconds: (now - state.started_at).num_seconds(),
            users: state.repos.users.count().await?,
            sites: state.repos.sites.count().await?,
            certificates: state.repos.certificates.count().await?,
        })
    }

    /// Hands a restart request to whatever supervises the engine.
    ///
    /// The request is accepted even when no supervisor is subscribed; the
    /// caller only learns that it was queued.
    #[instrument(skip(state, actor), fields(requested_by = %actor.username))]
    pub async fn request_restart(
        state: &AppState,
        actor: &Identity,
    ) -> Result<RestartResponse, AppError> {
        let request = RestartRequest {
            requested_by: actor.username.clone(),
            requested_at: Utc::now(),
        };

        match state.restart_tx.send(request.clone()) {
            Ok(receivers) => info!(receivers, "restart requested"),
            Err(_) => warn!("restart requested but no supervisor is listening"),
        }

        AuditService::record(
            state,
            AuditService::entry(actor, actions::RESTART, resources::SYSTEM),
        )
        .await;

        Ok(RestartResponse {
            requested_at: request.requested_at,
            requested_by: request.requested_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simplewaf_models::users::User;

    fn admin() -> Identity {
        Identity::from(&User::new("admin", "hash", "admin", false))
    }

    #[tokio::test]
    async fn test_restart_reaches_subscribers() {
        let state = AppState::for_tests();
        let mut rx = state.subscribe_restarts();

        let response = SystemService::request_restart(&state, &admin())
            .await
            .unwrap();
        let received = rx.recv().await.unwrap();

        assert_eq!(received.requested_by, "admin");
        assert_eq!(received.requested_at, response.requested_at);
    }

    #[tokio::test]
    async fn test_restart_without_subscribers_is_accepted() {
        let state = AppState::for_tests();
        let response = SystemService::request_restart(&state, &admin()).await;
        assert!(response.is_ok());
    }

    #[tokio::test]
    async fn test_status_counts_resources() {
        let state = AppState::for_tests();
        let status = SystemService::status(&state).await.unwrap();
        assert_eq!(status.users, 0);
        assert_eq!(status.version, env!("CARGO_PKG_VERSION"));
        assert!(status.uptime_seconds >= 0);
    }
}
