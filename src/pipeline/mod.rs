//! The authorization pipeline.
//!
//! Every guarded route runs an ordered list of [`Gate`]s before its handler.
//! Each gate receives the [`RequestContext`] produced by the previous one and
//! either passes it on (possibly enriched) or rejects the request with an
//! [`AppError`]. The first rejection wins; later gates never run.
//!
//! ```text
//! Auth ──> PasswordReset ──> Permission(cap) ──> handler
//!  401         403                403
//! ```
//!
//! The gate list for a route is derived from its [`Access`] level, so a
//! permission check can never run before authentication.
//!
//! # Modules
//!
//! - [`access`]: Access levels and the gate lists they expand to
//! - [`auth_gate`]: Bearer token verification and identity loading
//! - [`password_gate`]: Blocks accounts with a pending password reset
//! - [`permission_gate`]: Capability checks against the role table

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use simplewaf_core::AppError;
use simplewaf_models::users::User;

pub mod access;
pub mod auth_gate;
pub mod password_gate;
pub mod permission_gate;

pub use access::{Access, GateFactory};
pub use auth_gate::AuthGate;
pub use password_gate::PasswordResetGate;
pub use permission_gate::PermissionGate;

/// The authenticated principal, built from the live account record.
///
/// Token claims are only used to locate the account; `role` and
/// `password_reset_required` always reflect the stored user at request time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
    pub password_reset_required: bool,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role.clone(),
            password_reset_required: user.need_reset,
        }
    }
}

/// What the gates know about the request being authorized.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Route template relative to the API base, e.g. `/users/{id}`.
    pub route: &'static str,
    /// Raw `Authorization` header value.
    pub authorization: Option<String>,
    pub identity: Option<Identity>,
}

impl RequestContext {
    pub fn new(route: &'static str, authorization: Option<String>) -> Self {
        Self {
            route,
            authorization,
            identity: None,
        }
    }
}

#[async_trait]
pub trait Gate: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn check(&self, ctx: RequestContext) -> Result<RequestContext, AppError>;
}

/// An ordered list of gates.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    gates: Vec<Arc<dyn Gate>>,
}

impl Pipeline {
    pub fn new(gates: Vec<Arc<dyn Gate>>) -> Self {
        Self { gates }
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    pub fn gate_names(&self) -> Vec<&'static str> {
        self.gates.iter().map(|gate| gate.name()).collect()
    }

    /// Runs every gate in order, stopping at the first rejection.
    pub async fn run(&self, mut ctx: RequestContext) -> Result<RequestContext, AppError> {
        let route = ctx.route;
        for gate in &self.gates {
            ctx = gate.check(ctx).await.inspect_err(|err| {
                tracing::debug!(
                    gate = gate.name(),
                    route,
                    status = err.status.as_u16(),
                    reason = %err.public_message(),
                    "request rejected"
                );
            })?;
        }
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        reject: bool,
    }

    #[async_trait]
    impl Gate for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn check(&self, ctx: RequestContext) -> Result<RequestContext, AppError> {
            self.log.lock().unwrap().push(self.name);
            if self.reject {
                return Err(AppError::forbidden(self.name));
            }
            Ok(ctx)
        }
    }

    fn recorder(
        name: &'static str,
        log: &Arc<Mutex<Vec<&'static str>>>,
        reject: bool,
    ) -> Arc<dyn Gate> {
        Arc::new(Recorder {
            name,
            log: log.clone(),
            reject,
        })
    }

    #[tokio::test]
    async fn test_gates_run_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new(vec![
            recorder("first", &log, false),
            recorder("second", &log, false),
            recorder("third", &log, false),
        ]);

        pipeline.run(RequestContext::new("/x", None)).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_first_rejection_stops_the_pipeline() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new(vec![
            recorder("first", &log, false),
            recorder("second", &log, true),
            recorder("third", &log, false),
        ]);

        let err = pipeline.run(RequestContext::new("/x", None)).await.unwrap_err();
        assert_eq!(err.public_message(), "second");
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_empty_pipeline_passes_context_through() {
        let pipeline = Pipeline::default();
        let ctx = pipeline
            .run(RequestContext::new("/auth/login", Some("Bearer x".to_string())))
            .await
            .unwrap();
        assert!(pipeline.is_empty());
        assert_eq!(ctx.authorization.as_deref(), Some("Bearer x"));
        assert!(ctx.identity.is_none());
    }
}
