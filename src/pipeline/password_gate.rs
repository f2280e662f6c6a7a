use async_trait::async_trait;

use simplewaf_core::AppError;

use super::{Gate, RequestContext};

/// The one guarded route an account with a pending reset may still call.
pub const RESET_PASSWORD_ROUTE: &str = "/auth/reset-password";
pub const RESET_REQUIRED: &str = "password reset required";

/// Rejects accounts flagged for a password reset on every route except the
/// reset endpoint itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordResetGate;

#[async_trait]
impl Gate for PasswordResetGate {
    fn name(&self) -> &'static str {
        "password_reset"
    }

    async fn check(&self, ctx: RequestContext) -> Result<RequestContext, AppError> {
        let identity = ctx
            .identity
            .as_ref()
            .ok_or_else(|| AppError::forbidden(RESET_REQUIRED))?;

        if identity.password_reset_required && ctx.route != RESET_PASSWORD_ROUTE {
            return Err(AppError::forbidden(RESET_REQUIRED));
        }
        Ok(ctx)
    }
}
