use std::sync::Arc;

use async_trait::async_trait;

use simplewaf_core::{AppError, Capability, PermissionRegistry};

use super::{Gate, RequestContext};

pub const NO_IDENTITY: &str = "forbidden: no authenticated identity";

/// Requires the caller's role to hold one capability.
///
/// The decision depends only on the role and the capability; there is no
/// per-resource ownership check.
#[derive(Debug, Clone)]
pub struct PermissionGate {
    registry: Arc<PermissionRegistry>,
    capability: Capability,
}

impl PermissionGate {
    pub fn new(registry: Arc<PermissionRegistry>, capability: Capability) -> Self {
        Self {
            registry,
            capability,
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }
}

#[async_trait]
impl Gate for PermissionGate {
    fn name(&self) -> &'static str {
        "permission"
    }

    async fn check(&self, ctx: RequestContext) -> Result<RequestContext, AppError> {
        let identity = ctx
            .identity
            .as_ref()
            .ok_or_else(|| AppError::forbidden(NO_IDENTITY))?;

        if !self.registry.has_capability(&identity.role, self.capability) {
            return Err(AppError::forbidden(format!(
                "forbidden: missing capability {}",
                self.capability
            )));
        }
        Ok(ctx)
    }
}
