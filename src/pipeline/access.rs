use std::fmt;
use std::sync::Arc;

use simplewaf_auth::TokenCodec;
use simplewaf_core::{Capability, PermissionRegistry};
use simplewaf_db::UserRepository;

use super::{AuthGate, Gate, PasswordResetGate, PermissionGate, Pipeline};

/// How much a route demands of its caller.
///
/// | Access | Gates |
/// |---|---|
/// | `Public` | none |
/// | `Authenticated` | auth |
/// | `PasswordChecked` | auth, password reset |
/// | `Capability(c)` | auth, password reset, permission(c) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Public,
    Authenticated,
    PasswordChecked,
    Capability(Capability),
}

impl Access {
    pub fn capability(self) -> Option<Capability> {
        match self {
            Access::Capability(cap) => Some(cap),
            _ => None,
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Public => f.write_str("public"),
            Access::Authenticated => f.write_str("authenticated"),
            Access::PasswordChecked => f.write_str("password-checked"),
            Access::Capability(cap) => write!(f, "{cap}"),
        }
    }
}

/// Builds the gate list for an [`Access`] level.
///
/// The auth and password reset gates are stateless apart from shared handles,
/// so a single instance of each is reused by every route.
#[derive(Clone)]
pub struct GateFactory {
    auth: Arc<dyn Gate>,
    password_reset: Arc<dyn Gate>,
    registry: Arc<PermissionRegistry>,
}

impl fmt::Debug for GateFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateFactory")
            .field("auth", &self.auth)
            .field("password_reset", &self.password_reset)
            .finish_non_exhaustive()
    }
}

impl GateFactory {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<TokenCodec>,
        registry: Arc<PermissionRegistry>,
    ) -> Self {
        Self {
            auth: Arc::new(AuthGate::new(users, tokens)),
            password_reset: Arc::new(PasswordResetGate),
            registry,
        }
    }

    pub fn pipeline(&self, access: Access) -> Pipeline {
        let mut gates: Vec<Arc<dyn Gate>> = Vec::with_capacity(3);

        if access == Access::Public {
            return Pipeline::new(gates);
        }
        gates.push(self.auth.clone());

        if access == Access::Authenticated {
            return Pipeline::new(gates);
        }
        gates.push(self.password_reset.clone());

        if let Access::Capability(capability) = access {
            gates.push(Arc::new(PermissionGate::new(
                self.registry.clone(),
                capability,
            )));
        }
        Pipeline::new(gates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simplewaf_db::MemoryUserRepository;

    fn factory() -> GateFactory {
        GateFactory::new(
            Arc::new(MemoryUserRepository::default()),
            Arc::new(TokenCodec::new(b"secret", 60)),
            Arc::new(PermissionRegistry::new()),
        )
    }

    #[test]
    fn test_gate_order_per_access_level() {
        let factory = factory();
        assert!(factory.pipeline(Access::Public).is_empty());
        assert_eq!(
            factory.pipeline(Access::Authenticated).gate_names(),
            vec!["auth"]
        );
        assert_eq!(
            factory.pipeline(Access::PasswordChecked).gate_names(),
            vec!["auth", "password_reset"]
        );
        assert_eq!(
            factory
                .pipeline(Access::Capability(Capability::UserRead))
                .gate_names(),
            vec!["auth", "password_reset", "permission"]
        );
    }

    #[test]
    fn test_access_display() {
        assert_eq!(Access::Public.to_string(), "public");
        assert_eq!(
            Access::Capability(Capability::SystemRestart).to_string(),
            "system:restart"
        );
        assert_eq!(
            Access::Capability(Capability::LogsRead).capability(),
            Some(Capability::LogsRead)
        );
        assert_eq!(Access::PasswordChecked.capability(), None);
    }
}
