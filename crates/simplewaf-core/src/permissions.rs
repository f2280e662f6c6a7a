//! Capabilities, roles, and the role-to-capability registry.
//!
//! A capability is a `domain:action` pair such as `user:create`. Roles are
//! mapped to capability sets once at startup; the resulting
//! [`PermissionRegistry`] is immutable and shared read-only by every request.
//!
//! Lookups take the role as a string because the role stored on a user
//! record may be stale or unknown. Unknown roles map to the empty set, so
//! anything not explicitly granted is denied.
//!
//! # Example
//!
//! ```ignore
//! use simplewaf_core::permissions::{Capability, PermissionRegistry};
//!
//! let registry = PermissionRegistry::new();
//! assert!(registry.has_capability("admin", Capability::SystemRestart));
//! assert!(!registry.has_capability("auditor", Capability::UserRead));
//! assert!(registry.capabilities_for("guest").is_empty());
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// Users permissions
// =============================================================================

/// Permission to create users
pub const USER_CREATE: &str = "user:create";
/// Permission to read users
pub const USER_READ: &str = "user:read";
/// Permission to update users
pub const USER_UPDATE: &str = "user:update";
/// Permission to delete users
pub const USER_DELETE: &str = "user:delete";

// =============================================================================
// Sites permissions
// =============================================================================

pub const SITE_CREATE: &str = "site:create";
pub const SITE_READ: &str = "site:read";
pub const SITE_UPDATE: &str = "site:update";
pub const SITE_DELETE: &str = "site:delete";

// =============================================================================
// Certificates permissions
// =============================================================================

pub const CERT_CREATE: &str = "cert:create";
pub const CERT_READ: &str = "cert:read";
pub const CERT_UPDATE: &str = "cert:update";
pub const CERT_DELETE: &str = "cert:delete";

// =============================================================================
// Logs, config, audit and system permissions
// =============================================================================

/// Permission to query WAF logs and attack events
pub const LOGS_READ: &str = "logs:read";
pub const CONFIG_READ: &str = "config:read";
pub const CONFIG_UPDATE: &str = "config:update";
/// Permission to read the audit trail
pub const AUDIT_READ: &str = "audit:read";
pub const SYSTEM_STATUS: &str = "system:status";
/// Permission to request an engine restart
pub const SYSTEM_RESTART: &str = "system:restart";

/// A single `domain:action` permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    UserCreate,
    UserRead,
    UserUpdate,
    UserDelete,
    SiteCreate,
    SiteRead,
    SiteUpdate,
    SiteDelete,
    CertCreate,
    CertRead,
    CertUpdate,
    CertDelete,
    LogsRead,
    ConfigRead,
    ConfigUpdate,
    AuditRead,
    SystemStatus,
    SystemRestart,
}

impl Capability {
    pub const ALL: [Capability; 18] = [
        Capability::UserCreate,
        Capability::UserRead,
        Capability::UserUpdate,
        Capability::UserDelete,
        Capability::SiteCreate,
        Capability::SiteRead,
        Capability::SiteUpdate,
        Capability::SiteDelete,
        Capability::CertCreate,
        Capability::CertRead,
        Capability::CertUpdate,
        Capability::CertDelete,
        Capability::LogsRead,
        Capability::ConfigRead,
        Capability::ConfigUpdate,
        Capability::AuditRead,
        Capability::SystemStatus,
        Capability::SystemRestart,
    ];

    /// Canonical `domain:action` form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Capability::UserCreate => USER_CREATE,
            Capability::UserRead => USER_READ,
            Capability::UserUpdate => USER_UPDATE,
            Capability::UserDelete => USER_DELETE,
            Capability::SiteCreate => SITE_CREATE,
            Capability::SiteRead => SITE_READ,
            Capability::SiteUpdate => SITE_UPDATE,
            Capability::SiteDelete => SITE_DELETE,
            Capability::CertCreate => CERT_CREATE,
            Capability::CertRead => CERT_READ,
            Capability::CertUpdate => CERT_UPDATE,
            Capability::CertDelete => CERT_DELETE,
            Capability::LogsRead => LOGS_READ,
            Capability::ConfigRead => CONFIG_READ,
            Capability::ConfigUpdate => CONFIG_UPDATE,
            Capability::AuditRead => AUDIT_READ,
            Capability::SystemStatus => SYSTEM_STATUS,
            Capability::SystemRestart => SYSTEM_RESTART,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown capability: {0}")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|cap| cap.as_str() == s)
            .ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The roles known to the management plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Auditor,
    Configurator,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::User, Role::Auditor, Role::Configurator];

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Auditor => "auditor",
            Role::Configurator => "configurator",
        }
    }

    /// Parses a stored role name. Returns `None` for anything unrecognised.
    pub fn parse(s: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.as_str() == s)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable role-to-capability table.
#[derive(Debug, Clone)]
pub struct PermissionRegistry {
    table: HashMap<Role, BTreeSet<Capability>>,
    empty: BTreeSet<Capability>,
}

impl Default for PermissionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionRegistry {
    /// Builds the built-in table:
    ///
    /// | Role | Capabilities |
    /// |------|--------------|
    /// | admin | every capability |
    /// | user | `site:read`, `cert:read` |
    /// | auditor | `logs:read`, `audit:read` |
    /// | configurator | `config:read`, `config:update` |
    pub fn new() -> Self {
        Self::from_table([
            (Role::Admin, Capability::ALL.to_vec()),
            (Role::User, vec![Capability::SiteRead, Capability::CertRead]),
            (
                Role::Auditor,
                vec![Capability::LogsRead, Capability::AuditRead],
            ),
            (
                Role::Configurator,
                vec![Capability::ConfigRead, Capability::ConfigUpdate],
            ),
        ])
    }

    pub fn from_table<I, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Role, C)>,
        C: IntoIterator<Item = Capability>,
    {
        let table = entries
            .into_iter()
            .map(|(role, caps)| (role, caps.into_iter().collect()))
            .collect();

        Self {
            table,
            empty: BTreeSet::new(),
        }
    }

    /// Capability set of `role`. Unknown roles get the empty set.
    pub fn capabilities_for(&self, role: &str) -> &BTreeSet<Capability> {
        Role::parse(role)
            .and_then(|role| self.table.get(&role))
            .unwrap_or(&self.empty)
    }

    pub fn has_capability(&self, role: &str, capability: Capability) -> bool {
        self.capabilities_for(role).contains(&capability)
    }

    /// String form of [`has_capability`](Self::has_capability). A capability
    /// string that does not name a known capability is never allowed.
    pub fn allows(&self, role: &str, capability: &str) -> bool {
        capability
            .parse::<Capability>()
            .is_ok_and(|cap| self.has_capability(role, cap))
    }

    /// Roles that hold `capability`.
    pub fn roles_with(&self, capability: Capability) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| self.has_capability(role.as_str(), capability))
            .collect()
    }
}
