//! Audit trail entries.
//!
//! Every mutating management call appends one entry. Entries are never
//! updated or deleted through the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use simplewaf_core::PaginationParams;
use simplewaf_core::serde::{deserialize_optional_i64, deserialize_optional_string};

/// Action names recorded in [`AuditEntry::action`].
pub mod actions {
    pub const LOGIN: &str = "login";
    pub const RESET_PASSWORD: &str = "reset_password";
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
    pub const RESTART: &str = "restart";
}

/// Resource types recorded in [`AuditEntry::resource_type`].
pub mod resources {
    pub const USER: &str = "user";
    pub const SITE: &str = "site";
    pub const CERTIFICATE: &str = "certificate";
    pub const CONFIG: &str = "config";
    pub const SYSTEM: &str = "system";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub username: String,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// An entry before it is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub user_id: Option<Uuid>,
    pub username: String,
    pub action: &'static str,
    pub resource_type: &'static str,
    pub resource_id: Option<String>,
    pub details: serde_json::Value,
}

impl NewAuditEntry {
    pub fn new(
        user_id: Uuid,
        username: impl Into<String>,
        action: &'static str,
        resource_type: &'static str,
    ) -> Self {
        Self {
            user_id: Some(user_id),
            username: username.into(),
            action,
            resource_type,
            resource_id: None,
            details: serde_json::Value::Null,
        }
    }

    pub fn resource(mut self, id: impl ToString) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    pub fn into_entry(self) -> AuditEntry {
        AuditEntry {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            username: self.username,
            action: self.action.to_string(),
            resource_type: self.resource_type.to_string(),
            resource_id: self.resource_id,
            details: self.details,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub resource_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page_size: Option<i64>,
}

impl AuditQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            page_size: self.page_size,
        }
    }

    pub fn matches(&self, entry: &AuditEntry) -> bool {
        self.username.as_deref().is_none_or(|u| entry.username == u)
            && self.action.as_deref().is_none_or(|a| entry.action == a)
            && self
                .resource_type
                .as_deref()
                .is_none_or(|r| entry.resource_type == r)
    }
}
