use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tokio::sync::RwLock;

use simplewaf_core::Paginated;
use simplewaf_models::audit::{AuditEntry, AuditQuery, NewAuditEntry};

use crate::error::StoreError;

/// Append-only audit trail, listed newest first.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditEntry, StoreError>;
    async fn list(&self, query: &AuditQuery) -> Result<Paginated<AuditEntry>, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryAuditRepository {
    entries: RwLock<Vec<AuditEntry>>,
}

#[async_trait]
impl AuditRepository for MemoryAuditRepository {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditEntry, StoreError> {
        let entry = entry.into_entry();
        self.entries.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn list(&self, query: &AuditQuery) -> Result<Paginated<AuditEntry>, StoreError> {
        // Appended in time order, so reversing yields newest first.
        let entries: Vec<AuditEntry> = self
            .entries
            .read()
            .await
            .iter()
            .rev()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        Ok(Paginated::from_vec(entries, &query.pagination()))
    }
}

const AUDIT_COLUMNS: &str =
    "id, user_id, username, action, resource_type, resource_id, details, created_at";

#[derive(Debug, Clone)]
pub struct PgAuditRepository {
    pool: PgPool,
}

impl PgAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &AuditQuery) {
    builder.push(" WHERE 1 = 1");

    if let Some(username) = &query.username {
        builder.push(" AND username = ").push_bind(username.clone());
    }
    if let Some(action) = &query.action {
        builder.push(" AND action = ").push_bind(action.clone());
    }
    if let Some(resource_type) = &query.resource_type {
        builder
            .push(" AND resource_type = ")
            .push_bind(resource_type.clone());
    }
}

#[async_trait]
impl AuditRepository for PgAuditRepository {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditEntry, StoreError> {
        let entry = entry.into_entry();
        sqlx::query_as::<_, AuditEntry>(&format!(
            r#"INSERT INTO audit_log ({AUDIT_COLUMNS})
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {AUDIT_COLUMNS}"#
        ))
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(&entry.username)
        .bind(&entry.action)
        .bind(&entry.resource_type)
        .bind(&entry.resource_id)
        .bind(&entry.details)
        .bind(entry.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn list(&self, query: &AuditQuery) -> Result<Paginated<AuditEntry>, StoreError> {
        let params = query.pagination();

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM audit_log");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {AUDIT_COLUMNS} FROM audit_log"));
        push_filters(&mut select, query);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(params.limit())
            .push(" OFFSET ")
            .push_bind(params.offset());

        let entries = select
            .build_query_as::<AuditEntry>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Paginated::new(entries, total, &params))
    }
}
