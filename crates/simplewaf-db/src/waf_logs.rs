use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tokio::sync::RwLock;

use simplewaf_core::Paginated;
use simplewaf_models::waf_logs::{LogQuery, WafLog};

use crate::error::StoreError;

/// Upper bound on records scanned when aggregating attack events.
pub const MAX_SCAN: i64 = 50_000;

/// Read access to engine-written WAF log records, newest first.
#[async_trait]
pub trait WafLogRepository: Send + Sync {
    async fn insert(&self, log: WafLog) -> Result<WafLog, StoreError>;
    async fn query(&self, query: &LogQuery) -> Result<Paginated<WafLog>, StoreError>;
    /// Every record matching `query`, ignoring pagination, capped at `limit`.
    async fn matching(&self, query: &LogQuery, limit: i64) -> Result<Vec<WafLog>, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryWafLogRepository {
    logs: RwLock<Vec<WafLog>>,
}

impl MemoryWafLogRepository {
    async fn filtered(&self, query: &LogQuery) -> Vec<WafLog> {
        let mut logs: Vec<WafLog> = self
            .logs
            .read()
            .await
            .iter()
            .filter(|log| query.matches(log))
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        logs
    }
}

#[async_trait]
impl WafLogRepository for MemoryWafLogRepository {
    async fn insert(&self, log: WafLog) -> Result<WafLog, StoreError> {
        self.logs.write().await.push(log.clone());
        Ok(log)
    }

    async fn query(&self, query: &LogQuery) -> Result<Paginated<WafLog>, StoreError> {
        Ok(Paginated::from_vec(
            self.filtered(query).await,
            &query.pagination(),
        ))
    }

    async fn matching(&self, query: &LogQuery, limit: i64) -> Result<Vec<WafLog>, StoreError> {
        let mut logs = self.filtered(query).await;
        logs.truncate(limit.max(0) as usize);
        Ok(logs)
    }
}

const LOG_COLUMNS: &str = "id, rule_id, src_ip, src_port, dst_ip, dst_port, domain, uri, \
                           request_id, message, payload, phase, severity, accuracy, sec_mark, \
                           sec_lang_raw, request, response, logs, created_at";

#[derive(Debug, Clone)]
pub struct PgWafLogRepository {
    pool: PgPool,
}

impl PgWafLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends a `WHERE` clause covering every filter that is set.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &LogQuery) {
    builder.push(" WHERE 1 = 1");

    if let Some(rule_id) = query.rule_id {
        builder.push(" AND rule_id = ").push_bind(rule_id);
    }
    if let Some(ip) = &query.src_ip {
        builder.push(" AND src_ip = ").push_bind(ip.clone());
    }
    if let Some(ip) = &query.dst_ip {
        builder.push(" AND dst_ip = ").push_bind(ip.clone());
    }
    if let Some(domain) = &query.domain {
        builder.push(" AND domain = ").push_bind(domain.clone());
    }
    if let Some(port) = query.src_port {
        builder.push(" AND src_port = ").push_bind(i32::from(port));
    }
    if let Some(port) = query.dst_port {
        builder.push(" AND dst_port = ").push_bind(i32::from(port));
    }
    if let Some(request_id) = &query.request_id {
        builder.push(" AND request_id = ").push_bind(request_id.clone());
    }
    if let Some(start) = query.start_time {
        builder.push(" AND created_at >= ").push_bind(start);
    }
    if let Some(end) = query.end_time {
        builder.push(" AND created_at <= ").push_bind(end);
    }
}

#[async_trait]
impl WafLogRepository for PgWafLogRepository {
    async fn insert(&self, log: WafLog) -> Result<WafLog, StoreError> {
        sqlx::query_as::<_, WafLog>(&format!(
            r#"INSERT INTO waf_logs ({LOG_COLUMNS})
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                       $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
               RETURNING {LOG_COLUMNS}"#
        ))
        .bind(log.id)
        .bind(log.rule_id)
        .bind(&log.src_ip)
        .bind(log.src_port)
        .bind(&log.dst_ip)
        .bind(log.dst_port)
        .bind(&log.domain)
        .bind(&log.uri)
        .bind(&log.request_id)
        .bind(&log.message)
        .bind(&log.payload)
        .bind(log.phase)
        .bind(log.severity)
        .bind(log.accuracy)
        .bind(&log.sec_mark)
        .bind(&log.sec_lang_raw)
        .bind(&log.request)
        .bind(&log.response)
        .bind(Json(&log.logs))
        .bind(log.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn query(&self, query: &LogQuery) -> Result<Paginated<WafLog>, StoreError> {
        let params = query.pagination();

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM waf_logs");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {LOG_COLUMNS} FROM waf_logs"));
        push_filters(&mut select, query);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(params.limit())
            .push(" OFFSET ")
            .push_bind(params.offset());

        let logs = select
            .build_query_as::<WafLog>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Paginated::new(logs, total, &params))
    }

    async fn matching(&self, query: &LogQuery, limit: i64) -> Result<Vec<WafLog>, StoreError> {
        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {LOG_COLUMNS} FROM waf_logs"));
        push_filters(&mut select, query);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit.max(0));

        let logs = select
            .build_query_as::<WafLog>()
            .fetch_all(&self.pool)
            .await?;
        Ok(logs)
    }
}
