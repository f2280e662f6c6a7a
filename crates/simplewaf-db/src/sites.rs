use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tokio::sync::RwLock;
use uuid::Uuid;

use simplewaf_core::{Paginated, PaginationParams};
use simplewaf_models::sites::{Backend, Site, SiteCertificate, WafMode};

use crate::error::StoreError;

/// Site storage. `(domain, listen_port)` is unique.
#[async_trait]
pub trait SiteRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Site>, StoreError>;
    async fn list(&self, params: &PaginationParams) -> Result<Paginated<Site>, StoreError>;
    async fn insert(&self, site: Site) -> Result<Site, StoreError>;
    async fn update(&self, site: Site) -> Result<Site, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
    async fn count(&self) -> Result<i64, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemorySiteRepository {
    sites: RwLock<HashMap<Uuid, Site>>,
}

fn listener_taken(sites: &HashMap<Uuid, Site>, site: &Site) -> bool {
    sites.values().any(|s| {
        s.id != site.id && s.domain == site.domain && s.listen_port == site.listen_port
    })
}

#[async_trait]
impl SiteRepository for MemorySiteRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Site>, StoreError> {
        Ok(self.sites.read().await.get(&id).cloned())
    }

    async fn list(&self, params: &PaginationParams) -> Result<Paginated<Site>, StoreError> {
        let mut sites: Vec<Site> = self.sites.read().await.values().cloned().collect();
        sites.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(Paginated::from_vec(sites, params))
    }

    async fn insert(&self, site: Site) -> Result<Site, StoreError> {
        let mut sites = self.sites.write().await;
        if listener_taken(&sites, &site) {
            return Err(StoreError::Conflict("site domain and port".to_string()));
        }
        sites.insert(site.id, site.clone());
        Ok(site)
    }

    async fn update(&self, site: Site) -> Result<Site, StoreError> {
        let mut sites = self.sites.write().await;
        if !sites.contains_key(&site.id) {
            return Err(StoreError::NotFound("site".to_string()));
        }
        if listener_taken(&sites, &site) {
            return Err(StoreError::Conflict("site domain and port".to_string()));
        }
        sites.insert(site.id, site.clone());
        Ok(site)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        match self.sites.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound("site".to_string())),
        }
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.sites.read().await.len() as i64)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SiteRow {
    id: Uuid,
    name: String,
    domain: String,
    listen_port: i32,
    enable_https: bool,
    certificate: Json<Option<SiteCertificate>>,
    backend: Json<Backend>,
    waf_enabled: bool,
    waf_mode: String,
    active_status: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SiteRow> for Site {
    type Error = StoreError;

    fn try_from(row: SiteRow) -> Result<Self, Self::Error> {
        let listen_port = u16::try_from(row.listen_port)
            .map_err(|_| StoreError::Corrupt(format!("listen_port {}", row.listen_port)))?;
        let waf_mode = WafMode::parse(&row.waf_mode)
            .ok_or_else(|| StoreError::Corrupt(format!("waf_mode {}", row.waf_mode)))?;

        Ok(Site {
            id: row.id,
            name: row.name,
            domain: row.domain,
            listen_port,
            enable_https: row.enable_https,
            certificate: row.certificate.0,
            backend: row.backend.0,
            waf_enabled: row.waf_enabled,
            waf_mode,
            active_status: row.active_status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SITE_COLUMNS: &str = "id, name, domain, listen_port, enable_https, certificate, backend, \
                            waf_enabled, waf_mode, active_status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgSiteRepository {
    pool: PgPool,
}

impl PgSiteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiteRepository for PgSiteRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Site>, StoreError> {
        sqlx::query_as::<_, SiteRow>(&format!("SELECT {SITE_COLUMNS} FROM sites WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Site::try_from)
            .transpose()
    }

    async fn list(&self, params: &PaginationParams) -> Result<Paginated<Site>, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sites")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, SiteRow>(&format!(
            "SELECT {SITE_COLUMNS} FROM sites ORDER BY created_at DESC, name LIMIT $1 OFFSET $2"
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        let sites = rows
            .into_iter()
            .map(Site::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Paginated::new(sites, total, params))
    }

    async fn insert(&self, site: Site) -> Result<Site, StoreError> {
        sqlx::query_as::<_, SiteRow>(&format!(
            r#"INSERT INTO sites (id, name, domain, listen_port, enable_https, certificate, backend,
                                  waf_enabled, waf_mode, active_status, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
               RETURNING {SITE_COLUMNS}"#
        ))
        .bind(site.id)
        .bind(&site.name)
        .bind(&site.domain)
        .bind(i32::from(site.listen_port))
        .bind(site.enable_https)
        .bind(Json(&site.certificate))
        .bind(Json(&site.backend))
        .bind(site.waf_enabled)
        .bind(site.waf_mode.as_str())
        .bind(site.active_status)
        .bind(site.created_at)
        .bind(site.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::on_unique("site domain and port"))
        .and_then(Site::try_from)
    }

    async fn update(&self, site: Site) -> Result<Site, StoreError> {
        sqlx::query_as::<_, SiteRow>(&format!(
            r#"UPDATE sites
               SET name = $2, domain = $3, listen_port = $4, enable_https = $5,
                   certificate = $6, backend = $7, waf_enabled = $8, waf_mode = $9,
                   active_status = $10, updated_at = $11
               WHERE id = $1
               RETURNING {SITE_COLUMNS}"#
        ))
        .bind(site.id)
        .bind(&site.name)
        .bind(&site.domain)
        .bind(i32::from(site.listen_port))
        .bind(site.enable_https)
        .bind(Json(&site.certificate))
        .bind(Json(&site.backend))
        .bind(site.waf_enabled)
        .bind(site.waf_mode.as_str())
        .bind(site.active_status)
        .bind(site.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::on_unique("site domain and port"))?
        .ok_or_else(|| StoreError::NotFound("site".to_string()))
        .and_then(Site::try_from)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM sites WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("site".to_string()));
        }
        Ok(())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sites")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simplewaf_models::sites::BackendServer;

    fn site(domain: &str, port: u16) -> Site {
        let now = Utc::now();
        Site {
            id: Uuid::new_v4(),
            name: domain.to_string(),
            domain: domain.to_string(),
            listen_port: port,
            enable_https: false,
            certificate: None,
            backend: Backend {
                servers: vec![BackendServer {
                    host: "10.0.0.5".to_string(),
                    port: 8080,
                    is_ssl: false,
                }],
            },
            waf_enabled: true,
            waf_mode: WafMode::Protection,
            active_status: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_same_domain_on_other_port_is_allowed() {
        let repo = MemorySiteRepository::default();
        repo.insert(site("shop.example.com", 80)).await.unwrap();
        repo.insert(site("shop.example.com", 443)).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_listener_conflicts() {
        let repo = MemorySiteRepository::default();
        repo.insert(site("shop.example.com", 443)).await.unwrap();
        let err = repo.insert(site("shop.example.com", 443)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_keeps_own_listener() {
        let repo = MemorySiteRepository::default();
        let mut stored = repo.insert(site("shop.example.com", 443)).await.unwrap();
        stored.name = "renamed".to_string();
        let updated = repo.update(stored).await.unwrap();
        assert_eq!(updated.name, "renamed");
    }

    #[tokio::test]
    async fn test_delete_missing_site() {
        let repo = MemorySiteRepository::default();
        assert!(matches!(
            repo.delete(Uuid::new_v4()).await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[test]
    fn test_row_with_unknown_mode_is_corrupt() {
        let now = Utc::now();
        let row = SiteRow {
            id: Uuid::new_v4(),
            name: "x".to_string(),
            domain: "x.example.com".to_string(),
            listen_port: 443,
            enable_https: false,
            certificate: Json(None),
            backend: Json(Backend { servers: vec![] }),
            waf_enabled: true,
            waf_mode: "block".to_string(),
            active_status: true,
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(Site::try_from(row), Err(StoreError::Corrupt(_))));
    }
}
