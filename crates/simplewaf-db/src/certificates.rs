use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use simplewaf_core::{Paginated, PaginationParams};
use simplewaf_models::certificates::Certificate;

use crate::error::StoreError;

/// Certificate storage. Names are unique.
#[async_trait]
pub trait CertificateRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Certificate>, StoreError>;
    async fn list(&self, params: &PaginationParams) -> Result<Paginated<Certificate>, StoreError>;
    async fn insert(&self, cert: Certificate) -> Result<Certificate, StoreError>;
    async fn update(&self, cert: Certificate) -> Result<Certificate, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
    async fn count(&self) -> Result<i64, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryCertificateRepository {
    certs: RwLock<HashMap<Uuid, Certificate>>,
}

fn name_taken(certs: &HashMap<Uuid, Certificate>, cert: &Certificate) -> bool {
    certs
        .values()
        .any(|c| c.id != cert.id && c.name == cert.name)
}

#[async_trait]
impl CertificateRepository for MemoryCertificateRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Certificate>, StoreError> {
        Ok(self.certs.read().await.get(&id).cloned())
    }

    async fn list(&self, params: &PaginationParams) -> Result<Paginated<Certificate>, StoreError> {
        let mut certs: Vec<Certificate> = self.certs.read().await.values().cloned().collect();
        certs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Paginated::from_vec(certs, params))
    }

    async fn insert(&self, cert: Certificate) -> Result<Certificate, StoreError> {
        let mut certs = self.certs.write().await;
        if name_taken(&certs, &cert) {
            return Err(StoreError::Conflict("certificate name".to_string()));
        }
        certs.insert(cert.id, cert.clone());
        Ok(cert)
    }

    async fn update(&self, cert: Certificate) -> Result<Certificate, StoreError> {
        let mut certs = self.certs.write().await;
        if !certs.contains_key(&cert.id) {
            return Err(StoreError::NotFound("certificate".to_string()));
        }
        if name_taken(&certs, &cert) {
            return Err(StoreError::Conflict("certificate name".to_string()));
        }
        certs.insert(cert.id, cert.clone());
        Ok(cert)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        match self.certs.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound("certificate".to_string())),
        }
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.certs.read().await.len() as i64)
    }
}

const CERT_COLUMNS: &str = "id, name, description, public_key, private_key, finger_print, \
                            issuer_name, expire_date, domains, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgCertificateRepository {
    pool: PgPool,
}

impl PgCertificateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CertificateRepository for PgCertificateRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Certificate>, StoreError> {
        let cert = sqlx::query_as::<_, Certificate>(&format!(
            "SELECT {CERT_COLUMNS} FROM certificates WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cert)
    }

    async fn list(&self, params: &PaginationParams) -> Result<Paginated<Certificate>, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM certificates")
            .fetch_one(&self.pool)
            .await?;

        let certs = sqlx::query_as::<_, Certificate>(&format!(
            "SELECT {CERT_COLUMNS} FROM certificates ORDER BY name LIMIT $1 OFFSET $2"
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Paginated::new(certs, total, params))
    }

    async fn insert(&self, cert: Certificate) -> Result<Certificate, StoreError> {
        sqlx::query_as::<_, Certificate>(&format!(
            r#"INSERT INTO certificates (id, name, description, public_key, private_key,
                                         finger_print, issuer_name, expire_date, domains,
                                         created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
               RETURNING {CERT_COLUMNS}"#
        ))
        .bind(cert.id)
        .bind(&cert.name)
        .bind(&cert.description)
        .bind(&cert.public_key)
        .bind(&cert.private_key)
        .bind(&cert.finger_print)
        .bind(&cert.issuer_name)
        .bind(cert.expire_date)
        .bind(&cert.domains)
        .bind(cert.created_at)
        .bind(cert.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::on_unique("certificate name"))
    }

    async fn update(&self, cert: Certificate) -> Result<Certificate, StoreError> {
        sqlx::query_as::<_, Certificate>(&format!(
            r#"UPDATE certificates
               SET name = $2, description = $3, public_key = $4, private_key = $5,
                   finger_print = $6, issuer_name = $7, expire_date = $8, domains = $9,
                   updated_at = $10
               WHERE id = $1
               RETURNING {CERT_COLUMNS}"#
        ))
        .bind(cert.id)
        .bind(&cert.name)
        .bind(&cert.description)
        .bind(&cert.public_key)
        .bind(&cert.private_key)
        .bind(&cert.finger_print)
        .bind(&cert.issuer_name)
        .bind(cert.expire_date)
        .bind(&cert.domains)
        .bind(cert.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::on_unique("certificate name"))?
        .ok_or_else(|| StoreError::NotFound("certificate".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM certificates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("certificate".to_string()));
        }
        Ok(())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM certificates")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
