//! TLS certificates managed independently of sites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validation::{validate_pem_certificate, validate_pem_private_key};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub public_key: String,
    pub private_key: String,
    pub finger_print: String,
    pub issuer_name: String,
    pub expire_date: Option<DateTime<Utc>>,
    pub domains: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Certificate {
    pub fn from_request(req: CertificateRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: req.name,
            description: req.description,
            public_key: req.public_key,
            private_key: req.private_key,
            finger_print: req.finger_print,
            issuer_name: req.issuer_name,
            expire_date: req.expire_date,
            domains: req.domains,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, req: CertificateRequest) {
        self.name = req.name;
        self.description = req.description;
        self.public_key = req.public_key;
        self.private_key = req.private_key;
        self.finger_print = req.finger_print;
        self.issuer_name = req.issuer_name;
        self.expire_date = req.expire_date;
        self.domains = req.domains;
        self.updated_at = Utc::now();
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expire_date.is_some_and(|exp| exp <= now)
    }
}

/// Listing form of a certificate. Key material is left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub finger_print: String,
    pub issuer_name: String,
    pub expire_date: Option<DateTime<Utc>>,
    pub domains: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Certificate> for CertificateSummary {
    fn from(cert: Certificate) -> Self {
        Self {
            id: cert.id,
            name: cert.name,
            description: cert.description,
            finger_print: cert.finger_print,
            issuer_name: cert.issuer_name,
            expire_date: cert.expire_date,
            domains: cert.domains,
            created_at: cert.created_at,
            updated_at: cert.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1 to 100 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "description must be at most 500 characters"))]
    pub description: String,
    #[validate(custom(function = "validate_pem_certificate"))]
    pub public_key: String,
    #[validate(custom(function = "validate_pem_private_key"))]
    pub private_key: String,
    #[serde(default)]
    pub finger_print: String,
    #[serde(default)]
    pub issuer_name: String,
    #[serde(default)]
    pub expire_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub domains: Vec<String>,
}
