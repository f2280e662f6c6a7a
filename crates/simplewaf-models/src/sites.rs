//! Protected sites.
//!
//! A site binds a public `domain` and `listenPort` to one or more backend
//! servers, optionally terminating TLS with an attached certificate, and
//! selects how the WAF treats its traffic.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_domain;

/// `observation` only logs matches, `protection` blocks them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WafMode {
    Observation,
    #[default]
    Protection,
}

impl WafMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            WafMode::Observation => "observation",
            WafMode::Protection => "protection",
        }
    }

    pub fn parse(s: &str) -> Option<WafMode> {
        match s {
            "observation" => Some(WafMode::Observation),
            "protection" => Some(WafMode::Protection),
            _ => None,
        }
    }
}

impl fmt::Display for WafMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BackendServer {
    #[validate(length(min = 1, max = 255, message = "backend host is required"))]
    pub host: String,
    #[validate(range(min = 1, message = "backend port must be between 1 and 65535"))]
    pub port: u16,
    #[serde(default, rename = "isSSL")]
    pub is_ssl: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Backend {
    #[validate(length(min = 1, message = "at least one backend server is required"), nested)]
    pub servers: Vec<BackendServer>,
}

/// Certificate material embedded in a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SiteCertificate {
    #[validate(length(min = 1, message = "certName is required"))]
    pub cert_name: String,
    #[validate(length(min = 1, message = "publicKey is required"))]
    pub public_key: String,
    #[validate(length(min = 1, message = "privateKey is required"))]
    pub private_key: String,
    #[serde(default)]
    pub finger_print: String,
    #[serde(default)]
    pub issuer_name: String,
    #[serde(default)]
    pub expire_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: Uuid,
    pub name: String,
    pub domain: String,
    pub listen_port: u16,
    #[serde(rename = "enableHTTPS")]
    pub enable_https: bool,
    pub certificate: Option<SiteCertificate>,
    pub backend: Backend,
    pub waf_enabled: bool,
    pub waf_mode: WafMode,
    pub active_status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Site {
    pub fn from_request(req: SiteRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: req.name,
            domain: req.domain,
            listen_port: req.listen_port,
            enable_https: req.enable_https,
            certificate: req.certificate,
            backend: req.backend,
            waf_enabled: req.waf_enabled,
            waf_mode: req.waf_mode,
            active_status: req.active_status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every editable field, keeping identity and creation time.
    pub fn apply(&mut self, req: SiteRequest) {
        self.name = req.name;
        self.domain = req.domain;
        self.listen_port = req.listen_port;
        self.enable_https = req.enable_https;
        self.certificate = req.certificate;
        self.backend = req.backend;
        self.waf_enabled = req.waf_enabled;
        self.waf_mode = req.waf_mode;
        self.active_status = req.active_status;
        self.updated_at = Utc::now();
    }
}

fn default_true() -> bool {
    true
}

/// Body of both create and update; updates replace the whole site.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SiteRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1 to 100 characters"))]
    pub name: String,
    #[validate(custom(function = "validate_domain"))]
    pub domain: String,
    #[validate(range(min = 1, message = "listenPort must be between 1 and 65535"))]
    pub listen_port: u16,
    #[serde(default, rename = "enableHTTPS")]
    pub enable_https: bool,
    #[validate(nested)]
    #[serde(default)]
    pub certificate: Option<SiteCertificate>,
    #[validate(nested)]
    pub backend: Backend,
    #[serde(default = "default_true")]
    pub waf_enabled: bool,
    #[serde(default)]
    pub waf_mode: WafMode,
    #[serde(default = "default_true")]
    pub active_status: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_json() -> serde_json::Value {
        serde_json::json!({
            "name": "shop",
            "domain": "shop.example.com",
            "listenPort": 443,
            "enableHTTPS": false,
            "backend": { "servers": [{ "host": "10.0.0.5", "port": 8080, "isSSL": false }] }
        })
    }

    #[test]
    fn test_site_request_defaults() {
        let req: SiteRequest = serde_json::from_value(request_json()).unwrap();
        assert!(req.waf_enabled);
        assert!(req.active_status);
        assert_eq!(req.waf_mode, WafMode::Protection);
        assert!(req.certificate.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_site_request_requires_backend_server() {
        let mut json = request_json();
        json["backend"]["servers"] = serde_json::json!([]);
        let req: SiteRequest = serde_json::from_value(json).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_site_request_rejects_bad_domain() {
        let mut json = request_json();
        json["domain"] = serde_json::json!("http://shop");
        let req: SiteRequest = serde_json::from_value(json).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_site_wire_names() {
        let req: SiteRequest = serde_json::from_value(request_json()).unwrap();
        let json = serde_json::to_value(Site::from_request(req)).unwrap();
        assert_eq!(json["enableHTTPS"], false);
        assert_eq!(json["listenPort"], 443);
        assert_eq!(json["backend"]["servers"][0]["isSSL"], false);
        assert_eq!(json["wafMode"], "protection");
    }

    #[test]
    fn test_waf_mode_wire_format() {
        assert_eq!(
            serde_json::to_string(&WafMode::Observation).unwrap(),
            "\"observation\""
        );
        assert_eq!(WafMode::parse("protection"), Some(WafMode::Protection));
        assert_eq!(WafMode::parse("block"), None);
    }

    #[test]
    fn test_apply_keeps_identity() {
        let req: SiteRequest = serde_json::from_value(request_json()).unwrap();
        let mut site = Site::from_request(req.clone());
        let id = site.id;
        let created = site.created_at;

        let mut update = req;
        update.name = "shop-v2".to_string();
        site.apply(update);

        assert_eq!(site.id, id);
        assert_eq!(site.created_at, created);
        assert_eq!(site.name, "shop-v2");
    }
}
