//! # SimpleWAF Models
//!
//! Domain models and request/response DTOs shared by the server, the
//! repositories and the CLI. Wire formats are camelCase JSON.
//!
//! - [`users`]: user accounts and user management DTOs
//! - [`auth`]: login and password reset DTOs
//! - [`sites`]: protected sites and their backends
//! - [`certificates`]: TLS certificates
//! - [`waf_logs`]: WAF log records, queries and aggregated attack events
//! - [`audit`]: audit trail entries
//! - [`config`]: runtime-editable global configuration
//! - [`system`]: system status
//! - [`validation`]: shared field validators

pub mod audit;
pub mod auth;
pub mod certificates;
pub mod config;
pub mod sites;
pub mod system;
pub mod users;
pub mod validation;
pub mod waf_logs;
