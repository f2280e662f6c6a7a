//! # SimpleWAF Core
//!
//! Core types, errors, and utilities for the SimpleWAF management API.
//!
//! This crate provides foundational types used throughout the application:
//!
//! - [`errors`]: Application error type with HTTP envelope conversion
//! - [`response`]: The `ApiResponse` envelope and per-request id propagation
//! - [`permissions`]: Capabilities, roles, and the role-to-capability registry
//! - [`pagination`]: Pagination parameters and paginated result shape
//! - [`password`]: Password hashing and verification
//! - [`serde`]: Custom serde deserialization helpers
//!
//! # Example
//!
//! ```ignore
//! use simplewaf_core::{AppError, Capability, PermissionRegistry};
//!
//! let registry = PermissionRegistry::new();
//! if !registry.has_capability("auditor", Capability::UserRead) {
//!     return Err(AppError::forbidden("forbidden: missing capability user:read"));
//! }
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod permissions;
pub mod response;
pub mod serde;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use pagination::{Paginated, PaginationParams};
pub use password::{hash_password_with_cost, verify_password};
pub use permissions::{Capability, PermissionRegistry, Role};
pub use response::{ApiResponse, current_request_id};
