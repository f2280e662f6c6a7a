//! Middleware and extractors for cross-cutting request concerns.
//!
//! # Modules
//!
//! - [`request_id`]: Accepts or generates `X-Request-ID`
//! - [`recovery`]: Converts handler panics into 500 envelopes
//! - [`gates`]: Hosts a route's gate pipeline inside axum
//! - [`current_user`]: Typed access to the authenticated identity
//!
//! # Layer order
//!
//! Global layers, outermost first:
//!
//! ```text
//! request_id -> logging -> CORS -> recovery -> router
//! ```
//!
//! Gate pipelines are attached per route with `route_layer`, so they only run
//! once a route has matched.
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::CurrentUser;
//!
//! async fn me(CurrentUser(identity): CurrentUser) -> String {
//!     identity.username
//! }
//! ```

pub mod current_user;
pub mod gates;
pub mod recovery;
pub mod request_id;

pub use current_user::CurrentUser;
pub use gates::{RouteGates, enforce_gates};
pub use recovery::recover_panics;
pub use request_id::{RequestId, X_REQUEST_ID, request_id_middleware};
