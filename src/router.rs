//! Route composition.
//!
//! Every API route is declared once as a [`RouteDecl`]: method, path, access
//! level and handler. [`compose`] turns a table of declarations into an axum
//! [`Router`], wrapping each handler in the gate pipeline its access level
//! expands to. Routes sharing a path are merged into one method router, so
//! `GET /site` and `POST /site` can demand different capabilities.

use std::collections::BTreeMap;

use axum::{
    Router,
    handler::Handler,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{self, MethodRouter},
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use simplewaf_core::{AppError, ApiResponse};

use crate::logging::logging_middleware;
use crate::middleware::{
    RouteGates, X_REQUEST_ID, enforce_gates, recover_panics, request_id_middleware,
};
use crate::modules::{audit, auth, certificates, config, logs, sites, system, users};
use crate::pipeline::{Access, GateFactory};
use crate::state::AppState;

pub const API_BASE: &str = "/api/v1";

/// One entry of the route table.
pub struct RouteDecl {
    pub method: Method,
    pub path: &'static str,
    pub access: Access,
    handler: MethodRouter<AppState>,
}

impl std::fmt::Debug for RouteDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDecl")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}

impl RouteDecl {
    pub fn get<H, T>(path: &'static str, access: Access, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self::new(Method::GET, path, access, routing::get(handler))
    }

    pub fn post<H, T>(path: &'static str, access: Access, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self::new(Method::POST, path, access, routing::post(handler))
    }

    pub fn put<H, T>(path: &'static str, access: Access, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self::new(Method::PUT, path, access, routing::put(handler))
    }

    pub fn delete<H, T>(path: &'static str, access: Access, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self::new(Method::DELETE, path, access, routing::delete(handler))
    }

    fn new(
        method: Method,
        path: &'static str,
        access: Access,
        handler: MethodRouter<AppState>,
    ) -> Self {
        Self {
            method,
            path,
            access,
            handler,
        }
    }
}

/// The full API route table, relative to [`API_BASE`].
pub fn api_routes() -> Vec<RouteDecl> {
    [
        auth::init_auth_routes(),
        users::init_users_routes(),
        sites::init_sites_routes(),
        certificates::init_certificates_routes(),
        logs::init_logs_routes(),
        config::init_config_routes(),
        audit::init_audit_routes(),
        system::init_system_routes(),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Builds a router from a route table, guarding each handler with the gate
/// pipeline derived from its access level.
pub fn compose(decls: Vec<RouteDecl>, gates: &GateFactory) -> Router<AppState> {
    let mut by_path: BTreeMap<&'static str, MethodRouter<AppState>> = BTreeMap::new();

    for decl in decls {
        let route_gates = RouteGates {
            route: decl.path,
            pipeline: gates.pipeline(decl.access),
        };
        let guarded = decl
            .handler
            .route_layer(middleware::from_fn_with_state(route_gates, enforce_gates));

        let merged = match by_path.remove(decl.path) {
            Some(existing) => existing.merge(guarded),
            None => guarded,
        };
        by_path.insert(decl.path, merged);
    }

    by_path
        .into_iter()
        .fold(Router::new(), |router, (path, method_router)| {
            router.route(path, method_router)
        })
}

async fn health() -> ApiResponse<serde_json::Value> {
    ApiResponse::ok(json!({ "status": "ok" }))
}

async fn not_found() -> AppError {
    AppError::not_found("route not found")
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            X_REQUEST_ID.clone(),
        ])
        .expose_headers([X_REQUEST_ID.clone()])
        .allow_credentials(true)
}

pub fn init_router(state: AppState) -> Router {
    let api = compose(api_routes(), &state.gate_factory());

    Router::new()
        .route("/health", routing::get(health))
        .nest(API_BASE, api)
        .fallback(not_found)
        .with_state(state.clone())
        .layer(middleware::from_fn(recover_panics))
        .layer(cors_layer(&state))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use simplewaf_core::{Capability, PermissionRegistry};

    #[test]
    fn test_route_table_has_no_duplicates() {
        let mut seen = HashSet::new();
        for decl in api_routes() {
            assert!(
                seen.insert((decl.method.clone(), decl.path)),
                "duplicate route {} {}",
                decl.method,
                decl.path
            );
        }
    }

    #[test]
    fn test_every_required_capability_has_a_holder() {
        let registry = PermissionRegistry::new();
        for decl in api_routes() {
            if let Some(cap) = decl.access.capability() {
                assert!(
                    !registry.roles_with(cap).is_empty(),
                    "{} {} requires {cap}, which no role holds",
                    decl.method,
                    decl.path
                );
            }
        }
    }

    #[test]
    fn test_route_access_levels() {
        let table: Vec<(Method, &str, Access)> = api_routes()
            .into_iter()
            .map(|d| (d.method, d.path, d.access))
            .collect();

        let expect = |method: Method, path: &'static str, access: Access| {
            assert!(
                table.contains(&(method.clone(), path, access)),
                "missing {method} {path} as {access}"
            );
        };

        expect(Method::POST, "/auth/login", Access::Public);
        expect(Method::POST, "/auth/reset-password", Access::Authenticated);
        expect(Method::GET, "/auth/me", Access::PasswordChecked);
        expect(Method::POST, "/users", Access::Capability(Capability::UserCreate));
        expect(Method::GET, "/users", Access::Capability(Capability::UserRead));
        expect(Method::PUT, "/users/{id}", Access::Capability(Capability::UserUpdate));
        expect(Method::DELETE, "/users/{id}", Access::Capability(Capability::UserDelete));
        expect(Method::POST, "/site", Access::Capability(Capability::SiteCreate));
        expect(Method::GET, "/site", Access::Capability(Capability::SiteRead));
        expect(Method::GET, "/site/{id}", Access::Capability(Capability::SiteRead));
        expect(Method::PUT, "/site/{id}", Access::Capability(Capability::SiteUpdate));
        expect(Method::DELETE, "/site/{id}", Access::Capability(Capability::SiteDelete));
        expect(Method::POST, "/certificate", Access::Capability(Capability::CertCreate));
        expect(Method::GET, "/certificate", Access::Capability(Capability::CertRead));
        expect(Method::GET, "/certificate/{id}", Access::Capability(Capability::CertRead));
        expect(Method::PUT, "/certificate/{id}", Access::Capability(Capability::CertUpdate));
        expect(
            Method::DELETE,
            "/certificate/{id}",
            Access::Capability(Capability::CertDelete),
        );
        expect(Method::GET, "/logs", Access::Capability(Capability::LogsRead));
        expect(Method::GET, "/logs/events", Access::Capability(Capability::LogsRead));
        expect(Method::GET, "/config", Access::Capability(Capability::ConfigRead));
        expect(Method::PUT, "/config", Access::Capability(Capability::ConfigUpdate));
        expect(Method::GET, "/audit", Access::Capability(Capability::AuditRead));
        expect(
            Method::GET,
            "/system/status",
            Access::Capability(Capability::SystemStatus),
        );
        expect(
            Method::POST,
            "/system/restart",
            Access::Capability(Capability::SystemRestart),
        );
        assert_eq!(table.len(), 24);
    }
}
