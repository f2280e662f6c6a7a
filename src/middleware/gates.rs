use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use simplewaf_core::AppError;

use crate::pipeline::{Pipeline, RequestContext};

/// What one route's gate adapter needs: its pipeline and route template.
#[derive(Debug, Clone)]
pub struct RouteGates {
    pub route: &'static str,
    pub pipeline: Pipeline,
}

/// Runs a route's gate pipeline ahead of its handler.
///
/// Installed per route with `route_layer`, so unmatched paths and methods
/// never reach it. On success the [`Identity`](crate::pipeline::Identity)
/// is inserted into request extensions for [`CurrentUser`](super::CurrentUser).
pub async fn enforce_gates(
    State(gates): State<RouteGates>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if gates.pipeline.is_empty() {
        return Ok(next.run(req).await);
    }

    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let ctx = gates
        .pipeline
        .run(RequestContext::new(gates.route, authorization))
        .await?;

    if let Some(identity) = ctx.identity {
        req.extensions_mut().insert(identity);
    }
    Ok(next.run(req).await)
}
