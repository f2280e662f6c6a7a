use axum::{extract::FromRequestParts, http::request::Parts};

use simplewaf_core::AppError;

use crate::pipeline::Identity;
use crate::pipeline::auth_gate::MISSING_TOKEN;

/// The identity established by the gate pipeline.
///
/// Rejects with 401 when no gate ran for the route, so a handler that asks
/// for a caller can never run anonymously by mistake.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::unauthorized(MISSING_TOKEN))
    }
}
