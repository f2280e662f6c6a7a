use axum::extract::State;
use tracing::instrument;

use simplewaf_core::{ApiResponse, AppError, Paginated};
use simplewaf_models::audit::{AuditEntry, AuditQuery};

use crate::modules::audit::service::AuditService;
use crate::state::AppState;
use crate::validator::QueryParams;

#[instrument(skip(state))]
pub async fn list_audit_entries(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<AuditQuery>,
) -> Result<ApiResponse<Paginated<AuditEntry>>, AppError> {
    let entries = AuditService::list_entries(&state, query).await?;
    Ok(ApiResponse::ok(entries))
}
