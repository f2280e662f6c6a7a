use axum::extract::State;
use tracing::instrument;

use simplewaf_core::{ApiResponse, AppError, Paginated};
use simplewaf_models::waf_logs::{EventPage, EventQuery, LogQuery, WafLog};

use crate::modules::logs::service::LogService;
use crate::state::AppState;
use crate::validator::QueryParams;

#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<LogQuery>,
) -> Result<ApiResponse<Paginated<WafLog>>, AppError> {
    let logs = LogService::list_logs(&state, query).await?;
    Ok(ApiResponse::ok(logs))
}

#[instrument(skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<EventQuery>,
) -> Result<ApiResponse<EventPage>, AppError> {
    let events = LogService::list_events(&state, query).await?;
    Ok(ApiResponse::ok(events))
}
