use axum::extract::State;
use tracing::instrument;

use simplewaf_core::{ApiResponse, AppError, Paginated, PaginationParams};
use simplewaf_models::sites::{Site, SiteRequest};

use crate::middleware::CurrentUser;
use crate::modules::sites::service::SiteService;
use crate::state::AppState;
use crate::validator::{IdPath, QueryParams, ValidatedJson};

#[instrument(skip(state, dto))]
pub async fn create_site(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ValidatedJson(dto): ValidatedJson<SiteRequest>,
) -> Result<ApiResponse<Site>, AppError> {
    let site = SiteService::create_site(&state, &actor, dto).await?;
    Ok(ApiResponse::created(site))
}

#[instrument(skip(state))]
pub async fn list_sites(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<PaginationParams>,
) -> Result<ApiResponse<Paginated<Site>>, AppError> {
    let sites = SiteService::list_sites(&state, params).await?;
    Ok(ApiResponse::ok(sites))
}

#[instrument(skip(state))]
pub async fn get_site(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<ApiResponse<Site>, AppError> {
    let site = SiteService::get_site(&state, id).await?;
    Ok(ApiResponse::ok(site))
}

#[instrument(skip(state, dto))]
pub async fn update_site(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    IdPath(id): IdPath,
    ValidatedJson(dto): ValidatedJson<SiteRequest>,
) -> Result<ApiResponse<Site>, AppError> {
    let site = SiteService::update_site(&state, &actor, id, dto).await?;
    Ok(ApiResponse::ok(site))
}

#[instrument(skip(state))]
pub async fn delete_site(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    IdPath(id): IdPath,
) -> Result<ApiResponse<()>, AppError> {
    SiteService::delete_site(&state, &actor, id).await?;
    Ok(ApiResponse::message("site deleted"))
}
