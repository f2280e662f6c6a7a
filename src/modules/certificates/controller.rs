use axum::extract::State;
use tracing::instrument;

use simplewaf_core::{ApiResponse, AppError, Paginated, PaginationParams};
use simplewaf_models::certificates::{Certificate, CertificateRequest, CertificateSummary};

use crate::middleware::CurrentUser;
use crate::modules::certificates::service::CertificateService;
use crate::state::AppState;
use crate::validator::{IdPath, QueryParams, ValidatedJson};

#[instrument(skip(state, dto))]
pub async fn create_certificate(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ValidatedJson(dto): ValidatedJson<CertificateRequest>,
) -> Result<ApiResponse<Certificate>, AppError> {
    let cert = CertificateService::create_certificate(&state, &actor, dto).await?;
    Ok(ApiResponse::created(cert))
}

#[instrument(skip(state))]
pub async fn list_certificates(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<PaginationParams>,
) -> Result<ApiResponse<Paginated<CertificateSummary>>, AppError> {
    let certs = CertificateService::list_certificates(&state, params).await?;
    Ok(ApiResponse::ok(certs))
}

#[instrument(skip(state))]
pub async fn get_certificate(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<ApiResponse<Certificate>, AppError> {
    let cert = CertificateService::get_certificate(&state, id).await?;
    Ok(ApiResponse::ok(cert))
}

#[instrument(skip(state, dto))]
pub async fn update_certificate(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    IdPath(id): IdPath,
    ValidatedJson(dto): ValidatedJson<CertificateRequest>,
) -> Result<ApiResponse<Certificate>, AppError> {
    let cert = CertificateService::update_certificate(&state, &actor, id, dto).await?;
    Ok(ApiResponse::ok(cert))
}

#[instrument(skip(state))]
pub async fn delete_certificate(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    IdPath(id): IdPath,
) -> Result<ApiResponse<()>, AppError> {
    CertificateService::delete_certificate(&state, &actor, id).await?;
    Ok(ApiResponse::message("certificate deleted"))
}
