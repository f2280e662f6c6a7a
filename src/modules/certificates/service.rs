use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use simplewaf_core::{AppError, Paginated, PaginationParams};
use simplewaf_models::audit::{actions, resources};
use simplewaf_models::certificates::{Certificate, CertificateRequest, CertificateSummary};

use crate::modules::audit::AuditService;
use crate::pipeline::Identity;
use crate::state::AppState;

pub struct CertificateService;

impl CertificateService {
    #[instrument(skip(state, dto), fields(name = %dto.name))]
    pub async fn create_certificate(
        state: &AppState,
        actor: &Identity,
        dto: CertificateRequest,
    ) -> Result<Certificate, AppError> {
        let cert = state
            .repos
            .certificates
            .insert(Certificate::from_request(dto))
            .await?;

        AuditService::record(
            state,
            AuditService::entry(actor, actions::CREATE, resources::CERTIFICATE)
                .resource(cert.id)
                .details(json!({ "name": cert.name, "domains": cert.domains })),
        )
        .await;

        Ok(cert)
    }

    /// Listings never include key material.
    #[instrument(skip(state))]
    pub async fn list_certificates(
        state: &AppState,
        params: PaginationParams,
    ) -> Result<Paginated<CertificateSummary>, AppError> {
        let page = state.repos.certificates.list(&params).await?;
        Ok(page.map(CertificateSummary::from))
    }

    #[instrument(skip(state))]
    pub async fn get_certificate(state: &AppState, id: Uuid) -> Result<Certificate, AppError> {
        state
            .repos
            .certificates
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("certificate not found"))
    }

    #[instrument(skip(state, dto))]
    pub async fn update_certificate(
        state: &AppState,
        actor: &Identity,
        id: Uuid,
        dto: CertificateRequest,
    ) -> Result<Certificate, AppError> {
        let mut cert = Self::get_certificate(state, id).await?;
        cert.apply(dto);
        let cert = state.repos.certificates.update(cert).await?;

        AuditService::record(
            state,
            AuditService::entry(actor, actions::UPDATE, resources::CERTIFICATE)
                .resource(cert.id)
                .details(json!({ "name": cert.name, "domains": cert.domains })),
        )
        .await;

        Ok(cert)
    }

    #[instrument(skip(state))]
    pub async fn delete_certificate(
        state: &AppState,
        actor: &Identity,
        id: Uuid,
    ) -> Result<(), AppError> {
        state.repos.certificates.delete(id).await?;

        AuditService::record(
            state,
            AuditService::entry(actor, actions::DELETE, resources::CERTIFICATE).resource(id),
        )
        .await;

        Ok(())
    }
}
