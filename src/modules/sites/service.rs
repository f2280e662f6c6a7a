use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use simplewaf_core::{AppError, Paginated, PaginationParams};
use simplewaf_models::audit::{actions, resources};
use simplewaf_models::sites::{Site, SiteRequest};

use crate::modules::audit::AuditService;
use crate::pipeline::Identity;
use crate::state::AppState;

fn check_https(req: &SiteRequest) -> Result<(), AppError> {
    if req.enable_https && req.certificate.is_none() {
        return Err(AppError::bad_request(
            "a certificate is required when HTTPS is enabled",
        ));
    }
    Ok(())
}

fn audit_details(site: &Site) -> serde_json::Value {
    json!({
        "name": site.name,
        "domain": site.domain,
        "listenPort": site.listen_port,
    })
}

pub struct SiteService;

impl SiteService {
    #[instrument(skip(state, dto), fields(domain = %dto.domain))]
    pub async fn create_site(
        state: &AppState,
        actor: &Identity,
        dto: SiteRequest,
    ) -> Result<Site, AppError> {
        check_https(&dto)?;
        let site = state.repos.sites.insert(Site::from_request(dto)).await?;

        AuditService::record(
            state,
            AuditService::entry(actor, actions::CREATE, resources::SITE)
                .resource(site.id)
                .details(audit_details(&site)),
        )
        .await;

        Ok(site)
    }

    #[instrument(skip(state))]
    pub async fn list_sites(
        state: &AppState,
        params: PaginationParams,
    ) -> Result<Paginated<Site>, AppError> {
        Ok(state.repos.sites.list(&params).await?)
    }

    #[instrument(skip(state))]
    pub async fn get_site(state: &AppState, id: Uuid) -> Result<Site, AppError> {
        state
            .repos
            .sites
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("site not found"))
    }

    #[instrument(skip(state, dto))]
    pub async fn update_site(
        state: &AppState,
        actor: &Identity,
        id: Uuid,
        dto: SiteRequest,
    ) -> Result<Site, AppError> {
        let mut site = Self::get_site(state, id).await?;
        check_https(&dto)?;

        site.apply(dto);
        let site = state.repos.sites.update(site).await?;

        AuditService::record(
            state,
            AuditService::entry(actor, actions::UPDATE, resources::SITE)
                .resource(site.id)
                .details(audit_details(&site)),
        )
        .await;

        Ok(site)
    }

    #[instrument(skip(state))]
    pub async fn delete_site(state: &AppState, actor: &Identity, id: Uuid) -> Result<(), AppError> {
        state.repos.sites.delete(id).await?;

        AuditService::record(
            state,
            AuditService::entry(actor, actions::DELETE, resources::SITE).resource(id),
        )
        .await;

        Ok(())
    }
}
