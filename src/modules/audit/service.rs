use tracing::{error, instrument};

use simplewaf_core::{AppError, Paginated};
use simplewaf_models::audit::{AuditEntry, AuditQuery, NewAuditEntry};

use crate::pipeline::Identity;
use crate::state::AppState;

pub struct AuditService;

impl AuditService {
    /// Starts an entry attributed to `actor`.
    pub fn entry(
        actor: &Identity,
        action: &'static str,
        resource_type: &'static str,
    ) -> NewAuditEntry {
        NewAuditEntry::new(actor.user_id, &actor.username, action, resource_type)
    }

    /// Appends an entry after a mutation has been committed.
    ///
    /// The mutation has already happened, so a failing audit store is logged
    /// rather than turned into an error response.
    pub async fn record(state: &AppState, entry: NewAuditEntry) {
        let action = entry.action;
        let resource_type = entry.resource_type;
        if let Err(err) = state.repos.audit.append(entry).await {
            error!(action, resource_type, error = %err, "failed to append audit entry");
        }
    }

    #[instrument(skip(state))]
    pub async fn list_entries(
        state: &AppState,
        query: AuditQuery,
    ) -> Result<Paginated<AuditEntry>, AppError> {
        Ok(state.repos.audit.list(&query).await?)
    }
}
