use simplewaf_core::Capability;

use crate::modules::audit::controller::list_audit_entries;
use crate::pipeline::Access;
use crate::router::RouteDecl;

pub fn init_audit_routes() -> Vec<RouteDecl> {
    vec![RouteDecl::get(
        "/audit",
        Access::Capability(Capability::AuditRead),
        list_audit_entries,
    )]
}
