use simplewaf_core::Capability;

use crate::modules::logs::controller::{list_events, list_logs};
use crate::pipeline::Access;
use crate::router::RouteDecl;

pub fn init_logs_routes() -> Vec<RouteDecl> {
    vec![
        RouteDecl::get("/logs", Access::Capability(Capability::LogsRead), list_logs),
        RouteDecl::get(
            "/logs/events",
            Access::Capability(Capability::LogsRead),
            list_events,
        ),
    ]
}
