use simplewaf_core::Capability;

use crate::modules::system::controller::{restart, status};
use crate::pipeline::Access;
use crate::router::RouteDecl;

pub fn init_system_routes() -> Vec<RouteDecl> {
    vec![
        RouteDecl::get(
            "/system/status",
            Access::Capability(Capability::SystemStatus),
            status,
        ),
        RouteDecl::post(
            "/system/restart",
            Access::Capability(Capability::SystemRestart),
            restart,
        ),
    ]
}
