use simplewaf_core::Capability;

use crate::modules::config::controller::{get_config, update_config};
use crate::pipeline::Access;
use crate::router::RouteDecl;

pub fn init_config_routes() -> Vec<RouteDecl> {
    vec![
        RouteDecl::get("/config", Access::Capability(Capability::ConfigRead), get_config),
        RouteDecl::put(
            "/config",
            Access::Capability(Capability::ConfigUpdate),
            update_config,
        ),
    ]
}
