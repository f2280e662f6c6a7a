use simplewaf_core::Capability;

use crate::modules::sites::controller::{
    create_site, delete_site, get_site, list_sites, update_site,
};
use crate::pipeline::Access;
use crate::router::RouteDecl;

pub fn init_sites_routes() -> Vec<RouteDecl> {
    vec![
        RouteDecl::post("/site", Access::Capability(Capability::SiteCreate), create_site),
        RouteDecl::get("/site", Access::Capability(Capability::SiteRead), list_sites),
        RouteDecl::get("/site/{id}", Access::Capability(Capability::SiteRead), get_site),
        RouteDecl::put(
            "/site/{id}",
            Access::Capability(Capability::SiteUpdate),
            update_site,
        ),
        RouteDecl::delete(
            "/site/{id}",
            Access::Capability(Capability::SiteDelete),
            delete_site,
        ),
    ]
}
