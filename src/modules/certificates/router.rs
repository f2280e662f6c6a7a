use simplewaf_core::Capability;

use crate::modules::certificates::controller::{
    create_certificate, delete_certificate, get_certificate, list_certificates,
    update_certificate,
};
use crate::pipeline::Access;
use crate::router::RouteDecl;

pub fn init_certificates_routes() -> Vec<RouteDecl> {
    vec![
        RouteDecl::post(
            "/certificate",
            Access::Capability(Capability::CertCreate),
            create_certificate,
        ),
        RouteDecl::get(
            "/certificate",
            Access::Capability(Capability::CertRead),
            list_certificates,
        ),
        RouteDecl::get(
            "/certificate/{id}",
            Access::Capability(Capability::CertRead),
            get_certificate,
        ),
        RouteDecl::put(
            "/certificate/{id}",
            Access::Capability(Capability::CertUpdate),
            update_certificate,
        ),
        RouteDecl::delete(
            "/certificate/{id}",
            Access::Capability(Capability::CertDelete),
            delete_certificate,
        ),
    ]
}
