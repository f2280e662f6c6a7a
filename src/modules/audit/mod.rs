pub mod controller;
pub mod router;
pub mod service;

pub use router::init_audit_routes;
pub use service::AuditService;
