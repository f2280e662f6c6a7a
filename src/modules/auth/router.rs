use crate::modules::auth::controller::{login, me, reset_password};
use crate::pipeline::Access;
use crate::pipeline::password_gate::RESET_PASSWORD_ROUTE;
use crate::router::RouteDecl;

pub fn init_auth_routes() -> Vec<RouteDecl> {
    vec![
        RouteDecl::post("/auth/login", Access::Public, login),
        RouteDecl::post(RESET_PASSWORD_ROUTE, Access::Authenticated, reset_password),
        RouteDecl::get("/auth/me", Access::PasswordChecked, me),
    ]
}
