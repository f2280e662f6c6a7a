use simplewaf_core::Capability;

use crate::modules::users::controller::{create_user, delete_user, list_users, update_user};
use crate::pipeline::Access;
use crate::router::RouteDecl;

pub fn init_users_routes() -> Vec<RouteDecl> {
    vec![
        RouteDecl::post(
            "/users",
            Access::Capability(Capability::UserCreate),
            create_user,
        ),
        RouteDecl::get("/users", Access::Capability(Capability::UserRead), list_users),
        RouteDecl::put(
            "/users/{id}",
            Access::Capability(Capability::UserUpdate),
            update_user,
        ),
        RouteDecl::delete(
            "/users/{id}",
            Access::Capability(Capability::UserDelete),
            delete_user,
        ),
    ]
}
