use anyhow::Context;

use simplewaf_config::BootstrapConfig;
use simplewaf_core::{Role, hash_password_with_cost};
use simplewaf_db::UserRepository;
use simplewaf_models::users::User;

/// Creates the first administrator when the user store is empty.
///
/// The account is flagged for a password reset, so until the operator picks
/// a new password it can only reach `/auth/reset-password`. Returns the new
/// account, or `None` when users already exist.
pub async fn ensure_admin(
    users: &dyn UserRepository,
    config: &BootstrapConfig,
) -> anyhow::Result<Option<User>> {
    if users.count().await.context("counting users")? > 0 {
        return Ok(None);
    }

    let hash = hash_password_with_cost(&config.admin_password, config.password_cost)
        .map_err(|e| e.error)?;
    let admin = User::new(&config.admin_username, hash, Role::Admin.as_str(), true);
    let admin = users.insert(admin).await.context("creating bootstrap admin")?;
    Ok(Some(admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use simplewaf_core::verify_password;
    use simplewaf_db::MemoryUserRepository;

    fn config() -> BootstrapConfig {
        BootstrapConfig {
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
            password_cost: 4,
        }
    }

    #[tokio::test]
    async fn test_seeds_admin_into_empty_store() {
        let users = MemoryUserRepository::default();
        let admin = ensure_admin(&users, &config()).await.unwrap().unwrap();

        assert_eq!(admin.role, "admin");
        assert!(admin.need_reset);
        assert!(verify_password("admin123", &admin.password_hash).unwrap());
        assert_eq!(users.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_existing_users_are_left_alone() {
        let users = MemoryUserRepository::default();
        users
            .insert(User::new("ops", "hash", "user", false))
            .await
            .unwrap();

        assert!(ensure_admin(&users, &config()).await.unwrap().is_none());
        assert_eq!(users.count().await.unwrap(), 1);
    }
}
