use anyhow::{Context, bail};
use chrono::Utc;

use simplewaf_core::{Role, hash_password_with_cost};
use simplewaf_db::UserRepository;
use simplewaf_models::users::User;

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub role: String,
    pub require_reset: bool,
    pub password_cost: u32,
}

/// Creates an account directly in the store, bypassing the API.
pub async fn create_account(users: &dyn UserRepository, account: NewAccount) -> anyhow::Result<User> {
    if Role::parse(&account.role).is_none() {
        let known: Vec<&str> = Role::ALL.iter().map(|r| r.as_str()).collect();
        bail!("unknown role '{}', expected one of: {}", account.role, known.join(", "));
    }
    if account.password.len() < 6 {
        bail!("password must be at least 6 characters");
    }

    let hash = hash_password_with_cost(&account.password, account.password_cost).map_err(|e| e.error)?;
    let user = User::new(&account.username, hash, &account.role, account.require_reset);
    users
        .insert(user)
        .await
        .with_context(|| format!("creating account '{}'", account.username))
}

/// Replaces the password of `username` and re-enables the account.
pub async fn set_password(
    users: &dyn UserRepository,
    username: &str,
    password: &str,
    require_reset: bool,
    password_cost: u32,
) -> anyhow::Result<User> {
    if password.len() < 6 {
        bail!("password must be at least 6 characters");
    }

    let mut user = users
        .find_by_username(username)
        .await?
        .with_context(|| format!("no account named '{username}'"))?;

    user.password_hash = hash_password_with_cost(password, password_cost).map_err(|e| e.error)?;
    user.need_reset = require_reset;
    user.disabled = false;
    user.updated_at = Utc::now();

    Ok(users.update(user).await?)
}
