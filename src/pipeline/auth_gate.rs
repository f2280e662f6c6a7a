use std::sync::Arc;

use async_trait::async_trait;

use simplewaf_auth::TokenCodec;
use simplewaf_core::AppError;
use simplewaf_db::UserRepository;

use super::{Gate, Identity, RequestContext};

pub const MISSING_TOKEN: &str = "missing or malformed token";
pub const ACCOUNT_UNAVAILABLE: &str = "account not found or disabled";

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively. Returns `None` for any other
/// scheme or an empty token.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty() && !token.contains(char::is_whitespace)).then_some(token)
}

/// Verifies the bearer token and loads the account it names.
///
/// A valid signature is not enough: the account must still exist and be
/// enabled, and the resulting [`Identity`] carries the stored role rather
/// than the one baked into the token.
#[derive(Clone)]
pub struct AuthGate {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenCodec>,
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl AuthGate {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenCodec>) -> Self {
        Self { users, tokens }
    }
}

#[async_trait]
impl Gate for AuthGate {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn check(&self, mut ctx: RequestContext) -> Result<RequestContext, AppError> {
        let token = ctx
            .authorization
            .as_deref()
            .and_then(bearer_token)
            .ok_or_else(|| AppError::unauthorized(MISSING_TOKEN))?;

        let claims = self.tokens.verify(token)?;
        let user_id = claims.user_id()?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .filter(|user| !user.disabled)
            .ok_or_else(|| AppError::unauthorized(ACCOUNT_UNAVAILABLE))?;

        ctx.identity = Some(Identity::from(&user));
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use simplewaf_auth::Claims;
    use simplewaf_db::MemoryUserRepository;
    use simplewaf_models::users::User;
    use uuid::Uuid;

    const SECRET: &[u8] = b"gate-test-secret";

    async fn setup() -> (AuthGate, Arc<dyn UserRepository>, Arc<TokenCodec>) {
        let users: Arc<dyn UserRepository> = Arc::new(MemoryUserRepository::default());
        let tokens = Arc::new(TokenCodec::new(SECRET, 3600));
        (AuthGate::new(users.clone(), tokens.clone()), users, tokens)
    }

    fn ctx(header: Option<String>) -> RequestContext {
        RequestContext::new("/users", header)
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("BEARER   abc  "), Some("abc"));
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer a b"), None);
        assert_eq!(bearer_token(""), None);
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let (gate, _, _) = setup().await;
        let err = gate.check(ctx(None)).await.unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
        assert_eq!(err.public_message(), MISSING_TOKEN);
    }

    #[tokio::test]
    async fn test_wrong_scheme_is_unauthorized() {
        let (gate, _, _) = setup().await;
        let err = gate
            .check(ctx(Some("Token abc".to_string())))
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
        assert_eq!(err.public_message(), MISSING_TOKEN);
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let (gate, _, _) = setup().await;
        let err = gate
            .check(ctx(Some("Bearer not-a-jwt".to_string())))
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
        assert_eq!(err.public_message(), "malformed token");
    }

    #[tokio::test]
    async fn test_valid_token_loads_live_identity() {
        let (gate, users, tokens) = setup().await;
        let mut user = users
            .insert(User::new("alice", "hash", "auditor", false))
            .await
            .unwrap();

        // The token says "admin"; the stored record wins.
        let issued = tokens.issue(user.id, "admin").unwrap();
        user.need_reset = true;
        users.update(user.clone()).await.unwrap();

        let ctx = gate
            .check(ctx(Some(format!("Bearer {}", issued.token))))
            .await
            .unwrap();
        let identity = ctx.identity.unwrap();
        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.role, "auditor");
        assert!(identity.password_reset_required);
    }

    #[tokio::test]
    async fn test_unknown_account_is_unauthorized() {
        let (gate, _, tokens) = setup().await;
        let issued = tokens.issue(Uuid::new_v4(), "admin").unwrap();
        let err = gate
            .check(ctx(Some(format!("Bearer {}", issued.token))))
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
        assert_eq!(err.public_message(), ACCOUNT_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_disabled_account_is_unauthorized() {
        let (gate, users, tokens) = setup().await;
        let mut user = User::new("bob", "hash", "admin", false);
        user.disabled = true;
        let user = users.insert(user).await.unwrap();
        let issued = tokens.issue(user.id, "admin").unwrap();

        let err = gate
            .check(ctx(Some(format!("Bearer {}", issued.token))))
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), ACCOUNT_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_non_uuid_subject_is_malformed() {
        let (gate, _, _) = setup().await;
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            role: "admin".to_string(),
            iat: now,
            exp: now + 60,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let err = gate
            .check(ctx(Some(format!("Bearer {token}"))))
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
        assert_eq!(err.public_message(), "malformed token");
    }
}
