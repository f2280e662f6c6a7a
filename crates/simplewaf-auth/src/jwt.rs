//! HS256 token issuance and verification.
//!
//! [`TokenCodec`] is a pure function of the token, the current time and the
//! signing secret. It never touches the user store.
//!
//! # Verification order
//!
//! 1. The token must parse as a JWT with our claim set, otherwise
//!    [`TokenError::Malformed`].
//! 2. If the current time is past `exp` the result is
//!    [`TokenError::Expired`]. This is decided before the signature is
//!    checked, so an expired token is reported as expired whatever its
//!    signature.
//! 3. The HS256 signature must match, otherwise
//!    [`TokenError::InvalidSignature`].
//!
//! Expiry has no leeway.
//!
//! # Example
//!
//! ```ignore
//! use simplewaf_auth::TokenCodec;
//! use simplewaf_config::JwtConfig;
//!
//! let codec = TokenCodec::from_config(&JwtConfig::from_env());
//! let issued = codec.issue(user_id, "admin")?;
//! let claims = codec.verify(&issued.token)?;
//! assert_eq!(claims.sub, user_id.to_string());
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use uuid::Uuid;

use simplewaf_config::JwtConfig;
use simplewaf_core::AppError;

use crate::claims::Claims;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("token expired")]
    Expired,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("failed to encode token: {0}")]
    Encoding(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encoding(_) => AppError::internal(err),
            _ => AppError::unauthorized(err.to_string()),
        }
    }
}

/// A freshly signed token and the instant it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(config.secret.as_bytes(), config.token_expiry)
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issues a token for `user_id` valid from now for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] if signing fails.
    pub fn issue(&self, user_id: Uuid, role: &str) -> Result<IssuedToken, TokenError> {
        self.issue_at(user_id, role, Utc::now().timestamp())
    }

    /// Issues a token as if the current time were `now` (Unix seconds).
    pub fn issue_at(&self, user_id: Uuid, role: &str, now: i64) -> Result<IssuedToken, TokenError> {
        let exp = now + self.ttl_secs;
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            iat: now,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at: DateTime::<Utc>::from_timestamp(exp, 0).unwrap_or_default(),
        })
    }

    /// Verifies `token` against the current time.
    ///
    /// # Errors
    ///
    /// See the module docs for the order in which failures are reported.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verifies `token` as if the current time were `now` (Unix seconds).
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let mut unverified = Validation::new(Algorithm::HS256);
        unverified.insecure_disable_signature_validation();
        unverified.validate_exp = false;

        let claims = decode::<Claims>(token, &self.decoding, &unverified)
            .map_err(|_| TokenError::Malformed)?
            .claims;

        if now > claims.exp {
            return Err(TokenError::Expired);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                _ => TokenError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn get_test_codec() -> TokenCodec {
        TokenCodec::new(b"test-secret-key-at-least-32-characters-long", 3600)
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let codec = get_test_codec();
        let user_id = Uuid::new_v4();

        let issued = codec.issue_at(user_id, "admin", NOW).unwrap();
        let claims = codec.verify_at(&issued.token, NOW + 10).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.iat, NOW);
        assert_eq!(claims.exp, NOW + 3600);
        assert_eq!(issued.expires_at.timestamp(), NOW + 3600);
    }

    #[test]
    fn test_issue_uses_current_time() {
        let codec = get_test_codec();
        let user_id = Uuid::new_v4();

        let issued = codec.issue(user_id, "user").unwrap();
        let claims = codec.verify(&issued.token).unwrap();
        assert_eq!(claims.user_id(), Ok(user_id));
    }

    #[test]
    fn test_verify_at_exact_expiry_is_valid() {
        let codec = get_test_codec();
        let issued = codec.issue_at(Uuid::new_v4(), "admin", NOW).unwrap();
        assert!(codec.verify_at(&issued.token, NOW + 3600).is_ok());
    }

    #[test]
    fn test_verify_after_expiry() {
        let codec = get_test_codec();
        let issued = codec.issue_at(Uuid::new_v4(), "admin", NOW).unwrap();
        assert_eq!(
            codec.verify_at(&issued.token, NOW + 3601),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_expired_wins_over_bad_signature() {
        let codec = get_test_codec();
        let other = TokenCodec::new(b"different-secret-key-at-least-32-characters", 3600);
        let issued = other.issue_at(Uuid::new_v4(), "admin", NOW).unwrap();

        assert_eq!(
            codec.verify_at(&issued.token, NOW + 10),
            Err(TokenError::InvalidSignature)
        );
        assert_eq!(
            codec.verify_at(&issued.token, NOW + 7200),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_tampered_payload_is_invalid_signature() {
        let codec = get_test_codec();
        let admin = codec.issue_at(Uuid::new_v4(), "admin", NOW).unwrap();
        let user = codec.issue_at(Uuid::new_v4(), "user", NOW).unwrap();

        // Splice the user's payload under the admin's signature.
        let admin_parts: Vec<&str> = admin.token.split('.').collect();
        let user_parts: Vec<&str> = user.token.split('.').collect();
        let forged = format!("{}.{}.{}", admin_parts[0], user_parts[1], admin_parts[2]);

        assert_eq!(
            codec.verify_at(&forged, NOW + 1),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = get_test_codec();
        assert_eq!(codec.verify_at("invalid-token", NOW), Err(TokenError::Malformed));
        assert_eq!(codec.verify_at("", NOW), Err(TokenError::Malformed));
        assert_eq!(codec.verify_at("a.b.c", NOW), Err(TokenError::Malformed));
    }

    #[test]
    fn test_token_error_maps_to_status() {
        use simplewaf_core::errors::AppError;

        let err: AppError = TokenError::Expired.into();
        assert_eq!(err.status.as_u16(), 401);
        assert_eq!(err.public_message(), "token expired");

        let err: AppError = TokenError::Encoding("bad key".to_string()).into();
        assert_eq!(err.status.as_u16(), 500);
    }

    #[test]
    fn test_debug_hides_keys() {
        let debug = format!("{:?}", get_test_codec());
        assert!(debug.contains("ttl_secs"));
        assert!(!debug.contains("test-secret"));
    }
}
