//! JWT claim structure for access tokens.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::jwt::TokenError;

/// JWT claims for access tokens.
///
/// # Fields
///
/// - `sub`: User ID (subject)
/// - `role`: Role name at issuance time
/// - `iat`: Token issued-at timestamp
/// - `exp`: Token expiration timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    /// Role at issuance time. Informational only.
    pub role: String,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: i64,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Parses the subject as a user id.
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialization() {
        let claims = Claims {
            sub: "c0ffee00-0000-4000-8000-000000000001".to_string(),
            role: "auditor".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_086_400,
        };

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["sub"], "c0ffee00-0000-4000-8000-000000000001");
        assert_eq!(json["role"], "auditor");
        assert_eq!(json["exp"], 1_700_086_400);

        let back: Claims = serde_json::from_value(json).unwrap();
        assert_eq!(back, claims);
    }

    #[test]
    fn test_user_id_parses_uuid_subject() {
        let id = Uuid::new_v4();
        let claims = Claims {
            sub: id.to_string(),
            role: "admin".to_string(),
            iat: 0,
            exp: 1,
        };
        assert_eq!(claims.user_id(), Ok(id));
    }

    #[test]
    fn test_user_id_rejects_non_uuid_subject() {
        let claims = Claims {
            sub: "42".to_string(),
            role: "admin".to_string(),
            iat: 0,
            exp: 1,
        };
        assert_eq!(claims.user_id(), Err(TokenError::Malformed));
    }
}
