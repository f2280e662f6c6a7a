//! Login and password reset DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::users::UserResponse;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "oldPassword is required"))]
    pub old_password: String,
    #[validate(length(min = 6, message = "newPassword must be at least 6 characters"))]
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_request_fields_are_camel_case() {
        let req: ResetPasswordRequest =
            serde_json::from_str(r#"{"oldPassword": "admin123", "newPassword": "n3w-pass"}"#)
                .unwrap();
        assert_eq!(req.old_password, "admin123");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_reset_request_rejects_short_password() {
        let req = ResetPasswordRequest {
            old_password: "admin123".to_string(),
            new_password: "123".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
