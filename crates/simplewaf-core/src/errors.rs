use anyhow::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::response::ApiResponse;

/// The single error type returned by handlers, gates and services.
///
/// The status code decides the error class shown to clients. Anything in the
/// 5xx range is logged with full detail and rendered with a generic message.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    /// Shorthand for errors that only carry a message.
    pub fn msg(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, anyhow::anyhow!(message.into()))
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::msg(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::msg(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::msg(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::msg(StatusCode::CONFLICT, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::msg(StatusCode::BAD_REQUEST, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::msg(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    /// Machine-readable class label carried in the envelope's `error` field.
    pub fn kind(&self) -> &'static str {
        match self.status {
            StatusCode::UNAUTHORIZED => "UNAUTHENTICATED",
            StatusCode::FORBIDDEN => "FORBIDDEN",
            StatusCode::NOT_FOUND => "NOT_FOUND",
            StatusCode::CONFLICT => "CONFLICT",
            StatusCode::BAD_REQUEST => "BAD_REQUEST",
            StatusCode::UNPROCESSABLE_ENTITY => "VALIDATION_FAILED",
            s if s.is_server_error() => "INTERNAL",
            _ => "ERROR",
        }
    }

    /// The message a client is allowed to see.
    pub fn public_message(&self) -> String {
        if self.status.is_server_error() {
            "internal server error".to_string()
        } else {
            self.error.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status.as_u16(), error = ?self.error, "request failed");
        }

        ApiResponse::<()>::failure(self.status, self.public_message(), self.kind()).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::internal(err)
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(AppError::unauthorized("x").kind(), "UNAUTHENTICATED");
        assert_eq!(AppError::forbidden("x").kind(), "FORBIDDEN");
        assert_eq!(AppError::not_found("x").kind(), "NOT_FOUND");
        assert_eq!(AppError::conflict("x").kind(), "CONFLICT");
        assert_eq!(AppError::bad_request("x").kind(), "BAD_REQUEST");
        assert_eq!(AppError::unprocessable("x").kind(), "VALIDATION_FAILED");
        assert_eq!(AppError::internal(anyhow::anyhow!("boom")).kind(), "INTERNAL");
    }

    #[test]
    fn test_internal_message_is_hidden() {
        let err = AppError::internal(anyhow::anyhow!("connection refused on 10.0.0.3"));
        assert_eq!(err.public_message(), "internal server error");
    }

    #[test]
    fn test_client_message_is_kept() {
        let err = AppError::forbidden("password reset required");
        assert_eq!(err.public_message(), "password reset required");
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::not_found("site not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
