//! The JSON envelope wrapped around every response body.
//!
//! ```json
//! {
//!   "success": true,
//!   "code": 200,
//!   "message": "ok",
//!   "data": { ... },
//!   "requestId": "6f1c...",
//!   "timestamp": "2024-05-01T10:00:00Z"
//! }
//! ```
//!
//! Failures carry `success: false` and an `error` class label instead of
//! `data`. The request id is read from a task-local set by the request id
//! middleware, so errors raised deep inside a gate or service still report
//! the id of the request they belong to.

use std::future::Future;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Runs `fut` with `request_id` visible to [`current_request_id`].
pub async fn scope_request_id<F>(request_id: String, fut: F) -> F::Output
where
    F: Future,
{
    REQUEST_ID.scope(request_id, fut).await
}

/// Returns the id of the request being served, if any.
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub request_id: String,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    fn build(
        status: StatusCode,
        message: String,
        data: Option<T>,
        error: Option<String>,
    ) -> Self {
        Self {
            success: error.is_none(),
            code: status.as_u16(),
            message,
            data,
            error,
            request_id: current_request_id().unwrap_or_default(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// 200 with `data`.
    pub fn ok(data: T) -> Self {
        Self::build(StatusCode::OK, "ok".to_string(), Some(data), None)
    }

    /// 201 with `data`.
    pub fn created(data: T) -> Self {
        Self::build(StatusCode::CREATED, "created".to_string(), Some(data), None)
    }

    pub fn with_status(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self::build(status, message.into(), Some(data), None)
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl ApiResponse<()> {
    /// Success without a payload, e.g. after a delete.
    pub fn message(message: impl Into<String>) -> Self {
        Self::build(StatusCode::OK, message.into(), None, None)
    }

    pub fn failure(status: StatusCode, message: impl Into<String>, kind: &str) -> Self {
        Self::build(status, message.into(), None, Some(kind.to_string()))
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}
