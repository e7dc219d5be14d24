//! API-local error type, translating store/lookup failures into HTTP
//! responses. Exactly the teacher's `thiserror`-per-crate idiom (B3):
//! this is the thin shell's own error enum, distinct from the
//! `ValidationError` data the validator returns for a *workflow's*
//! failures (those are reported as ordinary `200`/`422` JSON bodies, not
//! as `Err` here).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use agentforge_protocol::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("workflow {0} not found")]
    WorkflowNotFound(String),
    #[error("execution {0} not found")]
    ExecutionNotFound(String),
    #[error("version conflict: expected {expected}, got {actual}")]
    VersionConflict { expected: u64, actual: u64 },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::WorkflowNotFound(_) => (StatusCode::NOT_FOUND, "WORKFLOW_NOT_FOUND"),
            ApiError::ExecutionNotFound(_) => (StatusCode::NOT_FOUND, "EXECUTION_NOT_FOUND"),
            ApiError::VersionConflict { .. } => (StatusCode::CONFLICT, "VERSION_CONFLICT"),
        };
        let body: ApiResponse<()> = ApiResponse::error(code, &self.to_string());
        (status, Json(body)).into_response()
    }
}
