use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            // Validation failures are surfaced verbatim: they name the missing
            // input and the caller can act on them.
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Llm(e) => return llm_error_response(e),
            AppError::Export(msg) => {
                tracing::error!("Export error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPORT_ERROR",
                    "Failed to generate the report file".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        error_body(status, code, message)
    }
}

/// Maps gateway failures onto user-facing responses.
/// The full upstream body and raw reply text land in the log only; the user
/// sees a generic message (plus the decode detail for parse failures, which
/// the caller needs to report the problem meaningfully).
fn llm_error_response(e: &LlmError) -> Response {
    match e {
        LlmError::Upstream { status, body } => {
            tracing::error!("Error from OpenAI API (status {status}): {body}");
            error_body(
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                "Failed to retrieve a response from the AI service".to_string(),
            )
        }
        LlmError::Parse { message, raw } => {
            tracing::error!("Error processing AI response: {message}");
            tracing::info!("Full response text: {raw}");
            error_body(
                StatusCode::BAD_GATEWAY,
                "PARSE_ERROR",
                format!("Error processing AI response: {message}"),
            )
        }
        LlmError::Http(err) => {
            tracing::error!("HTTP error calling OpenAI API: {err}");
            error_body(
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                "Failed to retrieve a response from the AI service".to_string(),
            )
        }
        LlmError::EmptyContent => {
            tracing::error!("OpenAI API returned a completion with no content");
            error_body(
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                "The AI service returned an empty response".to_string(),
            )
        }
    }
}

fn error_body(status: StatusCode, code: &str, message: String) -> Response {
    let body = Json(json!({
        "error": {
            "code": code,
            "message": message
        }
    }));
    (status, body).into_response()
}
