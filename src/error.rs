use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Error type returned by every handler and by the credential guard.
///
/// Each variant maps to one machine-readable `kind` in the JSON body.
/// Provider, parse and internal details are logged but never sent to the
/// client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("rate limited, retry after {retry_after}s")]
    Throttled { retry_after: u64 },

    #[error("model reply could not be parsed: {0}")]
    Parse(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

const ANALYSIS_FAILED: &str = "The analysis failed. Please try again later.";

impl AppError {
    pub fn missing_credential() -> Self {
        AppError::Auth("No API key found. Add ?token=<your OpenAI key> to the URL.".into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Auth(_) => "auth",
            AppError::Throttled { .. } => "throttled",
            AppError::Parse(_) => "parse",
            AppError::Provider(_) => "provider",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Throttled { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Parse(_) | AppError::Provider(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        let body = match &self {
            AppError::Validation(msg) => json!({
                "kind": kind,
                "error": "Invalid request",
                "message": msg,
            }),
            AppError::Auth(msg) => json!({
                "kind": kind,
                "error": "Missing or invalid API key",
                "message": msg,
            }),
            AppError::Throttled { retry_after } => json!({
                "kind": kind,
                "error": "Rate limit reached",
                "message": format!(
                    "Please wait {retry_after} more seconds before the next analysis."
                ),
                "retry_after": retry_after,
            }),
            AppError::Parse(detail) => {
                tracing::error!(error = %detail, "model reply not parsable");
                json!({
                    "kind": kind,
                    "error": "Could not read the AI response",
                    "message": ANALYSIS_FAILED,
                })
            }
            AppError::Provider(detail) => {
                tracing::error!(error = %detail, "provider call failed");
                json!({
                    "kind": kind,
                    "error": "Analysis failed",
                    "message": ANALYSIS_FAILED,
                })
            }
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error");
                json!({
                    "kind": kind,
                    "error": "Internal error",
                    "message": ANALYSIS_FAILED,
                })
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
