use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scn_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and request validation failures.
/// Implements [`IntoResponse`] to produce consistent `{ "error", "code" }`
/// JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Request body failed declarative validation.
    #[error("Validation failed: {0}")]
    InvalidInput(#[from] validator::ValidationErrors),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

fn internal(msg: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %msg, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => {
                let code = core.code();
                match core {
                    CoreError::NotFound { entity, id } => (
                        StatusCode::NOT_FOUND,
                        code,
                        format!("{entity} with id {id} not found"),
                    ),
                    CoreError::InvalidTransition { .. } | CoreError::StaleState { .. } => {
                        (StatusCode::CONFLICT, code, core.to_string())
                    }
                    CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, code, msg.clone()),
                    CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, code, msg.clone()),
                    CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, code, msg.clone()),
                    CoreError::MissingPriorState(msg) => {
                        tracing::error!(error = %msg, "Notice history is inconsistent");
                        (StatusCode::INTERNAL_SERVER_ERROR, code, msg.clone())
                    }
                    CoreError::Storage(msg) => {
                        tracing::error!(error = %msg, "Storage error");
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            code,
                            "A storage error occurred".to_string(),
                        )
                    }
                    CoreError::Internal(msg) => internal(msg),
                }
            }

            AppError::InvalidInput(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                errors.to_string(),
            ),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
