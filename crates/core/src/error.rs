use crate::status::NoticeStatus;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// The notice is not in a status from which `operation` may run.
    #[error("Cannot {operation} a notice in status '{status}'")]
    InvalidTransition {
        operation: &'static str,
        status: NoticeStatus,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// An antecedent history entry the operation depends on is missing.
    #[error("Missing prior state: {0}")]
    MissingPriorState(String),

    /// The stored notice changed between load and save.
    #[error("Notice {id} was modified concurrently; refresh and retry")]
    StaleState { id: DbId },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Stable machine-readable code for API responses and logs.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::NotFound { .. } => "NOT_FOUND",
            CoreError::InvalidTransition { .. } => "INVALID_TRANSITION",
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::MissingPriorState(_) => "MISSING_PRIOR_STATE",
            CoreError::StaleState { .. } => "STALE_STATE",
            CoreError::Unauthorized(_) => "UNAUTHORIZED",
            CoreError::Forbidden(_) => "FORBIDDEN",
            CoreError::Storage(_) => "STORAGE_ERROR",
            CoreError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
