use thiserror::Error;
use uuid::Uuid;

use crate::lifecycle::TransitionRejected;

/// Failures raised by a `Store` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("could not decode stored row: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not access session file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed session file: {0}")]
    Format(#[from] serde_json::Error),
}

/// Errors surfaced by the platform operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required field is missing or malformed. Raised before any store call.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Transition(#[from] TransitionRejected),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

pub type AppResult<T> = Result<T, AppError>;
