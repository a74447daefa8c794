use thiserror::Error;

use crate::types::DraftStatus;

#[derive(Error, Debug)]
pub enum PressroomError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Duplicate input: {0}")]
    DuplicateInput(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cannot {action} a {status} draft")]
    IneligibleTransition { status: DraftStatus, action: String },

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PressroomError>;
