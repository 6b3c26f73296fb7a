//! Application error types shared by the store, the backend, and front ends.
use crate::validation::ValidationErrors;
use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// No usable credential: the session was never initialized, was torn down,
    /// or the token expired.
    #[error("Authentication required: {0}")]
    Auth(String),

    /// A draft failed local validation; nothing was sent to the server.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Transport failure or a non-success response from the remote API.
    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse error classification used to pick a user-facing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    Validation,
    Remote,
    Local,
}

impl AppError {
    /// Classify this error.
    ///
    /// # Returns
    /// The [`ErrorKind`] used by front ends to decide between a re-login
    /// prompt, inline field errors, or a status notification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Auth(_) => ErrorKind::Auth,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Remote(_) => ErrorKind::Remote,
            AppError::Storage(_) | AppError::Serialization(_) | AppError::Io(_) => {
                ErrorKind::Local
            }
        }
    }
}
