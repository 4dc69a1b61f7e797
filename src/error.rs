use thiserror::Error;

/// Everything the auth flow and the sync engine can surface to a caller.
///
/// Variants are cloneable and comparable so the engine can retain the most
/// recent failure for the view to render next to the triggering form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    #[error("missing required fields: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("malformed server response: {0}")]
    Protocol(String),

    #[error("{0}")]
    RemoteRejected(String),

    #[error("server reported success but the response is incomplete: {0}")]
    IncompleteResponse(String),

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("course id is required for this operation")]
    MissingId,

    #[error("stored session is incomplete or invalid")]
    SessionCorrupt,

    #[error("session storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Message suitable for the dismissible banner next to the form.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Connection(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            AppError::Protocol(_) => {
                "The server returned an unexpected response. Please try again later.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Transient failures are retryable by re-invoking the same operation;
    /// validation-class failures need corrected input instead.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Connection(_) | AppError::Protocol(_))
    }
}
