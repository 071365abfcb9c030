use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HealthAnalyticsError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Storage unavailable")]
    Unavailable,

    #[error("Internal error")]
    Internal,
}

impl HealthAnalyticsError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::Cancelled
    }

    pub fn unavailable() -> Self {
        Self::Unavailable
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}
