use thiserror::Error;

use crate::contract::EntityKind;
use crate::domain::repo::StoreError;

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Invalid identity '{id}': expected a 24 character hex object id")]
    InvalidIdentity { id: String },

    #[error("Invalid date range: {message}")]
    InvalidDateRange { message: String },

    #[error("{kind} with id '{id}' already exists")]
    AlreadyExists { kind: EntityKind, id: String },

    #[error("Document store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Stored {kind} document '{id}' is malformed: {message}")]
    CorruptDocument {
        kind: EntityKind,
        id: String,
        message: String,
    },

    #[error("Failed to encode {field}: {message}")]
    Encode { field: String, message: String },

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn invalid_identity(id: impl Into<String>) -> Self {
        Self::InvalidIdentity { id: id.into() }
    }

    pub fn invalid_date_range(message: impl Into<String>) -> Self {
        Self::InvalidDateRange {
            message: message.into(),
        }
    }

    pub fn already_exists(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            id: id.into(),
        }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    pub fn corrupt_document(
        kind: EntityKind,
        id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::CorruptDocument {
            kind,
            id: id.into(),
            message: message.into(),
        }
    }

    pub fn encode(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encode {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::Cancelled
    }

    /// Translate a store port failure for an operation on `kind`.
    pub fn from_store(kind: EntityKind, err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { id } => Self::already_exists(kind, id),
            StoreError::Unavailable { message } => Self::store_unavailable(message),
            StoreError::Corrupt { id, message } => Self::corrupt_document(kind, id, message),
        }
    }
}
