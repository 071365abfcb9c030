use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::document::{Fields, Filter, StoredDocument};

/// Failures reported by a document store adapter.
///
/// "Not found" is not an error here: lookups return `None` and mutations
/// report whether a document matched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("document '{id}' already exists")]
    Duplicate { id: String },

    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    #[error("document '{id}' cannot be decoded: {message}")]
    Corrupt { id: String, message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn corrupt(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Corrupt {
            id: id.into(),
            message: message.into(),
        }
    }
}

/// Port for the domain layer: the persistence operations repositories need.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a fully-formed document. `Duplicate` if the id is taken.
    async fn insert(&self, collection: &str, doc: StoredDocument) -> Result<(), StoreError>;

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<StoredDocument>, StoreError>;

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Overwrite the listed fields and `updated_at`. Returns true if a document matched.
    async fn update_one(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Returns true if a document was deleted.
    async fn delete_one(&self, collection: &str, id: &str) -> Result<bool, StoreError>;
}
