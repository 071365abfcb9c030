use std::marker::PhantomData;
use std::sync::Arc;

use bson::oid::ObjectId;
use tracing::{debug, info, instrument};

use crate::contract::CallContext;
use crate::domain::clock::Clock;
use crate::domain::document::{Filter, StoredDocument};
use crate::domain::entity::Entity;
use crate::domain::error::DomainError;
use crate::domain::repo::DocumentStore;
use crate::domain::within;

/// Canonical (lowercase hex) form of a well-formed object id.
pub fn canonical_identity(id: &str) -> Option<String> {
    ObjectId::parse_str(id).ok().map(|oid| oid.to_hex())
}

/// Fresh identity in the store's native object id format.
pub fn generate_identity() -> String {
    ObjectId::new().to_hex()
}

/// CRUD over one collection, generic over the record kind.
///
/// Holds no state of its own; every call goes to the store.
pub struct Repository<E: Entity> {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    _kind: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            clock: self.clock.clone(),
            _kind: PhantomData,
        }
    }
}

impl<E: Entity> Repository<E> {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            _kind: PhantomData,
        }
    }

    fn collection(&self) -> &'static str {
        E::KIND.collection()
    }

    #[instrument(
        name = "health_analytics.repository.create",
        skip(self, ctx, record),
        fields(kind = %E::KIND, user_id = %record.user_id())
    )]
    pub async fn create(&self, ctx: &CallContext, record: E) -> Result<String, DomainError> {
        let id = if record.id().is_empty() {
            generate_identity()
        } else {
            canonical_identity(record.id())
                .ok_or_else(|| DomainError::invalid_identity(record.id()))?
        };

        let now = self.clock.now();
        let doc = StoredDocument {
            id: id.clone(),
            fields: record.to_fields()?,
            created_at: now,
            updated_at: now,
        };

        within(ctx, self.store.insert(self.collection(), doc))
            .await?
            .map_err(|e| DomainError::from_store(E::KIND, e))?;

        info!(id = %id, "Created {}", E::KIND);
        Ok(id)
    }

    #[instrument(
        name = "health_analytics.repository.get",
        skip(self, ctx),
        fields(kind = %E::KIND)
    )]
    pub async fn get(&self, ctx: &CallContext, id: &str) -> Result<E, DomainError> {
        let Some(key) = canonical_identity(id) else {
            debug!("Malformed id treated as not found");
            return Err(DomainError::not_found(E::KIND, id));
        };

        let doc = within(ctx, self.store.find_by_id(self.collection(), &key))
            .await?
            .map_err(|e| DomainError::from_store(E::KIND, e))?
            .ok_or_else(|| DomainError::not_found(E::KIND, id))?;

        E::from_stored(doc)
    }

    /// Field-level merge: only non-empty fields of `record` overwrite stored values.
    #[instrument(
        name = "health_analytics.repository.update",
        skip(self, ctx, record),
        fields(kind = %E::KIND, id = %record.id())
    )]
    pub async fn update(&self, ctx: &CallContext, record: E) -> Result<(), DomainError> {
        let key = canonical_identity(record.id())
            .ok_or_else(|| DomainError::invalid_identity(record.id()))?;
        let patch = record.patch_fields()?;
        debug!(fields = patch.len(), "Applying merge patch");

        let matched = within(
            ctx,
            self.store
                .update_one(self.collection(), &key, patch, self.clock.now()),
        )
        .await?
        .map_err(|e| DomainError::from_store(E::KIND, e))?;

        if !matched {
            return Err(DomainError::not_found(E::KIND, record.id()));
        }
        info!("Updated {}", E::KIND);
        Ok(())
    }

    #[instrument(
        name = "health_analytics.repository.delete",
        skip(self, ctx),
        fields(kind = %E::KIND)
    )]
    pub async fn delete(&self, ctx: &CallContext, id: &str) -> Result<(), DomainError> {
        let Some(key) = canonical_identity(id) else {
            return Err(DomainError::not_found(E::KIND, id));
        };

        let deleted = within(ctx, self.store.delete_one(self.collection(), &key))
            .await?
            .map_err(|e| DomainError::from_store(E::KIND, e))?;

        if !deleted {
            return Err(DomainError::not_found(E::KIND, id));
        }
        info!("Deleted {}", E::KIND);
        Ok(())
    }

    #[instrument(
        name = "health_analytics.repository.list",
        skip(self, ctx, filter),
        fields(kind = %E::KIND)
    )]
    pub async fn list(&self, ctx: &CallContext, filter: &E::Filter) -> Result<Vec<E>, DomainError> {
        self.find(ctx, &E::filter(filter)).await
    }

    /// Run an arbitrary store filter and map every hit back to `E`.
    pub(crate) async fn find(&self, ctx: &CallContext, filter: &Filter) -> Result<Vec<E>, DomainError> {
        let docs = within(ctx, self.store.find(self.collection(), filter))
            .await?
            .map_err(|e| DomainError::from_store(E::KIND, e))?;

        let records = docs
            .into_iter()
            .map(E::from_stored)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = records.len(), "Listed {}", E::KIND);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_must_be_object_id_hex() {
        assert!(canonical_identity("65a0f0f0f0f0f0f0f0f0f0f0").is_some());
        assert!(canonical_identity("not-an-id").is_none());
        assert!(canonical_identity("65a0f0f0f0f0f0f0f0f0f0f").is_none());
        assert!(canonical_identity("").is_none());
    }

    #[test]
    fn uppercase_hex_is_canonicalized() {
        assert_eq!(
            canonical_identity("65A0F0F0F0F0F0F0F0F0F0F0").as_deref(),
            Some("65a0f0f0f0f0f0f0f0f0f0f0")
        );
    }

    #[test]
    fn generated_identities_are_valid_and_unique() {
        let a = generate_identity();
        let b = generate_identity();
        assert_ne!(a, b);
        assert_eq!(canonical_identity(&a), Some(a.clone()));
    }
}
