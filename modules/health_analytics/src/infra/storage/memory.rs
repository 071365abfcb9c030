use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::domain::document::{Fields, Filter, StoredDocument};
use crate::domain::repo::{DocumentStore, StoreError};

type Collection = BTreeMap<String, StoredDocument>;

/// Process-local document store for `--mock` runs and tests.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
    offline: AtomicBool,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of documents in `collection`.
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("in-memory store is offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: &str, doc: StoredDocument) -> Result<(), StoreError> {
        self.check_online()?;
        let mut guard = self.collections.write();
        let coll = guard.entry(collection.to_string()).or_default();
        if coll.contains_key(&doc.id) {
            return Err(StoreError::Duplicate { id: doc.id });
        }
        coll.insert(doc.id.clone(), doc);
        Ok(())
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        self.check_online()?;
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|c| c.get(id))
            .cloned())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.check_online()?;
        Ok(self
            .collections
            .read()
            .get(collection)
            .map(|c| c.values().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn update_one(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.check_online()?;
        let mut guard = self.collections.write();
        let Some(doc) = guard.get_mut(collection).and_then(|c| c.get_mut(id)) else {
            return Ok(false);
        };
        doc.fields.extend(patch);
        doc.updated_at = updated_at;
        Ok(true)
    }

    async fn delete_one(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        self.check_online()?;
        Ok(self
            .collections
            .write()
            .get_mut(collection)
            .is_some_and(|c| c.remove(id).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::FieldValue;

    fn doc(id: &str, user: &str) -> StoredDocument {
        let now = Utc::now();
        let mut fields = Fields::new();
        fields.insert("user_id".into(), user.into());
        StoredDocument {
            id: id.into(),
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = InMemoryDocumentStore::new();
        store.insert("c", doc("a", "u1")).await.unwrap();
        let err = store.insert("c", doc("a", "u2")).await.unwrap_err();
        assert_eq!(err, StoreError::Duplicate { id: "a".into() });
        let kept = store.find_by_id("c", "a").await.unwrap().unwrap();
        assert_eq!(kept.fields["user_id"], FieldValue::Text("u1".into()));
    }

    #[tokio::test]
    async fn update_merges_and_reports_match() {
        let store = InMemoryDocumentStore::new();
        store.insert("c", doc("a", "u1")).await.unwrap();

        let mut patch = Fields::new();
        patch.insert("note".into(), "x".into());
        let later = Utc::now() + chrono::Duration::seconds(5);
        assert!(store.update_one("c", "a", patch.clone(), later).await.unwrap());
        assert!(!store.update_one("c", "missing", patch, later).await.unwrap());

        let d = store.find_by_id("c", "a").await.unwrap().unwrap();
        assert_eq!(d.fields.len(), 2);
        assert_eq!(d.updated_at, later);
        assert!(d.created_at < later);
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = InMemoryDocumentStore::new();
        store.set_offline(true);
        assert!(matches!(
            store.find("c", &Filter::new()).await,
            Err(StoreError::Unavailable { .. })
        ));
        store.set_offline(false);
        assert!(store.find("c", &Filter::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_whether_removed() {
        let store = InMemoryDocumentStore::new();
        store.insert("c", doc("a", "u1")).await.unwrap();
        assert!(store.delete_one("c", "a").await.unwrap());
        assert!(!store.delete_one("c", "a").await.unwrap());
        assert_eq!(store.count("c"), 0);
    }
}
