use async_trait::async_trait;
use bson::{doc, Document};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    error::{Error as MongoError, ErrorKind, WriteFailure},
    Client, Collection, Database, IndexModel,
};
use tracing::{debug, info};

use crate::contract::EntityKind;
use crate::domain::document::{Fields, Filter, StoredDocument};
use crate::domain::repo::{DocumentStore, StoreError};
use crate::infra::storage::mapper;

const DUPLICATE_KEY: i32 = 11000;

/// MongoDB-backed document store. One collection per record kind.
#[derive(Clone)]
pub struct MongoDocumentStore {
    db: Database,
}

impl MongoDocumentStore {
    /// Connect, verify the server answers `ping`, and ensure the summary index exists.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        info!("Connecting to MongoDB database '{}'", database);

        // Fail fast instead of hanging on an unreachable server
        let uri = if uri.contains('?') {
            format!("{uri}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000")
        } else {
            format!("{uri}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000")
        };

        let client = Client::with_uri_str(&uri)
            .await
            .map_err(|e| StoreError::unavailable(format!("failed to connect: {e}")))?;

        let db = client.database(database);
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::unavailable(format!("ping failed: {e}")))?;

        let store = Self::new(db);
        store.ensure_indexes().await?;
        info!("Connected to MongoDB database '{}'", database);
        Ok(store)
    }

    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection::<Document>(name)
    }

    /// `(user_id, created_at)` backs the summary window queries.
    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        for kind in EntityKind::ALL {
            let index = IndexModel::builder()
                .keys(doc! { "user_id": 1, "created_at": 1 })
                .build();
            self.collection(kind.collection())
                .create_index(index)
                .await
                .map_err(unavailable)?;
        }
        Ok(())
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY
    )
}

fn unavailable(err: MongoError) -> StoreError {
    StoreError::unavailable(err.to_string())
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn insert(&self, collection: &str, doc: StoredDocument) -> Result<(), StoreError> {
        let raw = mapper::to_bson(&doc)?;
        match self.collection(collection).insert_one(raw).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::Duplicate { id: doc.id }),
            Err(e) => Err(unavailable(e)),
        }
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let oid = mapper::object_id(id)?;
        self.collection(collection)
            .find_one(doc! { "_id": oid })
            .await
            .map_err(unavailable)?
            .map(mapper::from_bson)
            .transpose()
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let query = mapper::filter_to_bson(filter);
        debug!(collection, query = %query, "find");
        let raw: Vec<Document> = self
            .collection(collection)
            .find(query)
            .await
            .map_err(unavailable)?
            .try_collect()
            .await
            .map_err(unavailable)?;
        raw.into_iter().map(mapper::from_bson).collect()
    }

    async fn update_one(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let oid = mapper::object_id(id)?;
        let result = self
            .collection(collection)
            .update_one(doc! { "_id": oid }, mapper::patch_to_bson(&patch, updated_at))
            .await
            .map_err(unavailable)?;
        Ok(result.matched_count > 0)
    }

    async fn delete_one(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let oid = mapper::object_id(id)?;
        let result = self
            .collection(collection)
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(unavailable)?;
        Ok(result.deleted_count > 0)
    }
}
