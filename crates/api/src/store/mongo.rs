//! `MongoDB`-backed document store.

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document, doc};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use secrecy::{ExposeSecret, SecretString};

use super::{DocumentStore, Filter, Sort, StoreError, StoreKind, parse_object_id};

const DUPLICATE_KEY: i32 = 11000;

/// Document store backed by a `MongoDB` deployment.
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connect and verify the server answers a ping.
    ///
    /// The database named in the URI is used; `default_database` applies when
    /// the URI names none.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the URI is invalid or the server is
    /// unreachable.
    pub async fn connect(uri: &SecretString, default_database: &str) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(uri.expose_secret()).await?;
        options.app_name = Some("anar-shop-api".to_owned());
        options.server_selection_timeout = Some(Duration::from_secs(10));

        let client = Client::with_options(options)?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(default_database));

        let store = Self { db };
        store.ping().await?;
        tracing::info!(database = %store.db.name(), "Connected to MongoDB");
        Ok(store)
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}

/// Map duplicate-key failures to `StoreError::Conflict`.
fn map_write_error(err: mongodb::error::Error) -> StoreError {
    let duplicate = match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    };
    if duplicate {
        StoreError::Conflict(err.to_string())
    } else {
        StoreError::Database(err)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(
        &self,
        collection: &str,
        filter: Filter,
        sort: Sort,
    ) -> Result<Vec<Document>, StoreError> {
        let coll = self.collection(collection);
        let mut find = coll.find(filter.to_document());
        if sort == Sort::NewestFirst {
            find = find.sort(doc! { "createdAt": -1 });
        }
        let cursor = find.await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Filter,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collection(collection)
            .find_one(filter.to_document())
            .await?)
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let Some(id) = parse_object_id(id) else {
            return Ok(None);
        };
        Ok(self
            .collection(collection)
            .find_one(doc! { "_id": id })
            .await?)
    }

    async fn insert(&self, collection: &str, doc: Document) -> Result<ObjectId, StoreError> {
        let result = self
            .collection(collection)
            .insert_one(doc)
            .await
            .map_err(map_write_error)?;
        match result.inserted_id {
            Bson::ObjectId(id) => Ok(id),
            other => Err(StoreError::DataCorruption(format!(
                "inserted _id is not an ObjectId: {other}"
            ))),
        }
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        set: Document,
    ) -> Result<Option<Document>, StoreError> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };
        // `$set` with no fields is rejected by the server
        if set.is_empty() {
            return self.find_by_id(collection, id).await;
        }
        self.collection(collection)
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_write_error)
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let Some(id) = parse_object_id(id) else {
            return Ok(false);
        };
        let result = self
            .collection(collection)
            .delete_one(doc! { "_id": id })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_many(&self, collection: &str, filter: Filter) -> Result<u64, StoreError> {
        let result = self
            .collection(collection)
            .delete_many(filter.to_document())
            .await?;
        Ok(result.deleted_count)
    }

    async fn count(&self, collection: &str, filter: Filter) -> Result<u64, StoreError> {
        Ok(self
            .collection(collection)
            .count_documents(filter.to_document())
            .await?)
    }

    async fn ensure_unique_index(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        let mut keys = Document::new();
        keys.insert(field, 1);
        let index = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection(collection).create_index(index).await?;
        tracing::debug!(collection, field, "Unique index ensured");
        Ok(())
    }

    async fn ensure_ttl_index(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        let mut keys = Document::new();
        keys.insert(field, 1);
        // zero means "expire at the time stored in the field"
        let index = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().expire_after(Duration::ZERO).build())
            .build();
        self.collection(collection).create_index(index).await?;
        tracing::debug!(collection, field, "TTL index ensured");
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Mongo
    }
}
