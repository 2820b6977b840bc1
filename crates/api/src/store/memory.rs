//! In-process document store.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use tokio::sync::RwLock;

use super::{DocumentStore, Filter, Sort, StoreError, StoreKind, parse_object_id};

#[derive(Default)]
struct Collection {
    docs: Vec<Document>,
    unique: HashSet<String>,
}

impl Collection {
    fn position(&self, id: ObjectId) -> Option<usize> {
        self.docs
            .iter()
            .position(|d| d.get_object_id("_id").ok() == Some(id))
    }

    /// Reject `candidate` if it repeats a unique field of another document.
    fn check_unique(&self, candidate: &Document, skip: Option<usize>) -> Result<(), StoreError> {
        for field in &self.unique {
            let Some(value) = candidate.get(field) else {
                continue;
            };
            let clash = self
                .docs
                .iter()
                .enumerate()
                .any(|(i, d)| Some(i) != skip && d.get(field) == Some(value));
            if clash {
                return Err(StoreError::Conflict(format!("duplicate {field}: {value}")));
            }
        }
        Ok(())
    }
}

/// Document store that keeps collections in memory.
///
/// Used when no `MONGODB_URI` is configured and by tests. Data is lost on
/// restart.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn created_at(doc: &Document) -> i64 {
    doc.get_datetime("createdAt")
        .map_or(i64::MIN, |dt| dt.timestamp_millis())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: Filter,
        sort: Sort,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let Some(coll) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut docs: Vec<Document> = coll
            .docs
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();

        if sort == Sort::NewestFirst {
            // Later inserts win ties at millisecond resolution
            docs.reverse();
            docs.sort_by_key(|d| std::cmp::Reverse(created_at(d)));
        }
        Ok(docs)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Filter,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|c| c.docs.iter().find(|d| filter.matches(d)).cloned()))
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let Some(id) = parse_object_id(id) else {
            return Ok(None);
        };
        self.find_one(collection, Filter::all().eq("_id", id)).await
    }

    async fn insert(&self, collection: &str, mut doc: Document) -> Result<ObjectId, StoreError> {
        let id = match doc.get("_id") {
            Some(Bson::ObjectId(id)) => *id,
            Some(other) => {
                return Err(StoreError::DataCorruption(format!(
                    "_id must be an ObjectId, got {other}"
                )));
            }
            None => {
                let id = ObjectId::new();
                doc.insert("_id", id);
                id
            }
        };

        let mut collections = self.collections.write().await;
        let coll = collections.entry(collection.to_owned()).or_default();
        if coll.position(id).is_some() {
            return Err(StoreError::Conflict(format!("duplicate _id: {id}")));
        }
        coll.check_unique(&doc, None)?;
        coll.docs.push(doc);
        Ok(id)
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        set: Document,
    ) -> Result<Option<Document>, StoreError> {
        let Some(id) = parse_object_id(id) else {
            return Ok(None);
        };

        let mut collections = self.collections.write().await;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(index) = coll.position(id) else {
            return Ok(None);
        };
        let Some(current) = coll.docs.get(index) else {
            return Ok(None);
        };

        let mut updated = current.clone();
        for (key, value) in set {
            if key != "_id" {
                updated.insert(key, value);
            }
        }
        coll.check_unique(&updated, Some(index))?;

        if let Some(slot) = coll.docs.get_mut(index) {
            *slot = updated.clone();
        }
        Ok(Some(updated))
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let Some(id) = parse_object_id(id) else {
            return Ok(false);
        };
        let mut collections = self.collections.write().await;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(false);
        };
        Ok(coll.position(id).map(|i| coll.docs.remove(i)).is_some())
    }

    async fn delete_many(&self, collection: &str, filter: Filter) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = coll.docs.len();
        coll.docs.retain(|d| !filter.matches(d));
        Ok(u64::try_from(before - coll.docs.len()).unwrap_or(u64::MAX))
    }

    async fn count(&self, collection: &str, filter: Filter) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        let count = collections
            .get(collection)
            .map_or(0, |c| c.docs.iter().filter(|d| filter.matches(d)).count());
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn ensure_unique_index(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_owned())
            .or_default()
            .unique
            .insert(field.to_owned());
        Ok(())
    }

    // No background reaper; expired sessions are purged on login.
    async fn ensure_ttl_index(&self, _collection: &str, _field: &str) -> Result<(), StoreError> {
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mongodb::bson::{DateTime, doc};

    use super::*;

    #[tokio::test]
    async fn test_insert_and_find_by_id() {
        let store = MemoryStore::new();
        let id = store.insert("products", doc! { "name": "Sneakers" }).await.unwrap();

        let found = store
            .find_by_id("products", &id.to_hex())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get_str("name").unwrap(), "Sneakers");

        assert!(store.find_by_id("products", "garbage").await.unwrap().is_none());
        assert!(
            store
                .find_by_id("products", &ObjectId::new().to_hex())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_newest_first() {
        let store = MemoryStore::new();
        for (name, millis) in [("old", 1_000), ("new", 3_000), ("mid", 2_000)] {
            store
                .insert(
                    "reviews",
                    doc! { "name": name, "createdAt": DateTime::from_millis(millis) },
                )
                .await
                .unwrap();
        }

        let docs = store
            .find("reviews", Filter::all(), Sort::NewestFirst)
            .await
            .unwrap();
        let names: Vec<_> = docs.iter().map(|d| d.get_str("name").unwrap()).collect();
        assert_eq!(names, ["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_ties_prefer_latest_insert() {
        let store = MemoryStore::new();
        let at = DateTime::from_millis(5_000);
        for name in ["first", "second"] {
            store
                .insert("orders", doc! { "name": name, "createdAt": at })
                .await
                .unwrap();
        }
        let docs = store
            .find("orders", Filter::all(), Sort::NewestFirst)
            .await
            .unwrap();
        assert_eq!(docs[0].get_str("name").unwrap(), "second");
    }

    #[tokio::test]
    async fn test_filter_and_count() {
        let store = MemoryStore::new();
        store.insert("products", doc! { "category": "Male" }).await.unwrap();
        store.insert("products", doc! { "category": "Female" }).await.unwrap();
        store.insert("products", doc! { "category": "Male" }).await.unwrap();

        let filter = Filter::all().eq("category", "Male");
        assert_eq!(store.count("products", filter.clone()).await.unwrap(), 2);
        assert_eq!(
            store.find("products", filter, Sort::Natural).await.unwrap().len(),
            2
        );
        assert_eq!(store.count("missing", Filter::all()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_sets_fields() {
        let store = MemoryStore::new();
        let id = store
            .insert("tickets", doc! { "status": "open", "priority": "medium" })
            .await
            .unwrap();

        let updated = store
            .update_by_id("tickets", &id.to_hex(), doc! { "status": "resolved" })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.get_str("status").unwrap(), "resolved");
        assert_eq!(updated.get_str("priority").unwrap(), "medium");
        assert_eq!(updated.get_object_id("_id").unwrap(), id);

        assert!(
            store
                .update_by_id("tickets", "bad", doc! { "status": "closed" })
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_unique_index_rejects_duplicates() {
        let store = MemoryStore::new();
        store.ensure_unique_index("users", "email").await.unwrap();
        store.insert("users", doc! { "email": "a@b.c" }).await.unwrap();
        let other = store.insert("users", doc! { "email": "x@y.z" }).await.unwrap();

        let err = store
            .insert("users", doc! { "email": "a@b.c" })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let err = store
            .update_by_id("users", &other.to_hex(), doc! { "email": "a@b.c" })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let id = store.insert("reviews", doc! { "rating": 5 }).await.unwrap();
        store.insert("reviews", doc! { "rating": 1 }).await.unwrap();

        assert!(store.delete_by_id("reviews", &id.to_hex()).await.unwrap());
        assert!(!store.delete_by_id("reviews", &id.to_hex()).await.unwrap());
        assert_eq!(
            store
                .delete_many("reviews", Filter::all().eq("rating", 1))
                .await
                .unwrap(),
            1
        );
        assert_eq!(store.count("reviews", Filter::all()).await.unwrap(), 0);
    }
}
