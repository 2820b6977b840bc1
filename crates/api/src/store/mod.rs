//! Document store abstraction.
//!
//! Every collection is a bag of BSON documents keyed by an `ObjectId` under
//! `_id`. Handlers only ever need equality filters and "newest first"
//! ordering, so that is all the trait exposes. [`MongoStore`] talks to a real
//! server; [`MemoryStore`] keeps everything in process for local runs and
//! tests.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document, doc};
use thiserror::Error;

/// Collection names.
pub mod collections {
    pub const ABOUT: &str = "abouts";
    pub const CATEGORIES: &str = "categories";
    pub const ORDERS: &str = "orders";
    pub const PRODUCTS: &str = "products";
    pub const REVIEWS: &str = "reviews";
    pub const SESSIONS: &str = "sessions";
    pub const TICKETS: &str = "tickets";
    pub const USERS: &str = "users";
}

/// Fields that must be unique within their collection.
pub const UNIQUE_INDEXES: &[(&str, &str)] = &[
    (collections::CATEGORIES, "name"),
    (collections::CATEGORIES, "slug"),
    (collections::USERS, "email"),
    (collections::ORDERS, "orderNumber"),
    (collections::SESSIONS, "tokenHash"),
];

/// Date fields whose documents expire once the stored time has passed.
pub const TTL_INDEXES: &[(&str, &str)] = &[(collections::SESSIONS, "expiresAt")];

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Driver or server error.
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// A stored document could not be decoded.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Unique constraint violation.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl From<mongodb::bson::de::Error> for StoreError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        Self::DataCorruption(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        Self::DataCorruption(format!("cannot encode document: {err}"))
    }
}

/// A single filter condition.
#[derive(Debug, Clone, PartialEq)]
enum Clause {
    Eq(Bson),
    Lt(Bson),
}

/// A conjunction of field conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Clause)>,
}

impl Filter {
    /// Matches every document.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a `field == value` clause.
    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.clauses.push((field.into(), Clause::Eq(value.into())));
        self
    }

    /// Add a `field < value` clause.
    ///
    /// Only values of the same BSON type compare; a missing field or a type
    /// mismatch never matches.
    #[must_use]
    pub fn lt(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.clauses.push((field.into(), Clause::Lt(value.into())));
        self
    }

    /// Whether `doc` satisfies every clause.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses.iter().all(|(field, clause)| match clause {
            Clause::Eq(value) => doc.get(field) == Some(value),
            Clause::Lt(bound) => doc
                .get(field)
                .is_some_and(|value| bson_less_than(value, bound)),
        })
    }

    /// Render as a `MongoDB` query document.
    #[must_use]
    pub fn to_document(&self) -> Document {
        self.clauses
            .iter()
            .map(|(field, clause)| {
                let value = match clause {
                    Clause::Eq(value) => value.clone(),
                    Clause::Lt(bound) => Bson::Document(doc! { "$lt": bound.clone() }),
                };
                (field.clone(), value)
            })
            .collect()
    }
}

fn bson_less_than(value: &Bson, bound: &Bson) -> bool {
    match (value, bound) {
        (Bson::DateTime(a), Bson::DateTime(b)) => a < b,
        (Bson::Int32(a), Bson::Int32(b)) => a < b,
        (Bson::Int64(a), Bson::Int64(b)) => a < b,
        (Bson::Double(a), Bson::Double(b)) => a < b,
        (Bson::String(a), Bson::String(b)) => a < b,
        _ => false,
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sort {
    /// Store order.
    #[default]
    Natural,
    /// `createdAt` descending.
    NewestFirst,
}

/// Which backend is serving requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Mongo,
    Memory,
}

/// Parse a hex object id. Malformed ids cannot name a document.
#[must_use]
pub fn parse_object_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}

/// Async access to document collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents matching `filter`.
    async fn find(
        &self,
        collection: &str,
        filter: Filter,
        sort: Sort,
    ) -> Result<Vec<Document>, StoreError>;

    /// The first document matching `filter`.
    async fn find_one(&self, collection: &str, filter: Filter)
    -> Result<Option<Document>, StoreError>;

    /// Look up a document by its hex id.
    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Insert a document, assigning an `_id` if it has none.
    async fn insert(&self, collection: &str, doc: Document) -> Result<ObjectId, StoreError>;

    /// Apply `$set` with the fields of `set` and return the updated document.
    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        set: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Delete a document by id. Returns whether one was removed.
    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// Delete every document matching `filter`. Returns how many were removed.
    async fn delete_many(&self, collection: &str, filter: Filter) -> Result<u64, StoreError>;

    /// Count documents matching `filter`.
    async fn count(&self, collection: &str, filter: Filter) -> Result<u64, StoreError>;

    /// Declare that `field` must be unique within `collection`.
    async fn ensure_unique_index(&self, collection: &str, field: &str) -> Result<(), StoreError>;

    /// Declare that documents in `collection` expire at the time held in
    /// `field`. Backends without a background reaper may ignore this.
    async fn ensure_ttl_index(&self, collection: &str, field: &str) -> Result<(), StoreError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Which backend this is.
    fn kind(&self) -> StoreKind;
}

/// Create every unique and TTL index the API relies on.
///
/// # Errors
///
/// Returns the first index creation failure.
pub async fn ensure_indexes(store: &dyn DocumentStore) -> Result<(), StoreError> {
    for (collection, field) in UNIQUE_INDEXES {
        store.ensure_unique_index(collection, field).await?;
    }
    for (collection, field) in TTL_INDEXES {
        store.ensure_ttl_index(collection, field).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use mongodb::bson::DateTime;

    use super::*;

    #[test]
    fn test_filter_matches_all_clauses() {
        let filter = Filter::all().eq("category", "Male").eq("isActive", true);
        assert!(filter.matches(&doc! { "category": "Male", "isActive": true, "name": "x" }));
        assert!(!filter.matches(&doc! { "category": "Male", "isActive": false }));
        assert!(!filter.matches(&doc! { "category": "Male" }));
        assert!(Filter::all().matches(&doc! {}));
    }

    #[test]
    fn test_filter_to_document() {
        let filter = Filter::all().eq("userId", "u1");
        assert_eq!(filter.to_document(), doc! { "userId": "u1" });
    }

    #[test]
    fn test_filter_less_than() {
        let cutoff = DateTime::from_millis(2_000);
        let filter = Filter::all().lt("expiresAt", cutoff);
        assert!(filter.matches(&doc! { "expiresAt": DateTime::from_millis(1_999) }));
        assert!(!filter.matches(&doc! { "expiresAt": DateTime::from_millis(2_000) }));
        assert!(!filter.matches(&doc! { "expiresAt": "1970-01-01" }));
        assert!(!filter.matches(&doc! {}));
        assert_eq!(
            filter.to_document(),
            doc! { "expiresAt": { "$lt": cutoff } }
        );
    }

    #[test]
    fn test_parse_object_id() {
        assert!(parse_object_id("65f1c0ffee0000000000abcd").is_some());
        assert!(parse_object_id("not-an-id").is_none());
        assert!(parse_object_id("").is_none());
    }
}
