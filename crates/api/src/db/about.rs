//! About page repository.
//!
//! The collection holds at most one document; the first one found is the
//! about page.

use mongodb::bson::{self, Document};

use anar_shop_core::AboutId;
use anar_shop_core::models::{About, AboutContent};

use super::{decode, encode, from_bson_datetime, now, to_bson_datetime};
use crate::store::{DocumentStore, Filter, StoreError, collections};

fn field_error(field: &str, err: &bson::document::ValueAccessError) -> StoreError {
    StoreError::DataCorruption(format!("about document {field}: {err}"))
}

// Content fields sit at the top level next to `_id` and the timestamps, so
// the content decodes from the whole document and ignores the rest.
fn to_about(doc: Document) -> Result<About, StoreError> {
    let id = doc
        .get_object_id("_id")
        .map_err(|e| field_error("_id", &e))?;
    let created_at = *doc
        .get_datetime("createdAt")
        .map_err(|e| field_error("createdAt", &e))?;
    let updated_at = doc.get_datetime("updatedAt").map_or(created_at, |at| *at);

    Ok(About {
        id: AboutId::new(id.to_hex()),
        content: decode::<AboutContent>(doc)?,
        created_at: from_bson_datetime(created_at)?,
        updated_at: from_bson_datetime(updated_at)?,
    })
}

/// Repository for the about page.
pub struct AboutRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> AboutRepository<'a> {
    /// Create a new about repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// The about document, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or the row is corrupt.
    pub async fn find(&self) -> Result<Option<About>, StoreError> {
        self.store
            .find_one(collections::ABOUT, Filter::all())
            .await?
            .map(to_about)
            .transpose()
    }

    /// The about document, created with default content if absent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query or insert fails.
    pub async fn get_or_create(&self) -> Result<About, StoreError> {
        match self.find().await? {
            Some(about) => Ok(about),
            None => self.create(AboutContent::default()).await,
        }
    }

    /// Store a new about document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the insert fails.
    pub async fn create(&self, content: AboutContent) -> Result<About, StoreError> {
        let at = to_bson_datetime(now());
        let mut doc = encode(&content)?;
        doc.insert("createdAt", at);
        doc.insert("updatedAt", at);
        let id = self.store.insert(collections::ABOUT, doc.clone()).await?;
        doc.insert("_id", id);
        to_about(doc)
    }

    /// Overwrite the content of an existing about document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DataCorruption` if the document disappeared.
    pub async fn replace_content(
        &self,
        id: &AboutId,
        content: &AboutContent,
    ) -> Result<About, StoreError> {
        let mut set = encode(content)?;
        set.insert("updatedAt", to_bson_datetime(now()));
        self.store
            .update_by_id(collections::ABOUT, id.as_str(), set)
            .await?
            .map(to_about)
            .transpose()?
            .ok_or_else(|| StoreError::DataCorruption(format!("about document {id} vanished")))
    }

    /// Apply `edit` to the about content, creating the document first when
    /// none exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read or write fails.
    pub async fn upsert_with<F>(&self, edit: F) -> Result<About, StoreError>
    where
        F: FnOnce(&mut AboutContent) + Send,
    {
        match self.find().await? {
            Some(about) => {
                let mut content = about.content;
                edit(&mut content);
                self.replace_content(&about.id, &content).await
            }
            None => {
                let mut content = AboutContent::default();
                edit(&mut content);
                self.create(content).await
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let store = MemoryStore::new();
        let repo = AboutRepository::new(&store);

        let first = repo.get_or_create().await.unwrap();
        let second = repo.get_or_create().await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.content, AboutContent::default());
        assert_eq!(store.count(collections::ABOUT, Filter::all()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates() {
        let store = MemoryStore::new();
        let repo = AboutRepository::new(&store);

        let created = repo
            .upsert_with(|c| c.contact_phone = "+976 7000 0000".into())
            .await
            .unwrap();
        assert_eq!(created.content.contact_phone, "+976 7000 0000");
        assert_eq!(created.content.hero_title, AboutContent::default().hero_title);

        let updated = repo
            .upsert_with(|c| c.hero_title = "About Anar".into())
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.content.hero_title, "About Anar");
        assert_eq!(updated.content.contact_phone, "+976 7000 0000");
    }

    #[tokio::test]
    async fn test_partial_legacy_document_reads_with_defaults() {
        let store = MemoryStore::new();
        let at = bson::DateTime::from_millis(1_700_000_000_000);
        store
            .insert(
                collections::ABOUT,
                bson::doc! { "heroTitle": "Hi", "createdAt": at, "updatedAt": at },
            )
            .await
            .unwrap();

        let about = AboutRepository::new(&store).find().await.unwrap().unwrap();
        assert_eq!(about.content.hero_title, "Hi");
        assert_eq!(about.content.values.len(), 3);
    }
}
