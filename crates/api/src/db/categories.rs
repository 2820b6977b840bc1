//! Category repository.

use mongodb::bson::{self, Document, oid::ObjectId};
use serde::{Deserialize, Serialize};

use anar_shop_core::CategoryId;
use anar_shop_core::models::{Category, CategoryPatch, NewCategory};
use anar_shop_core::models::category::{DEFAULT_COLOR_GRADIENT, DEFAULT_ICON};

use super::{decode, encode, from_bson_datetime, now, row_id, to_bson_datetime};
use crate::store::{DocumentStore, Filter, Sort, StoreError, collections};

fn default_color_gradient() -> String {
    DEFAULT_COLOR_GRADIENT.to_owned()
}

fn default_icon() -> String {
    DEFAULT_ICON.to_owned()
}

const fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    slug: String,
    description: String,
    #[serde(default = "default_color_gradient")]
    color_gradient: String,
    #[serde(default = "default_icon")]
    icon: String,
    #[serde(default = "default_active")]
    is_active: bool,
    created_at: bson::DateTime,
    // Older rows were written without it
    #[serde(default)]
    updated_at: Option<bson::DateTime>,
}

impl TryFrom<CategoryDocument> for Category {
    type Error = StoreError;

    fn try_from(row: CategoryDocument) -> Result<Self, Self::Error> {
        let created_at = from_bson_datetime(row.created_at)?;
        Ok(Self {
            id: CategoryId::new(row_id(row.id)?),
            name: row.name,
            slug: row.slug,
            description: row.description,
            color_gradient: row.color_gradient,
            icon: row.icon,
            is_active: row.is_active,
            created_at,
            updated_at: row
                .updated_at
                .map_or(Ok(created_at), from_bson_datetime)?,
        })
    }
}

fn to_category(doc: Document) -> Result<Category, StoreError> {
    decode::<CategoryDocument>(doc)?.try_into()
}

/// Repository for category operations.
pub struct CategoryRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Active categories, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or a row is corrupt.
    pub async fn list_active(&self) -> Result<Vec<Category>, StoreError> {
        self.store
            .find(
                collections::CATEGORIES,
                Filter::all().eq("isActive", true),
                Sort::NewestFirst,
            )
            .await?
            .into_iter()
            .map(to_category)
            .collect()
    }

    /// Find a category by slug.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or the row is corrupt.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        self.store
            .find_one(collections::CATEGORIES, Filter::all().eq("slug", slug))
            .await?
            .map(to_category)
            .transpose()
    }

    /// Insert a validated category.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the name or slug is taken.
    pub async fn create(&self, category: NewCategory) -> Result<Category, StoreError> {
        self.create_with_status(category, true).await
    }

    /// Insert a category with an explicit active flag.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the name or slug is taken.
    pub async fn create_with_status(
        &self,
        category: NewCategory,
        is_active: bool,
    ) -> Result<Category, StoreError> {
        let at = to_bson_datetime(now());
        let row = CategoryDocument {
            id: None,
            name: category.name,
            slug: category.slug,
            description: category.description,
            color_gradient: category.color_gradient,
            icon: category.icon,
            is_active,
            created_at: at,
            updated_at: Some(at),
        };
        let mut doc = encode(&row)?;
        let id = self.store.insert(collections::CATEGORIES, doc.clone()).await?;
        doc.insert("_id", id);
        to_category(doc)
    }

    /// Apply a partial update. Returns `None` if the category does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the new name or slug is taken.
    pub async fn update(
        &self,
        id: &str,
        patch: CategoryPatch,
    ) -> Result<Option<Category>, StoreError> {
        let mut set = Document::new();
        if let Some(name) = patch.name {
            set.insert("name", name);
        }
        if let Some(slug) = patch.slug {
            set.insert("slug", slug);
        }
        if let Some(description) = patch.description {
            set.insert("description", description);
        }
        if let Some(color_gradient) = patch.color_gradient {
            set.insert("colorGradient", color_gradient);
        }
        if let Some(icon) = patch.icon {
            set.insert("icon", icon);
        }
        if let Some(is_active) = patch.is_active {
            set.insert("isActive", is_active);
        }
        set.insert("updatedAt", to_bson_datetime(now()));

        self.store
            .update_by_id(collections::CATEGORIES, id, set)
            .await?
            .map(to_category)
            .transpose()
    }

    /// Delete a category. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the delete fails.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete_by_id(collections::CATEGORIES, id).await
    }

    /// Number of categories, active or not.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the count fails.
    pub async fn count(&self) -> Result<u64, StoreError> {
        self.store.count(collections::CATEGORIES, Filter::all()).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn new_category(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_owned(),
            slug: anar_shop_core::models::category::slugify(name),
            description: format!("{name} things"),
            color_gradient: DEFAULT_COLOR_GRADIENT.to_owned(),
            icon: DEFAULT_ICON.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_list_active_hides_inactive() {
        let store = MemoryStore::new();
        let repo = CategoryRepository::new(&store);
        repo.create(new_category("Male")).await.unwrap();
        repo.create_with_status(new_category("Archive"), false).await.unwrap();

        let active = repo.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].slug, "male");
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_get_by_slug() {
        let store = MemoryStore::new();
        let repo = CategoryRepository::new(&store);
        repo.create(new_category("Winter Sale")).await.unwrap();

        let found = repo.get_by_slug("winter-sale").await.unwrap().unwrap();
        assert_eq!(found.name, "Winter Sale");
        assert!(found.is_active);
        assert!(repo.get_by_slug("summer").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_and_deactivate() {
        let store = MemoryStore::new();
        let repo = CategoryRepository::new(&store);
        let created = repo.create(new_category("Kids")).await.unwrap();

        let patch = CategoryPatch {
            name: Some("Children".into()),
            slug: Some("children".into()),
            is_active: Some(false),
            ..CategoryPatch::default()
        };
        let updated = repo.update(created.id.as_str(), patch).await.unwrap().unwrap();
        assert_eq!(updated.slug, "children");
        assert!(!updated.is_active);
        assert!(repo.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_legacy_row_without_updated_at() {
        let store = MemoryStore::new();
        let created = bson::DateTime::from_millis(1_700_000_000_000);
        let id = store
            .insert(
                collections::CATEGORIES,
                bson::doc! {
                    "name": "Accessories",
                    "slug": "accessories",
                    "description": "Bags",
                    "isActive": true,
                    "createdAt": created,
                },
            )
            .await
            .unwrap();

        let repo = CategoryRepository::new(&store);
        let listed = repo.list_active().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id.as_str(), id.to_hex());
        assert_eq!(listed[0].icon, DEFAULT_ICON);
        assert_eq!(listed[0].updated_at, listed[0].created_at);
    }
}
