//! Product repository.

use mongodb::bson::{self, Document, oid::ObjectId};
use serde::{Deserialize, Serialize};

use anar_shop_core::models::{ColorStock, NewProduct, Product, ProductPatch};
use anar_shop_core::{ProductCategory, ProductId};

use super::{
    decimal_to_f64, decode, encode, f64_to_decimal, from_bson_datetime, now, row_id,
    to_bson_datetime,
};
use crate::store::{DocumentStore, Filter, Sort, StoreError, collections};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    price: f64,
    image_url: String,
    category: ProductCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    colors: Vec<ColorStock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_stock: Option<u32>,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl TryFrom<ProductDocument> for Product {
    type Error = StoreError;

    fn try_from(row: ProductDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId::new(row_id(row.id)?),
            name: row.name,
            price: f64_to_decimal(row.price, "price")?,
            image_url: row.image_url,
            category: row.category,
            description: row.description,
            colors: row.colors,
            total_stock: row.total_stock,
            created_at: from_bson_datetime(row.created_at)?,
            updated_at: from_bson_datetime(row.updated_at)?,
        })
    }
}

fn to_product(doc: Document) -> Result<Product, StoreError> {
    decode::<ProductDocument>(doc)?.try_into()
}

/// Repository for product operations.
pub struct ProductRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// List products, newest first, optionally limited to one category.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or a row is corrupt.
    pub async fn list(
        &self,
        category: Option<ProductCategory>,
    ) -> Result<Vec<Product>, StoreError> {
        let filter =
            category.map_or_else(Filter::all, |c| Filter::all().eq("category", c.as_str()));
        self.store
            .find(collections::PRODUCTS, filter, Sort::NewestFirst)
            .await?
            .into_iter()
            .map(to_product)
            .collect()
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or the row is corrupt.
    pub async fn get(&self, id: &str) -> Result<Option<Product>, StoreError> {
        self.store
            .find_by_id(collections::PRODUCTS, id)
            .await?
            .map(to_product)
            .transpose()
    }

    /// Insert a validated product.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the insert fails.
    pub async fn create(&self, product: NewProduct) -> Result<Product, StoreError> {
        let at = to_bson_datetime(now());
        let row = ProductDocument {
            id: None,
            name: product.name,
            price: decimal_to_f64(product.price, "price")?,
            image_url: product.image_url,
            category: product.category,
            description: product.description,
            colors: product.colors,
            total_stock: product.total_stock,
            created_at: at,
            updated_at: at,
        };
        let mut doc = encode(&row)?;
        let id = self.store.insert(collections::PRODUCTS, doc.clone()).await?;
        doc.insert("_id", id);
        to_product(doc)
    }

    /// Apply a partial update. Returns `None` if the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the update fails.
    pub async fn update(
        &self,
        id: &str,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let mut set = Document::new();
        if let Some(total) = patch.total_stock() {
            set.insert("totalStock", i64::from(total));
        }
        if let Some(name) = patch.name {
            set.insert("name", name);
        }
        if let Some(price) = patch.price {
            set.insert("price", decimal_to_f64(price, "price")?);
        }
        if let Some(image_url) = patch.image_url {
            set.insert("imageUrl", image_url);
        }
        if let Some(category) = patch.category {
            set.insert("category", category.as_str());
        }
        if let Some(description) = patch.description {
            set.insert("description", description);
        }
        if let Some(colors) = patch.colors {
            set.insert("colors", bson::to_bson(&colors)?);
        }
        set.insert("updatedAt", to_bson_datetime(now()));

        self.store
            .update_by_id(collections::PRODUCTS, id, set)
            .await?
            .map(to_product)
            .transpose()
    }

    /// Delete a product. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the delete fails.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete_by_id(collections::PRODUCTS, id).await
    }

    /// Number of products in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the count fails.
    pub async fn count(&self) -> Result<u64, StoreError> {
        self.store.count(collections::PRODUCTS, Filter::all()).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::store::MemoryStore;

    fn new_product(name: &str, category: ProductCategory) -> NewProduct {
        NewProduct {
            name: name.to_owned(),
            price: Decimal::new(3500, 2),
            image_url: "/images/tshirt.jpg".to_owned(),
            category,
            description: None,
            colors: vec![ColorStock {
                color: "White".to_owned(),
                quantity: 30,
            }],
            total_stock: Some(30),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryStore::new();
        let repo = ProductRepository::new(&store);

        let created = repo
            .create(new_product("Men's Cotton T-Shirt", ProductCategory::Male))
            .await
            .unwrap();
        assert_eq!(created.total_stock, Some(30));
        assert_eq!(created.created_at, created.updated_at);

        let fetched = repo.get(created.id.as_str()).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(repo.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_by_category() {
        let store = MemoryStore::new();
        let repo = ProductRepository::new(&store);
        repo.create(new_product("Blouse", ProductCategory::Female)).await.unwrap();
        repo.create(new_product("Jeans", ProductCategory::Male)).await.unwrap();

        assert_eq!(repo.list(None).await.unwrap().len(), 2);
        let female = repo.list(Some(ProductCategory::Female)).await.unwrap();
        assert_eq!(female.len(), 1);
        assert_eq!(female[0].name, "Blouse");
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_recomputes_stock() {
        let store = MemoryStore::new();
        let repo = ProductRepository::new(&store);
        let created = repo
            .create(new_product("Kids Sneakers", ProductCategory::Children))
            .await
            .unwrap();

        let patch = ProductPatch {
            price: Some(Decimal::new(45, 0)),
            colors: Some(vec![
                ColorStock { color: "Pink".into(), quantity: 4 },
                ColorStock { color: "Blue".into(), quantity: 6 },
            ]),
            ..ProductPatch::default()
        };
        let updated = repo.update(created.id.as_str(), patch).await.unwrap().unwrap();
        assert_eq!(updated.total_stock, Some(10));
        assert_eq!(updated.price, Decimal::new(45, 0));
        assert_eq!(updated.name, "Kids Sneakers");
        assert_eq!(updated.colors.len(), 2);

        let missing = repo
            .update(&ObjectId::new().to_hex(), ProductPatch::default())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let repo = ProductRepository::new(&store);
        let created = repo
            .create(new_product("Kids Backpack", ProductCategory::Children))
            .await
            .unwrap();
        assert!(repo.delete(created.id.as_str()).await.unwrap());
        assert!(!repo.delete(created.id.as_str()).await.unwrap());
    }
}
