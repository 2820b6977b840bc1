//! Review repository.

use mongodb::bson::{self, Document, oid::ObjectId};
use serde::{Deserialize, Serialize};

use anar_shop_core::models::{NewReview, Review};
use anar_shop_core::{ProductId, ReviewId, UserId};

use super::{decode, encode, from_bson_datetime, now, row_id, to_bson_datetime};
use crate::store::{DocumentStore, Filter, Sort, StoreError, collections};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    product_id: String,
    user_id: String,
    user_name: String,
    rating: u8,
    comment: String,
    created_at: bson::DateTime,
    #[serde(default)]
    updated_at: Option<bson::DateTime>,
}

impl TryFrom<ReviewDocument> for Review {
    type Error = StoreError;

    fn try_from(row: ReviewDocument) -> Result<Self, Self::Error> {
        let created_at = from_bson_datetime(row.created_at)?;
        Ok(Self {
            id: ReviewId::new(row_id(row.id)?),
            product_id: ProductId::new(row.product_id),
            user_id: UserId::new(row.user_id),
            user_name: row.user_name,
            rating: row.rating,
            comment: row.comment,
            created_at,
            updated_at: row
                .updated_at
                .map_or(Ok(created_at), from_bson_datetime)?,
        })
    }
}

fn to_review(doc: Document) -> Result<Review, StoreError> {
    decode::<ReviewDocument>(doc)?.try_into()
}

/// Repository for review operations.
pub struct ReviewRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Reviews of a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or a row is corrupt.
    pub async fn list_for_product(&self, product: &str) -> Result<Vec<Review>, StoreError> {
        self.store
            .find(
                collections::REVIEWS,
                Filter::all().eq("productId", product),
                Sort::NewestFirst,
            )
            .await?
            .into_iter()
            .map(to_review)
            .collect()
    }

    /// Get a review by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or the row is corrupt.
    pub async fn get(&self, id: &str) -> Result<Option<Review>, StoreError> {
        self.store
            .find_by_id(collections::REVIEWS, id)
            .await?
            .map(to_review)
            .transpose()
    }

    /// Store a review written by `user` under the display name `user_name`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the insert fails.
    pub async fn create(
        &self,
        user: &UserId,
        user_name: String,
        review: NewReview,
    ) -> Result<Review, StoreError> {
        let at = to_bson_datetime(now());
        let row = ReviewDocument {
            id: None,
            product_id: review.product_id.into_inner(),
            user_id: user.as_str().to_owned(),
            user_name,
            rating: review.rating,
            comment: review.comment,
            created_at: at,
            updated_at: Some(at),
        };
        let mut doc = encode(&row)?;
        let id = self.store.insert(collections::REVIEWS, doc.clone()).await?;
        doc.insert("_id", id);
        to_review(doc)
    }

    /// Delete a review. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the delete fails.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete_by_id(collections::REVIEWS, id).await
    }
}
