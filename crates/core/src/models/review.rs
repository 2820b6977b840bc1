//! Product reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, ProductId, ReviewId, UserId};
use crate::validation::{ValidationError, non_blank};

/// Display name used when no name can be derived from the reviewer's email.
pub const ANONYMOUS_REVIEWER: &str = "Anonymous";

/// A customer review of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub user_name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Whether `user` wrote this review.
    #[must_use]
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.user_id == user
    }
}

/// Public display name for a reviewer: the local part of their email.
#[must_use]
pub fn reviewer_name(email: Option<&Email>) -> String {
    email
        .map(Email::local_part)
        .filter(|local| !local.is_empty())
        .map_or_else(|| ANONYMOUS_REVIEWER.to_owned(), ToOwned::to_owned)
}

/// Body of `POST /api/reviews`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub product_id: Option<String>,
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

/// A validated review, not yet attributed to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub product_id: ProductId,
    pub rating: u8,
    pub comment: String,
}

impl CreateReviewRequest {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when a field is missing or the rating is
    /// outside 1 to 5.
    pub fn validate(self) -> Result<NewReview, ValidationError> {
        let (Some(product_id), Some(rating), Some(comment)) =
            (non_blank(self.product_id), self.rating, non_blank(self.comment))
        else {
            return Err(ValidationError::new("Please provide all required fields"));
        };
        if !(1..=5).contains(&rating) {
            return Err(ValidationError::new("Rating must be between 1 and 5"));
        }
        Ok(NewReview {
            product_id: ProductId::new(product_id),
            rating,
            comment,
        })
    }
}
