//! Product review routes.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use anar_shop_core::models::review::reviewer_name;
use anar_shop_core::models::{CreateReviewRequest, Review};

use super::{JsonBody, MessageResponse};
use crate::db::ReviewRepository;
use crate::error::{AppError, Context};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Response listing reviews.
#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub success: bool,
    pub reviews: Vec<Review>,
}

/// Response wrapping a single review.
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub success: bool,
    pub review: Review,
}

/// Reviews for a product, newest first.
///
/// GET /api/reviews/product/{productId}
///
/// # Errors
///
/// 500 if the store query fails.
pub async fn for_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<ReviewsResponse>, AppError> {
    let reviews = ReviewRepository::new(state.store())
        .list_for_product(&product_id)
        .await
        .context("Server error fetching reviews")?;

    Ok(Json(ReviewsResponse {
        success: true,
        reviews,
    }))
}

/// Review a product as the caller. The reviewer name is the local part of
/// the caller's email.
///
/// POST /api/reviews
///
/// # Errors
///
/// 400 when a field is missing or the rating is out of range.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(req): JsonBody<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), AppError> {
    let new_review = req.validate()?;
    let review = ReviewRepository::new(state.store())
        .create(&user.id, reviewer_name(Some(&user.email)), new_review)
        .await
        .context("Server error creating review")?;

    Ok((
        StatusCode::CREATED,
        Json(ReviewResponse {
            success: true,
            review,
        }),
    ))
}

/// Delete a review, as its author or an admin.
///
/// DELETE /api/reviews/{id}
///
/// # Errors
///
/// 404 if no review has this id, 403 if the caller did not write it.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let repo = ReviewRepository::new(state.store());
    let review = repo
        .get(&id)
        .await
        .context("Server error deleting review")?
        .ok_or_else(|| AppError::NotFound("Review not found".to_owned()))?;

    if !review.is_owned_by(&user.id) && !user.is_admin() {
        return Err(super::not_authorized());
    }

    repo.delete(&id)
        .await
        .context("Server error deleting review")?;
    Ok(Json(MessageResponse::ok("Review deleted")))
}
