//! Product catalog routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use anar_shop_core::ProductCategory;
use anar_shop_core::models::{CreateProductRequest, Product, UpdateProductRequest};

use super::{JsonBody, MessageResponse};
use crate::db::ProductRepository;
use crate::error::{AppError, Context};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
}

/// Response listing products.
#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub success: bool,
    pub products: Vec<Product>,
}

/// Response wrapping a single product.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub product: Product,
}

fn not_found() -> AppError {
    AppError::NotFound("Product not found".to_owned())
}

/// Product listing, newest first.
///
/// GET /api/products?category=Male
///
/// An unknown category matches nothing.
///
/// # Errors
///
/// 500 if the store query fails.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductsResponse>, AppError> {
    let repo = ProductRepository::new(state.store());

    let products = match query.category.as_deref().map(str::trim) {
        None | Some("") => repo.list(None).await,
        Some(category) => match category.parse::<ProductCategory>() {
            Ok(category) => repo.list(Some(category)).await,
            Err(_) => Ok(Vec::new()),
        },
    }
    .context("Server error fetching products")?;

    Ok(Json(ProductsResponse {
        success: true,
        products,
    }))
}

/// Product detail.
///
/// GET /api/products/{id}
///
/// # Errors
///
/// 404 if no product has this id.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = ProductRepository::new(state.store())
        .get(&id)
        .await
        .context("Server error fetching product")?
        .ok_or_else(not_found)?;

    Ok(Json(ProductResponse {
        success: true,
        product,
    }))
}

/// Create a product.
///
/// POST /api/products
///
/// # Errors
///
/// 400 when a required field is missing or invalid.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    JsonBody(req): JsonBody<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    let new_product = req.validate()?;
    let product = ProductRepository::new(state.store())
        .create(new_product)
        .await
        .context("Server error creating product")?;

    tracing::info!(product_id = %product.id, admin_id = %admin.id, "Product created");
    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            success: true,
            product,
        }),
    ))
}

/// Update a product.
///
/// PUT /api/products/{id}
///
/// # Errors
///
/// 400 for invalid fields, 404 if no product has this id.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let patch = req.validate()?;
    let product = ProductRepository::new(state.store())
        .update(&id, patch)
        .await
        .context("Server error updating product")?
        .ok_or_else(not_found)?;

    Ok(Json(ProductResponse {
        success: true,
        product,
    }))
}

/// Delete a product.
///
/// DELETE /api/products/{id}
///
/// # Errors
///
/// 404 if no product has this id.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let deleted = ProductRepository::new(state.store())
        .delete(&id)
        .await
        .context("Server error deleting product")?;
    if !deleted {
        return Err(not_found());
    }

    tracing::info!(product_id = %id, admin_id = %admin.id, "Product deleted");
    Ok(Json(MessageResponse::ok("Product deleted")))
}
