//! Category routes.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use anar_shop_core::models::{Category, CreateCategoryRequest, UpdateCategoryRequest};

use super::{JsonBody, MessageResponse};
use crate::db::CategoryRepository;
use crate::error::{AppError, Context};
use crate::middleware::RequireAdmin;
use crate::state::AppState;
use crate::store::StoreError;

/// Response listing categories.
#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub success: bool,
    pub categories: Vec<Category>,
}

/// Response wrapping a single category.
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub success: bool,
    pub category: Category,
}

fn not_found() -> AppError {
    AppError::NotFound("Category not found".to_owned())
}

fn already_exists() -> AppError {
    AppError::BadRequest("Category already exists".to_owned())
}

/// Active categories, newest first.
///
/// GET /api/categories
///
/// # Errors
///
/// 500 if the store query fails.
pub async fn index(State(state): State<AppState>) -> Result<Json<CategoriesResponse>, AppError> {
    let categories = CategoryRepository::new(state.store())
        .list_active()
        .await
        .context("Server error fetching categories")?;

    Ok(Json(CategoriesResponse {
        success: true,
        categories,
    }))
}

/// Create a category. The slug is derived from the name.
///
/// POST /api/categories
///
/// # Errors
///
/// 400 when the name or description is missing or the slug is taken.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    JsonBody(req): JsonBody<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), AppError> {
    let new_category = req.validate()?;
    let repo = CategoryRepository::new(state.store());

    if repo
        .get_by_slug(&new_category.slug)
        .await
        .context("Server error creating category")?
        .is_some()
    {
        return Err(already_exists());
    }

    let category = match repo.create(new_category).await {
        Ok(category) => category,
        Err(StoreError::Conflict(_)) => return Err(already_exists()),
        Err(source) => {
            return Err(AppError::Store {
                context: "Server error creating category",
                source,
            });
        }
    };

    tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
    Ok((
        StatusCode::CREATED,
        Json(CategoryResponse {
            success: true,
            category,
        }),
    ))
}

/// Update a category. Renaming re-derives the slug.
///
/// PUT /api/categories/{id}
///
/// # Errors
///
/// 400 if the new name collides, 404 if no category has this id.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, AppError> {
    let patch = req.validate()?;
    let category = match CategoryRepository::new(state.store()).update(&id, patch).await {
        Ok(category) => category.ok_or_else(not_found)?,
        Err(StoreError::Conflict(_)) => return Err(already_exists()),
        Err(source) => {
            return Err(AppError::Store {
                context: "Server error updating category",
                source,
            });
        }
    };

    Ok(Json(CategoryResponse {
        success: true,
        category,
    }))
}

/// Delete a category.
///
/// DELETE /api/categories/{id}
///
/// # Errors
///
/// 404 if no category has this id.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let deleted = CategoryRepository::new(state.store())
        .delete(&id)
        .await
        .context("Server error deleting category")?;
    if !deleted {
        return Err(not_found());
    }
    Ok(Json(MessageResponse::ok("Category deleted")))
}
