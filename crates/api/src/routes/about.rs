//! About page routes.

use axum::{Json, extract::State};
use serde::Serialize;

use anar_shop_core::models::{About, UpdateAboutRequest};

use super::JsonBody;
use crate::db::AboutRepository;
use crate::error::{AppError, Context};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Response wrapping the about page.
#[derive(Debug, Serialize)]
pub struct AboutResponse {
    pub success: bool,
    pub data: About,
}

/// The about page, created with default content on first read.
///
/// GET /api/about
///
/// # Errors
///
/// 500 if the store query or insert fails.
pub async fn show(State(state): State<AppState>) -> Result<Json<AboutResponse>, AppError> {
    let about = AboutRepository::new(state.store())
        .get_or_create()
        .await
        .context("Server error")?;

    Ok(Json(AboutResponse {
        success: true,
        data: about,
    }))
}

/// Update the about page. Fields left out keep their current value.
///
/// PUT /api/about
///
/// # Errors
///
/// 403 for non-admins.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    JsonBody(req): JsonBody<UpdateAboutRequest>,
) -> Result<Json<AboutResponse>, AppError> {
    let about = AboutRepository::new(state.store())
        .upsert_with(|content| req.apply_to(content))
        .await
        .context("Server error")?;

    tracing::info!(admin_id = %admin.id, "About page updated");
    Ok(Json(AboutResponse {
        success: true,
        data: about,
    }))
}
