//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                           - Service banner
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (store ping)
//!
//! # Auth
//! POST /api/auth/signup            - Register and sign in
//! POST /api/auth/login             - Sign in
//! GET  /api/auth/me                - Current user (auth)
//! POST /api/auth/logout            - Revoke the presented token (auth)
//! GET  /api/auth/users             - All users (admin)
//!
//! # Catalog
//! GET    /api/products             - Product listing (?category=)
//! GET    /api/products/{id}        - Product detail
//! POST   /api/products             - Create product (admin)
//! PUT    /api/products/{id}        - Update product (admin)
//! DELETE /api/products/{id}        - Delete product (admin)
//! GET    /api/categories           - Active categories
//! POST   /api/categories           - Create category (admin)
//! PUT    /api/categories/{id}      - Update category (admin)
//! DELETE /api/categories/{id}      - Delete category (admin)
//!
//! # Orders (auth)
//! POST /api/orders                 - Place order
//! GET  /api/orders                 - Caller's orders
//! GET  /api/orders/admin/all       - All orders (admin)
//! GET  /api/orders/{id}            - Order detail (owner or admin)
//! PUT  /api/orders/{id}/status     - Update status (admin)
//!
//! # Reviews
//! GET    /api/reviews/product/{productId} - Reviews for a product
//! POST   /api/reviews              - Write review (auth)
//! DELETE /api/reviews/{id}         - Delete review (owner or admin)
//!
//! # Tickets (auth)
//! POST /api/tickets                - Open ticket
//! GET  /api/tickets                - Caller's tickets
//! GET  /api/tickets/admin/all      - All tickets (admin)
//! PUT  /api/tickets/{id}           - Update ticket (admin)
//!
//! # About
//! GET /api/about                   - About page content
//! PUT /api/about                   - Update content (admin)
//! ```

pub mod about;
pub mod auth;
pub mod categories;
pub mod health;
pub mod json;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod tickets;

pub use json::JsonBody;

use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Serialize;
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// Plain `{success, message}` acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

impl MessageResponse {
    #[must_use]
    pub const fn ok(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

/// 403 used by handlers that check the admin role themselves.
pub(crate) fn not_authorized() -> AppError {
    AppError::Forbidden("Not authorized".to_owned())
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout))
        .route("/users", get(auth::users))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route(
            "/{id}",
            put(categories::update).delete(categories::delete),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/admin/all", get(orders::all))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::update_status))
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(reviews::create))
        .route("/product/{product_id}", get(reviews::for_product))
        .route("/{id}", axum::routing::delete(reviews::delete))
}

/// Create the ticket routes router.
pub fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(tickets::index).post(tickets::create))
        .route("/admin/all", get(tickets::all))
        .route("/{id}", put(tickets::update))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::banner))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .nest("/api/auth", auth_routes())
        .nest("/api/products", product_routes())
        .nest("/api/categories", category_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/reviews", review_routes())
        .nest("/api/tickets", ticket_routes())
        .route("/api/about", get(about::show).put(about::update))
        .fallback(not_found)
}

/// JSON 404 for unknown routes.
async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": { "message": format!("Route {} not found", uri.path()) },
        })),
    )
}
