//! Order routes.
//!
//! Customers see their own orders; admins see everything and move orders
//! through their statuses.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use anar_shop_core::models::{CreateOrderRequest, Order, UpdateOrderStatusRequest};

use super::{JsonBody, not_authorized};
use crate::db::OrderRepository;
use crate::error::{AppError, Context};
use crate::middleware::RequireAuth;
use crate::services::orders::place_order;
use crate::state::AppState;

/// Response listing orders.
#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub success: bool,
    pub orders: Vec<Order>,
}

/// Response wrapping a single order.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: Order,
}

fn not_found() -> AppError {
    AppError::NotFound("Order not found".to_owned())
}

/// Place an order for the caller.
///
/// POST /api/orders
///
/// # Errors
///
/// 400 when items, shipping address or total are missing.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(req): JsonBody<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    let new_order = req.validate()?;
    let order = place_order(state.store(), &user.id, new_order)
        .await
        .context("Server error creating order")?;

    tracing::info!(
        order_number = %order.order_number,
        user_id = %user.id,
        total = %order.total_amount,
        "Order placed"
    );
    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            success: true,
            order,
        }),
    ))
}

/// The caller's orders, newest first.
///
/// GET /api/orders
///
/// # Errors
///
/// 500 if the store query fails.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<OrdersResponse>, AppError> {
    let orders = OrderRepository::new(state.store())
        .list_for_user(&user.id)
        .await
        .context("Server error fetching orders")?;

    Ok(Json(OrdersResponse {
        success: true,
        orders,
    }))
}

/// Every order, newest first.
///
/// GET /api/orders/admin/all
///
/// # Errors
///
/// 403 for non-admins.
pub async fn all(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<OrdersResponse>, AppError> {
    if !user.is_admin() {
        return Err(not_authorized());
    }
    let orders = OrderRepository::new(state.store())
        .list_all()
        .await
        .context("Server error fetching orders")?;

    Ok(Json(OrdersResponse {
        success: true,
        orders,
    }))
}

/// Order detail, for its owner or an admin.
///
/// GET /api/orders/{id}
///
/// # Errors
///
/// 404 if no order has this id, 403 if the caller may not see it.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = OrderRepository::new(state.store())
        .get(&id)
        .await
        .context("Server error fetching order")?
        .ok_or_else(not_found)?;

    if !order.is_owned_by(&user.id) && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to view this order".to_owned(),
        ));
    }

    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}

/// Move an order to a new status.
///
/// PUT /api/orders/{id}/status
///
/// # Errors
///
/// 403 for non-admins, 400 without a status, 404 if no order has this id.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    body: Result<JsonBody<UpdateOrderStatusRequest>, AppError>,
) -> Result<Json<OrderResponse>, AppError> {
    if !user.is_admin() {
        return Err(not_authorized());
    }
    let JsonBody(req) = body?;
    let update = req.validate()?;
    let order = OrderRepository::new(state.store())
        .update_status(&id, update)
        .await
        .context("Server error updating order")?
        .ok_or_else(not_found)?;

    tracing::info!(
        order_number = %order.order_number,
        status = %order.status,
        "Order status updated"
    );
    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}
