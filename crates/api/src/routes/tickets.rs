//! Support ticket routes.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use anar_shop_core::models::{CreateTicketRequest, Ticket, UpdateTicketRequest};

use super::{JsonBody, not_authorized};
use crate::db::TicketRepository;
use crate::error::{AppError, Context};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Response listing tickets.
#[derive(Debug, Serialize)]
pub struct TicketsResponse {
    pub success: bool,
    pub tickets: Vec<Ticket>,
}

/// Response wrapping a single ticket.
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub success: bool,
    pub ticket: Ticket,
}

/// Open a ticket as the caller.
///
/// POST /api/tickets
///
/// # Errors
///
/// 400 when the subject or message is missing.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(req): JsonBody<CreateTicketRequest>,
) -> Result<(StatusCode, Json<TicketResponse>), AppError> {
    let new_ticket = req.validate()?;
    let ticket = TicketRepository::new(state.store())
        .create(&user.id, user.email.as_str(), new_ticket)
        .await
        .context("Server error creating ticket")?;

    tracing::info!(ticket_id = %ticket.id, priority = %ticket.priority, "Ticket opened");
    Ok((
        StatusCode::CREATED,
        Json(TicketResponse {
            success: true,
            ticket,
        }),
    ))
}

/// The caller's tickets, newest first.
///
/// GET /api/tickets
///
/// # Errors
///
/// 500 if the store query fails.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<TicketsResponse>, AppError> {
    let tickets = TicketRepository::new(state.store())
        .list_for_user(&user.id)
        .await
        .context("Server error fetching tickets")?;

    Ok(Json(TicketsResponse {
        success: true,
        tickets,
    }))
}

/// Every ticket, newest first.
///
/// GET /api/tickets/admin/all
///
/// # Errors
///
/// 403 for non-admins.
pub async fn all(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<TicketsResponse>, AppError> {
    if !user.is_admin() {
        return Err(not_authorized());
    }
    let tickets = TicketRepository::new(state.store())
        .list_all()
        .await
        .context("Server error fetching tickets")?;

    Ok(Json(TicketsResponse {
        success: true,
        tickets,
    }))
}

/// Change a ticket's status or priority.
///
/// PUT /api/tickets/{id}
///
/// # Errors
///
/// 403 for non-admins, 404 if no ticket has this id.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    body: Result<JsonBody<UpdateTicketRequest>, AppError>,
) -> Result<Json<TicketResponse>, AppError> {
    if !user.is_admin() {
        return Err(not_authorized());
    }
    let JsonBody(req) = body?;
    let ticket = TicketRepository::new(state.store())
        .update(&id, req)
        .await
        .context("Server error updating ticket")?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_owned()))?;

    Ok(Json(TicketResponse {
        success: true,
        ticket,
    }))
}
