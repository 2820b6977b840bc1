//! Customer support tickets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{TicketId, TicketPriority, TicketStatus, UserId};
use crate::validation::{ValidationError, non_blank};

/// A support request raised by a signed-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(rename = "_id")]
    pub id: TicketId,
    pub user_id: UserId,
    pub user_email: String,
    pub subject: String,
    pub message: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/tickets`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTicketRequest {
    pub subject: Option<String>,
    pub message: Option<String>,
    pub priority: Option<TicketPriority>,
}

/// A validated ticket, not yet attributed to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub subject: String,
    pub message: String,
    pub priority: TicketPriority,
}

impl CreateTicketRequest {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the subject or message is missing.
    pub fn validate(self) -> Result<NewTicket, ValidationError> {
        let (Some(subject), Some(message)) = (non_blank(self.subject), non_blank(self.message))
        else {
            return Err(ValidationError::new("Subject and message are required"));
        };
        Ok(NewTicket {
            subject,
            message,
            priority: self.priority.unwrap_or_default(),
        })
    }
}

/// Body of `PUT /api/tickets/{id}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateTicketRequest {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
}

impl UpdateTicketRequest {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none()
    }
}
