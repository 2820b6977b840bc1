//! Support ticket repository.

use mongodb::bson::{self, Document, oid::ObjectId};
use serde::{Deserialize, Serialize};

use anar_shop_core::models::{NewTicket, Ticket, UpdateTicketRequest};
use anar_shop_core::{TicketId, TicketPriority, TicketStatus, UserId};

use super::{decode, encode, from_bson_datetime, now, row_id, to_bson_datetime};
use crate::store::{DocumentStore, Filter, Sort, StoreError, collections};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TicketDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    user_id: String,
    user_email: String,
    subject: String,
    message: String,
    #[serde(default)]
    status: TicketStatus,
    #[serde(default)]
    priority: TicketPriority,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl TryFrom<TicketDocument> for Ticket {
    type Error = StoreError;

    fn try_from(row: TicketDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TicketId::new(row_id(row.id)?),
            user_id: UserId::new(row.user_id),
            user_email: row.user_email,
            subject: row.subject,
            message: row.message,
            status: row.status,
            priority: row.priority,
            created_at: from_bson_datetime(row.created_at)?,
            updated_at: from_bson_datetime(row.updated_at)?,
        })
    }
}

fn to_ticket(doc: Document) -> Result<Ticket, StoreError> {
    decode::<TicketDocument>(doc)?.try_into()
}

/// Repository for support ticket operations.
pub struct TicketRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> TicketRepository<'a> {
    /// Create a new ticket repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Open a ticket for `user`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the insert fails.
    pub async fn create(
        &self,
        user: &UserId,
        user_email: &str,
        ticket: NewTicket,
    ) -> Result<Ticket, StoreError> {
        let at = to_bson_datetime(now());
        let row = TicketDocument {
            id: None,
            user_id: user.as_str().to_owned(),
            user_email: user_email.to_owned(),
            subject: ticket.subject,
            message: ticket.message,
            status: TicketStatus::default(),
            priority: ticket.priority,
            created_at: at,
            updated_at: at,
        };
        let mut doc = encode(&row)?;
        let id = self.store.insert(collections::TICKETS, doc.clone()).await?;
        doc.insert("_id", id);
        to_ticket(doc)
    }

    /// Tickets raised by `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or a row is corrupt.
    pub async fn list_for_user(&self, user: &UserId) -> Result<Vec<Ticket>, StoreError> {
        self.list(Filter::all().eq("userId", user.as_str())).await
    }

    /// Every ticket, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or a row is corrupt.
    pub async fn list_all(&self) -> Result<Vec<Ticket>, StoreError> {
        self.list(Filter::all()).await
    }

    async fn list(&self, filter: Filter) -> Result<Vec<Ticket>, StoreError> {
        self.store
            .find(collections::TICKETS, filter, Sort::NewestFirst)
            .await?
            .into_iter()
            .map(to_ticket)
            .collect()
    }

    /// Change a ticket's status or priority. Returns `None` if the ticket
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the update fails.
    pub async fn update(
        &self,
        id: &str,
        update: UpdateTicketRequest,
    ) -> Result<Option<Ticket>, StoreError> {
        let mut set = Document::new();
        if let Some(status) = update.status {
            set.insert("status", status.as_str());
        }
        if let Some(priority) = update.priority {
            set.insert("priority", priority.as_str());
        }
        set.insert("updatedAt", to_bson_datetime(now()));

        self.store
            .update_by_id(collections::TICKETS, id, set)
            .await?
            .map(to_ticket)
            .transpose()
    }
}
