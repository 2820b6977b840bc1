//! Session repository.

use chrono::{DateTime, Utc};
use mongodb::bson::{self, Document, oid::ObjectId};
use serde::{Deserialize, Serialize};

use anar_shop_core::{Email, Role, UserId};

use super::{decode, encode, from_bson_datetime, to_bson_datetime};
use crate::models::{CurrentUser, Session};
use crate::store::{DocumentStore, Filter, StoreError, collections};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    token_hash: String,
    user_id: String,
    email: String,
    role: Role,
    created_at: bson::DateTime,
    expires_at: bson::DateTime,
}

impl TryFrom<SessionDocument> for Session {
    type Error = StoreError;

    fn try_from(row: SessionDocument) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            StoreError::DataCorruption(format!("invalid email in session: {e}"))
        })?;
        Ok(Self {
            token_hash: row.token_hash,
            user: CurrentUser {
                id: UserId::new(row.user_id),
                email,
                role: row.role,
            },
            created_at: from_bson_datetime(row.created_at)?,
            expires_at: from_bson_datetime(row.expires_at)?,
        })
    }
}

fn to_session(doc: Document) -> Result<Session, StoreError> {
    decode::<SessionDocument>(doc)?.try_into()
}

/// Repository for bearer-token sessions.
pub struct SessionRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Store a session.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the token hash already exists.
    pub async fn create(&self, session: &Session) -> Result<(), StoreError> {
        let row = SessionDocument {
            id: None,
            token_hash: session.token_hash.clone(),
            user_id: session.user.id.as_str().to_owned(),
            email: session.user.email.as_str().to_owned(),
            role: session.user.role,
            created_at: to_bson_datetime(session.created_at),
            expires_at: to_bson_datetime(session.expires_at),
        };
        self.store.insert(collections::SESSIONS, encode(&row)?).await?;
        Ok(())
    }

    /// Look up a session by token digest.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or the row is corrupt.
    pub async fn get(&self, token_hash: &str) -> Result<Option<Session>, StoreError> {
        self.store
            .find_one(
                collections::SESSIONS,
                Filter::all().eq("tokenHash", token_hash),
            )
            .await?
            .map(to_session)
            .transpose()
    }

    /// Delete a session. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the delete fails.
    pub async fn delete(&self, token_hash: &str) -> Result<bool, StoreError> {
        let removed = self
            .store
            .delete_many(
                collections::SESSIONS,
                Filter::all().eq("tokenHash", token_hash),
            )
            .await?;
        Ok(removed > 0)
    }

    /// Delete every session belonging to `user`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the delete fails.
    pub async fn delete_for_user(&self, user: &UserId) -> Result<u64, StoreError> {
        self.store
            .delete_many(collections::SESSIONS, Filter::all().eq("userId", user.as_str()))
            .await
    }

    /// Delete every session that expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the delete fails.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        self.store
            .delete_many(
                collections::SESSIONS,
                Filter::all().lt("expiresAt", to_bson_datetime(now)),
            )
            .await
    }
}

/// Expiry for a session issued at `now`.
#[must_use]
pub fn expiry(now: DateTime<Utc>, ttl: chrono::TimeDelta) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::now;
    use crate::store::MemoryStore;

    fn session(hash: &str, user: &str) -> Session {
        let created_at = now();
        Session {
            token_hash: hash.to_owned(),
            user: CurrentUser {
                id: UserId::new(user),
                email: Email::parse("customer@test.com").unwrap(),
                role: Role::Customer,
            },
            created_at,
            expires_at: expiry(created_at, chrono::TimeDelta::days(30)),
        }
    }

    #[tokio::test]
    async fn test_create_get_delete() {
        let store = MemoryStore::new();
        let repo = SessionRepository::new(&store);
        let s = session("abc123", "u1");
        repo.create(&s).await.unwrap();

        assert_eq!(repo.get("abc123").await.unwrap().unwrap(), s);
        assert!(repo.get("other").await.unwrap().is_none());
        assert!(repo.delete("abc123").await.unwrap());
        assert!(!repo.delete("abc123").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_for_user() {
        let store = MemoryStore::new();
        let repo = SessionRepository::new(&store);
        repo.create(&session("a", "u1")).await.unwrap();
        repo.create(&session("b", "u1")).await.unwrap();
        repo.create(&session("c", "u2")).await.unwrap();

        assert_eq!(repo.delete_for_user(&UserId::new("u1")).await.unwrap(), 2);
        assert!(repo.get("c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_expired_keeps_live_sessions() {
        let store = MemoryStore::new();
        let repo = SessionRepository::new(&store);
        let mut stale = session("stale", "u1");
        stale.expires_at = stale.created_at - chrono::TimeDelta::minutes(1);
        repo.create(&stale).await.unwrap();
        repo.create(&session("live", "u1")).await.unwrap();

        assert_eq!(repo.delete_expired(now()).await.unwrap(), 1);
        assert!(repo.get("stale").await.unwrap().is_none());
        assert!(repo.get("live").await.unwrap().is_some());
        assert_eq!(repo.delete_expired(now()).await.unwrap(), 0);
    }

    #[test]
    fn test_expiry() {
        let at = now();
        assert_eq!(
            expiry(at, chrono::TimeDelta::days(30)) - at,
            chrono::TimeDelta::days(30)
        );
    }
}
