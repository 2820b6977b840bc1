//! User repository.
//!
//! The password hash is stored under `password` and never leaves this module
//! except through [`UserRepository::get_password_hash`].

use mongodb::bson::{self, Document, oid::ObjectId};
use serde::{Deserialize, Serialize};

use anar_shop_core::models::User;
use anar_shop_core::{Email, Role, UserId};

use super::{decode, encode, from_bson_datetime, now, row_id, to_bson_datetime};
use crate::store::{DocumentStore, Filter, Sort, StoreError, collections};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    email: String,
    password: String,
    #[serde(default)]
    role: Role,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl UserDocument {
    fn into_user(self) -> Result<(User, String), StoreError> {
        let email = Email::parse(&self.email).map_err(|e| {
            StoreError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let user = User {
            id: UserId::new(row_id(self.id)?),
            name: self.name,
            email,
            role: self.role,
            created_at: from_bson_datetime(self.created_at)?,
            updated_at: from_bson_datetime(self.updated_at)?,
        };
        Ok((user, self.password))
    }
}

fn to_user(doc: Document) -> Result<User, StoreError> {
    decode::<UserDocument>(doc)?.into_user().map(|(user, _)| user)
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        self.store
            .find_by_id(collections::USERS, id.as_str())
            .await?
            .map(to_user)
            .transpose()
    }

    /// Get a user by email address.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        Ok(self.get_password_hash(email).await?.map(|(user, _)| user))
    }

    /// Get a user together with their password hash.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DataCorruption` if the stored email is invalid.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, StoreError> {
        self.store
            .find_one(collections::USERS, Filter::all().eq("email", email.as_str()))
            .await?
            .map(|doc| decode::<UserDocument>(doc)?.into_user())
            .transpose()
    }

    /// Create a user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the email already exists.
    pub async fn create_with_password(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
        role: Role,
    ) -> Result<User, StoreError> {
        let at = to_bson_datetime(now());
        let row = UserDocument {
            id: None,
            name: name.to_owned(),
            email: email.as_str().to_owned(),
            password: password_hash.to_owned(),
            role,
            created_at: at,
            updated_at: at,
        };
        let mut doc = encode(&row)?;
        let id = self.store.insert(collections::USERS, doc.clone()).await?;
        doc.insert("_id", id);
        to_user(doc)
    }

    /// Every user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or a row is corrupt.
    pub async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        self.store
            .find(collections::USERS, Filter::all(), Sort::NewestFirst)
            .await?
            .into_iter()
            .map(to_user)
            .collect()
    }

    /// Change a user's role. Returns `None` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the update fails.
    pub async fn set_role(&self, id: &UserId, role: Role) -> Result<Option<User>, StoreError> {
        let mut set = Document::new();
        set.insert("role", role.as_str());
        set.insert("updatedAt", to_bson_datetime(now()));
        self.store
            .update_by_id(collections::USERS, id.as_str(), set)
            .await?
            .map(to_user)
            .transpose()
    }

    /// Number of registered users.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the count fails.
    pub async fn count(&self) -> Result<u64, StoreError> {
        self.store.count(collections::USERS, Filter::all()).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, ensure_indexes};

    #[tokio::test]
    async fn test_create_and_lookup() {
        let store = MemoryStore::new();
        let repo = UserRepository::new(&store);
        let email = Email::parse("customer@test.com").unwrap();

        let user = repo
            .create_with_password("Customer", &email, "$argon2id$hash", Role::Customer)
            .await
            .unwrap();
        assert_eq!(user.role, Role::Customer);

        let (found, hash) = repo.get_password_hash(&email).await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(hash, "$argon2id$hash");

        assert_eq!(repo.get_by_id(&user.id).await.unwrap().unwrap().name, "Customer");
        assert!(repo.get_by_id(&UserId::new("bad")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        ensure_indexes(&store).await.unwrap();
        let repo = UserRepository::new(&store);
        let email = Email::parse("admin@anarshop.com").unwrap();

        repo.create_with_password("Admin", &email, "h", Role::Admin).await.unwrap();
        let err = repo
            .create_with_password("Again", &email, "h", Role::Customer)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_set_role() {
        let store = MemoryStore::new();
        let repo = UserRepository::new(&store);
        let email = Email::parse("staff@anarshop.com").unwrap();
        let user = repo
            .create_with_password("Staff", &email, "h", Role::Customer)
            .await
            .unwrap();

        let promoted = repo.set_role(&user.id, Role::Admin).await.unwrap().unwrap();
        assert!(promoted.role.is_admin());
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_legacy_user_role() {
        let store = MemoryStore::new();
        let at = bson::DateTime::from_millis(1_700_000_000_000);
        store
            .insert(
                collections::USERS,
                bson::doc! {
                    "name": "Old",
                    "email": "old@test.com",
                    "password": "h",
                    "role": "user",
                    "createdAt": at,
                    "updatedAt": at,
                },
            )
            .await
            .unwrap();

        let repo = UserRepository::new(&store);
        let user = repo
            .get_by_email(&Email::parse("old@test.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.role, Role::Customer);
    }
}
