//! Authentication service.
//!
//! Passwords are hashed with Argon2id. A successful signup or login issues an
//! opaque bearer token: 32 random bytes, URL-safe base64. Only the SHA-256
//! digest of the token is stored, so a leaked `sessions` collection cannot be
//! replayed.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

use anar_shop_core::models::{Credentials, NewUser, User};
use anar_shop_core::{Email, Role};

use crate::db::sessions::expiry;
use crate::db::{SessionRepository, UserRepository, now};
use crate::models::{CurrentUser, Session};
use crate::store::{DocumentStore, StoreError};

const TOKEN_BYTES: usize = 32;

/// Authentication service.
///
/// Handles registration, login, token resolution and logout.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    sessions: SessionRepository<'a>,
    session_ttl: chrono::TimeDelta,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore, session_ttl: chrono::TimeDelta) -> Self {
        Self {
            users: UserRepository::new(store),
            sessions: SessionRepository::new(store),
            session_ttl,
        }
    }

    /// Register a customer account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the email is registered.
    pub async fn signup(&self, new_user: NewUser) -> Result<(User, String), AuthError> {
        if self.users.get_by_email(&new_user.email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(&new_user.password)?;
        let user = self
            .users
            .create_with_password(&new_user.name, &new_user.email, &password_hash, Role::Customer)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Store(other),
            })?;

        let token = self.issue_token(&user).await?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok((user, token))
    }

    /// Check a password and sign the user in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or
    /// malformed, or the password is wrong.
    pub async fn login(&self, credentials: Credentials) -> Result<(User, String), AuthError> {
        let email = Email::parse(&credentials.email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(&credentials.password, &password_hash)?;

        let token = self.issue_token(&user).await?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok((user, token))
    }

    /// Resolve a bearer token to the user it was issued to.
    ///
    /// Expired sessions are removed on sight.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is unknown or expired.
    pub async fn authenticate(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let token_hash = hash_token(token);
        let session = self
            .sessions
            .get(&token_hash)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if session.is_expired(now()) {
            self.sessions.delete(&token_hash).await?;
            return Err(AuthError::InvalidToken);
        }
        Ok(session.user)
    }

    /// Revoke a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the delete fails.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.sessions.delete(&hash_token(token)).await?;
        Ok(())
    }

    /// Create an admin account, or promote the existing account with this
    /// email. Returns the user and whether it was newly created.
    ///
    /// Sessions of a promoted user are revoked so the new role takes effect
    /// on the next sign-in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if a read or write fails.
    pub async fn create_or_promote_admin(
        &self,
        new_user: NewUser,
    ) -> Result<(User, bool), AuthError> {
        if let Some(existing) = self.users.get_by_email(&new_user.email).await? {
            let promoted = self
                .users
                .set_role(&existing.id, Role::Admin)
                .await?
                .ok_or(AuthError::UserNotFound)?;
            self.sessions.delete_for_user(&promoted.id).await?;
            return Ok((promoted, false));
        }

        let password_hash = hash_password(&new_user.password)?;
        let user = self
            .users
            .create_with_password(&new_user.name, &new_user.email, &password_hash, Role::Admin)
            .await?;
        Ok((user, true))
    }

    /// Issue a session for `user`, purging sessions that already expired.
    async fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let token = generate_token();
        let created_at = now();
        let purged = self.sessions.delete_expired(created_at).await?;
        if purged > 0 {
            tracing::debug!(purged, "Expired sessions removed");
        }
        let session = Session {
            token_hash: hash_token(&token),
            user: CurrentUser {
                id: user.id.clone(),
                email: user.email.clone(),
                role: user.role,
            },
            created_at,
            expires_at: expiry(created_at, self.session_ttl),
        };
        self.sessions.create(&session).await?;
        Ok(token)
    }
}

/// Generate a fresh bearer token.
fn generate_token() -> String {
    let mut bytes = [0_u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 hex digest of a bearer token.
#[must_use]
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
