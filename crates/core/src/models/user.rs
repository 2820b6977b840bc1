//! Customer and admin accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, Role, UserId};
use crate::validation::{ValidationError, non_blank};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A registered account. The password hash lives only in the store layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The account fields returned alongside a token and from `/api/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Body of `POST /api/auth/signup`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A validated registration. The password is still plaintext here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password: String,
}

impl SignupRequest {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when a field is missing, the email is
    /// malformed, or the password is too short.
    pub fn validate(self) -> Result<NewUser, ValidationError> {
        let (Some(name), Some(email), Some(password)) = (
            non_blank(self.name),
            non_blank(self.email),
            self.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(ValidationError::new(
                "Please provide name, email and password",
            ));
        };

        let email = Email::parse(&email)
            .map_err(|_| ValidationError::new("Please provide a valid email"))?;

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::new(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        Ok(NewUser {
            name,
            email,
            password,
        })
    }
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login input with both fields present. The email is not yet parsed so a
/// malformed address fails the same way as an unknown one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the email or password is missing.
    pub fn validate(self) -> Result<Credentials, ValidationError> {
        match (non_blank(self.email), self.password.filter(|p| !p.is_empty())) {
            (Some(email), Some(password)) => Ok(Credentials { email, password }),
            _ => Err(ValidationError::new("Please provide email and password")),
        }
    }
}
