//! Unified error handling for the API.

use std::time::Duration;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use anar_shop_core::ValidationError;

use crate::services::auth::AuthError;
use crate::store::StoreError;

/// Message returned to clients for server errors without a more specific
/// context.
pub const SERVER_ERROR: &str = "Server error";

/// Message returned when a request body exceeds the size limit.
pub const PAYLOAD_TOO_LARGE: &str = "Request entity too large";

/// Message returned to rate-limited clients.
pub const RATE_LIMITED: &str = "Too many requests, please try again later.";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Document store operation failed. `context` is what the client sees.
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    /// Authentication failed.
    #[error(transparent)]
    Auth(AuthError),

    /// Request payload failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("{0}")]
    Unauthorized(String),

    /// Caller lacks permission.
    #[error("{0}")]
    Forbidden(String),

    /// Request body exceeded the size limit.
    #[error("request body too large")]
    PayloadTooLarge,

    /// Client exceeded the request budget for the current window.
    #[error("rate limited, retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(source: StoreError) -> Self {
        Self::Store {
            context: SERVER_ERROR,
            source,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Store(source) => Self::Store {
                context: SERVER_ERROR,
                source,
            },
            other => Self::Auth(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            Self::BadRequest(rejection.body_text())
        }
    }
}

/// Attach a client-facing message to server-side failures.
pub trait Context<T> {
    /// Report a failure as `message` (e.g. "Server error creating order").
    ///
    /// # Errors
    ///
    /// Returns the converted error when `self` is `Err`.
    fn context(self, message: &'static str) -> Result<T, AppError>;
}

impl<T> Context<T> for Result<T, StoreError> {
    fn context(self, message: &'static str) -> Result<T, AppError> {
        self.map_err(|source| AppError::Store {
            context: message,
            source,
        })
    }
}

impl<T> Context<T> for Result<T, AuthError> {
    fn context(self, message: &'static str) -> Result<T, AppError> {
        self.map_err(|err| match err {
            AuthError::Store(source) => AppError::Store {
                context: message,
                source,
            },
            AuthError::PasswordHash => AppError::Internal(message.to_owned()),
            other => AppError::Auth(other),
        })
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Store { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::InvalidToken => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::UserAlreadyExists => StatusCode::BAD_REQUEST,
                AuthError::Store(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// The message shown to the client.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Store { context, .. } => (*context).to_owned(),
            Self::Internal(context) if context.starts_with(SERVER_ERROR) => context.clone(),
            Self::Internal(_) => SERVER_ERROR.to_owned(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_owned(),
                AuthError::InvalidToken => "Not authorized to access this route".to_owned(),
                AuthError::UserNotFound => "User not found".to_owned(),
                AuthError::UserAlreadyExists => "User already exists".to_owned(),
                AuthError::Store(_) | AuthError::PasswordHash => SERVER_ERROR.to_owned(),
            },
            Self::PayloadTooLarge => PAYLOAD_TOO_LARGE.to_owned(),
            Self::RateLimited { .. } => RATE_LIMITED.to_owned(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Client error");
        }

        let message = self.client_message();

        match self {
            Self::RateLimited { retry_after } => {
                let mut response = (
                    status,
                    Json(json!({ "success": false, "error": { "message": message } })),
                )
                    .into_response();
                let secs = retry_after.as_secs().max(1).to_string();
                if let Ok(value) = HeaderValue::from_str(&secs) {
                    response.headers_mut().insert(header::RETRY_AFTER, value);
                }
                response
            }
            Self::PayloadTooLarge => (
                status,
                Json(json!({ "success": false, "error": { "message": message } })),
            )
                .into_response(),
            _ => (status, Json(json!({ "success": false, "message": message }))).into_response(),
        }
    }
}

/// Set the Sentry user context for the authenticated caller.
pub fn set_sentry_user(user_id: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_owned()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}
