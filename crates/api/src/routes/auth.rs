//! Account routes: signup, login, current user and logout.

use axum::{Json, extract::State, http::HeaderMap, http::StatusCode};
use serde::Serialize;

use anar_shop_core::models::{LoginRequest, SignupRequest, User, UserProfile};

use super::{JsonBody, MessageResponse};
use crate::db::UserRepository;
use crate::error::{AppError, Context};
use crate::middleware::{RequireAdmin, RequireAuth, bearer_token};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Response for signup and login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
    pub user: UserProfile,
}

/// Response wrapping a single user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: UserProfile,
}

/// Response listing users.
#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub success: bool,
    pub count: usize,
    pub users: Vec<User>,
}

fn auth_service(state: &AppState) -> AuthService<'_> {
    AuthService::new(state.store(), state.config().session_ttl)
}

/// Register a customer account.
///
/// POST /api/auth/signup
///
/// # Errors
///
/// 400 for missing or invalid fields and duplicate emails.
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let new_user = req.validate()?;
    let (user, token) = auth_service(&state)
        .signup(new_user)
        .await
        .context("Server error during signup")?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            success: true,
            token,
            user: user.into(),
        }),
    ))
}

/// Sign in with email and password.
///
/// POST /api/auth/login
///
/// # Errors
///
/// 400 for missing fields, 401 for bad credentials.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let credentials = req.validate()?;
    let (user, token) = auth_service(&state)
        .login(credentials)
        .await
        .context("Server error during login")?;

    Ok(Json(TokenResponse {
        success: true,
        token,
        user: user.into(),
    }))
}

/// The signed-in user.
///
/// GET /api/auth/me
///
/// # Errors
///
/// 404 if the account was removed after the token was issued.
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserRepository::new(state.store())
        .get_by_id(&current.id)
        .await
        .context("Server error")?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    Ok(Json(UserResponse {
        success: true,
        user: user.into(),
    }))
}

/// Revoke the presented bearer token.
///
/// POST /api/auth/logout
///
/// # Errors
///
/// 401 without a valid token.
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, AppError> {
    if let Some(token) = bearer_token(&headers) {
        auth_service(&state)
            .logout(token)
            .await
            .context("Server error during logout")?;
    }
    tracing::info!(user_id = %current.id, "User logged out");
    Ok(Json(MessageResponse::ok("Logged out")))
}

/// Every account, newest first.
///
/// GET /api/auth/users
///
/// # Errors
///
/// 403 for non-admins.
pub async fn users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<UsersResponse>, AppError> {
    let users = UserRepository::new(state.store())
        .list_all()
        .await
        .context("Server error fetching users")?;

    Ok(Json(UsersResponse {
        success: true,
        count: users.len(),
        users,
    }))
}
