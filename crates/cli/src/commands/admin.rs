//! Admin user management.

use anar_shop_api::config::ApiConfig;
use anar_shop_api::services::auth::AuthService;
use anar_shop_core::models::SignupRequest;

use super::{CliError, connect};

/// Create an admin user, or promote the existing account with this email.
///
/// # Errors
///
/// Returns `CliError::Validation` for a malformed email or short password,
/// or a store error if the write fails.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<(), CliError> {
    let new_user = SignupRequest {
        name: Some(name.to_owned()),
        email: Some(email.to_owned()),
        password: Some(password.to_owned()),
    }
    .validate()?;

    let config = ApiConfig::from_env()?;
    let store = connect().await?;
    let auth = AuthService::new(&store, config.session_ttl);

    let (user, created) = auth.create_or_promote_admin(new_user).await?;
    if created {
        tracing::info!(user_id = %user.id, email = %user.email, "Admin user created");
    } else {
        tracing::info!(
            user_id = %user.id,
            email = %user.email,
            "Existing user promoted to admin; their sessions were revoked"
        );
    }
    Ok(())
}
