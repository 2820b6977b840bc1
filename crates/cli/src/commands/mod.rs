//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use thiserror::Error;

use anar_shop_api::config::{ApiConfig, ConfigError};
use anar_shop_api::services::auth::AuthError;
use anar_shop_api::store::{MongoStore, StoreError};
use anar_shop_core::ValidationError;

/// Errors that can occur while running a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Store(#[from] StoreError),

    /// Account operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Input failed validation.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Seed file could not be read.
    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Seed file is not valid YAML for a catalog.
    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Connect to the configured `MongoDB` deployment.
///
/// # Errors
///
/// Returns `CliError::MissingEnvVar` if `MONGODB_URI` is unset.
pub async fn connect() -> Result<MongoStore, CliError> {
    let config = ApiConfig::from_env()?;
    let uri = config
        .mongodb_uri
        .as_ref()
        .ok_or(CliError::MissingEnvVar("MONGODB_URI"))?;

    tracing::info!("Connecting to MongoDB...");
    Ok(MongoStore::connect(uri, &config.mongodb_database).await?)
}
