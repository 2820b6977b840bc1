//! Database migration commands.
//!
//! `MongoDB` has no schema to migrate; these commands create the unique
//! indexes the API relies on and bring the about page up to date.

use anar_shop_api::db::AboutRepository;
use anar_shop_api::store::{DocumentStore, StoreError, TTL_INDEXES, UNIQUE_INDEXES, ensure_indexes};

use super::{CliError, connect};

/// What [`complete_about`] did.
#[derive(Debug, PartialEq, Eq)]
pub enum AboutMigration {
    /// No about document existed; one was created with defaults.
    Created,
    /// These fields were blank and were filled with defaults.
    Filled(Vec<&'static str>),
    /// Every field was already set.
    UpToDate,
}

/// Create the about page, or fill its blank fields with defaults.
///
/// # Errors
///
/// Returns `StoreError` if a read or write fails.
pub async fn complete_about(store: &dyn DocumentStore) -> Result<AboutMigration, StoreError> {
    let repo = AboutRepository::new(store);
    let Some(about) = repo.find().await? else {
        let created = repo.create(Default::default()).await?;
        tracing::info!(about_id = %created.id, "Created about page content");
        return Ok(AboutMigration::Created);
    };

    let mut content = about.content;
    let filled = content.fill_missing();
    if filled.is_empty() {
        return Ok(AboutMigration::UpToDate);
    }
    repo.replace_content(&about.id, &content).await?;
    Ok(AboutMigration::Filled(filled))
}

/// Create unique and TTL indexes.
///
/// # Errors
///
/// Returns an error if the connection or index creation fails.
pub async fn indexes() -> Result<(), CliError> {
    let store = connect().await?;

    tracing::info!(
        "Creating {} unique and {} TTL indexes...",
        UNIQUE_INDEXES.len(),
        TTL_INDEXES.len()
    );
    ensure_indexes(&store).await?;

    tracing::info!("Index migration complete!");
    Ok(())
}

/// Create or complete the about page.
///
/// # Errors
///
/// Returns an error if the connection or update fails.
pub async fn about() -> Result<(), CliError> {
    let store = connect().await?;

    match complete_about(&store).await? {
        AboutMigration::Created => tracing::info!("About page content created"),
        AboutMigration::Filled(fields) => {
            tracing::info!(fields = ?fields, "About page content updated with missing fields");
        }
        AboutMigration::UpToDate => tracing::info!("About page content already complete"),
    }
    Ok(())
}
