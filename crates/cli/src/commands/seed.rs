//! Seed an empty database with catalog data.
//!
//! Every collection is seeded independently and only when it holds no
//! documents, so running the command twice is harmless.

use serde::Deserialize;

use anar_shop_api::db::{AboutRepository, CategoryRepository, ProductRepository, UserRepository};
use anar_shop_api::services::auth::hash_password;
use anar_shop_api::store::DocumentStore;
use anar_shop_core::models::{CreateCategoryRequest, CreateProductRequest, SignupRequest};
use anar_shop_core::Role;

use super::{CliError, connect};

/// Catalog shipped with the binary.
const DEFAULT_CATALOG: &str = include_str!("../../seed/catalog.yaml");

const fn default_active() -> bool {
    true
}

/// A category entry in a seed file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedCategory {
    #[serde(flatten)]
    pub category: CreateCategoryRequest,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// A user entry in a seed file. Passwords are plaintext and hashed on load.
#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

/// Contents of a seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedCatalog {
    pub categories: Vec<SeedCategory>,
    pub products: Vec<CreateProductRequest>,
    pub users: Vec<SeedUser>,
}

impl SeedCatalog {
    /// Parse a YAML catalog.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Yaml` if the document does not describe a catalog.
    pub fn from_yaml(yaml: &str) -> Result<Self, CliError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// The catalog embedded in the binary.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Yaml` if the embedded file is malformed.
    pub fn builtin() -> Result<Self, CliError> {
        Self::from_yaml(DEFAULT_CATALOG)
    }
}

/// Documents written by [`seed_catalog`]. `None` means the collection was
/// already populated and left alone.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: Option<usize>,
    pub products: Option<usize>,
    pub users: Option<usize>,
    pub about_created: bool,
}

/// Write `catalog` into every empty collection.
///
/// Entries are validated the same way API requests are, so a seed file
/// cannot store anything the API would refuse.
///
/// # Errors
///
/// Returns `CliError::Validation` for an invalid entry and
/// `CliError::Store` if a write fails.
pub async fn seed_catalog(
    store: &dyn DocumentStore,
    catalog: SeedCatalog,
) -> Result<SeedReport, CliError> {
    let mut report = SeedReport::default();

    let categories = CategoryRepository::new(store);
    if categories.count().await? == 0 {
        for entry in &catalog.categories {
            let category = entry.category.clone().validate()?;
            categories.create_with_status(category, entry.is_active).await?;
        }
        report.categories = Some(catalog.categories.len());
    }

    let products = ProductRepository::new(store);
    if products.count().await? == 0 {
        let count = catalog.products.len();
        for request in catalog.products {
            products.create(request.validate()?).await?;
        }
        report.products = Some(count);
    }

    let users = UserRepository::new(store);
    if users.count().await? == 0 {
        let count = catalog.users.len();
        for entry in catalog.users {
            let new_user = SignupRequest {
                name: Some(entry.name),
                email: Some(entry.email),
                password: Some(entry.password),
            }
            .validate()?;
            let password_hash = hash_password(&new_user.password)?;
            users
                .create_with_password(&new_user.name, &new_user.email, &password_hash, entry.role)
                .await?;
        }
        report.users = Some(count);
    }

    let about = AboutRepository::new(store);
    if about.find().await?.is_none() {
        about.create(Default::default()).await?;
        report.about_created = true;
    }

    Ok(report)
}

/// Seed the configured database from `file`, or the built-in catalog.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or seeding fails.
pub async fn run(file: Option<&str>) -> Result<(), CliError> {
    let catalog = match file {
        Some(path) => {
            let yaml = std::fs::read_to_string(path).map_err(|source| CliError::Io {
                path: path.to_owned(),
                source,
            })?;
            SeedCatalog::from_yaml(&yaml)?
        }
        None => SeedCatalog::builtin()?,
    };

    let store = connect().await?;
    let report = seed_catalog(&store, catalog).await?;

    log_collection("categories", report.categories);
    log_collection("products", report.products);
    log_collection("users", report.users);
    if report.about_created {
        tracing::info!("Seeded about page content");
    }

    tracing::info!("Seeding complete!");
    Ok(())
}

fn log_collection(name: &str, seeded: Option<usize>) {
    match seeded {
        Some(count) => tracing::info!("Seeded {count} {name}"),
        None => tracing::info!("{name} already present, skipping"),
    }
}
