//! Anar Shop CLI - Seeding, migrations and admin management.
//!
//! # Usage
//!
//! ```bash
//! # Seed an empty database with the default catalog
//! anar-cli seed
//!
//! # Seed from a custom catalog file
//! anar-cli seed --file catalog.yaml
//!
//! # Create the unique indexes the API relies on
//! anar-cli migrate indexes
//!
//! # Create the about page or fill its missing fields
//! anar-cli migrate about
//!
//! # Create an admin user (or promote an existing account)
//! anar-cli admin create -e admin@example.com -n "Admin Name" -p secret123
//! ```
//!
//! # Environment Variables
//!
//! - `MONGODB_URI` - `MongoDB` connection string (required)
//! - `MONGODB_DATABASE` - Database used when the URI names none

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "anar-cli")]
#[command(author, version, about = "Anar Shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed empty collections with catalog data
    Seed {
        /// YAML catalog to load instead of the built-in one
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Create unique indexes
    Indexes,
    /// Create the about page or fill in missing fields
    About,
    /// Run every migration
    All,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin password (at least 6 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Seed { file } => commands::seed::run(file.as_deref()).await?,
        Commands::Migrate { target } => match target {
            MigrateTarget::Indexes => commands::migrate::indexes().await?,
            MigrateTarget::About => commands::migrate::about().await?,
            MigrateTarget::All => {
                commands::migrate::indexes().await?;
                commands::migrate::about().await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => commands::admin::create_user(&email, &name, &password).await?,
        },
    }
    Ok(())
}
