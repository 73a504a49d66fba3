//! Bazaar CLI - operator tools for the marketplace backend.
//!
//! # Usage
//!
//! ```bash
//! # Grant or revoke the admin flag
//! bazaar admin grant <user-id>
//! bazaar admin revoke <user-id>
//!
//! # Seed categories from YAML (existing slugs are skipped)
//! bazaar categories seed categories.yaml
//!
//! # Set a listing's status
//! bazaar product status <product-id> deleted
//! ```
//!
//! # Environment Variables
//!
//! - `SUPABASE_URL` - Backend project URL
//! - `SUPABASE_SERVICE_ROLE_KEY` - Service role key

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage admin flags
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: CategoriesAction,
    },
    /// Manage listings
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Make a user an admin
    Grant {
        /// User ID (UUID)
        user_id: String,
    },
    /// Remove a user's admin flag
    Revoke {
        /// User ID (UUID)
        user_id: String,
    },
}

#[derive(Subcommand)]
enum CategoriesAction {
    /// Insert categories from a YAML file, skipping existing slugs
    Seed {
        /// Path to the YAML file
        file: String,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Set a listing's status
    Status {
        /// Product ID (UUID)
        id: String,
        /// New status (`active`, `deleted`, `sold`)
        status: String,
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
    let backend = commands::connect()?;

    match cli.command {
        Commands::Admin { action } => match action {
            AdminAction::Grant { user_id } => {
                commands::admin::set_admin(&backend, &user_id, true).await?;
            }
            AdminAction::Revoke { user_id } => {
                commands::admin::set_admin(&backend, &user_id, false).await?;
            }
        },
        Commands::Categories { action } => match action {
            CategoriesAction::Seed { file } => commands::categories::seed(&backend, &file).await?,
        },
        Commands::Product { action } => match action {
            ProductAction::Status { id, status } => {
                commands::product::set_status(&backend, &id, &status).await?;
            }
        },
    }
    Ok(())
}
