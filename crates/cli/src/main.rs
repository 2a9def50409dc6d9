//! Book Haven CLI - Database migrations and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! bh-cli migrate
//!
//! # Insert sample books into an empty catalog
//! bh-cli seed
//! ```
//!
//! Both commands read the storefront's environment (`VAULT_*`,
//! `BOOK_HAVEN_DB_*`) and connect with a Vault-issued credential.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bh-cli")]
#[command(author, version, about = "Book Haven CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog with sample books (only if empty)
    Seed,
}

#[tokio::main]
async fn main() {
    // Load .env before tracing so RUST_LOG from the file applies
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::books().await?,
    }
    Ok(())
}
