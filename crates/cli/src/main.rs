//! Pressfront CLI - Catalog inspection and configuration checks.
//!
//! # Usage
//!
//! ```bash
//! # List products the storefront would show, cheapest first
//! pf-cli products --wordpress-url https://cms.example.com --sort price-low
//!
//! # Only medium red shirts under $50, as JSON
//! pf-cli products --category shirts --size M --color red --max-price 50 --json
//!
//! # Verify storefront configuration and WordPress reachability
//! pf-cli check
//! ```
//!
//! # Commands
//!
//! - `products` - Fetch the catalog and run the listing filter over it
//! - `check` - Load configuration from the environment and ping WPGraphQL

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(author, version, about = "Pressfront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products after filtering and sorting
    Products(commands::products::ProductsArgs),
    /// Check configuration and WordPress connectivity
    Check,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Products(args) => commands::products::run(args).await,
        Commands::Check => commands::check::run().await,
    }
}
