//! Configuration and connectivity check.
//!
//! Loads the storefront configuration exactly as the server does, then runs
//! a trivial GraphQL query against WordPress.
//!
//! # Usage
//!
//! ```bash
//! pf-cli check
//! ```

use pressfront_storefront::config::StorefrontConfig;
use pressfront_storefront::state::AppState;

use super::CommandError;

/// Verify configuration and WordPress reachability.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or WordPress does not
/// answer with GraphQL JSON.
pub async fn run() -> Result<(), CommandError> {
    let config = StorefrontConfig::from_env()?;
    let state = AppState::new(config)?;
    let config = state.config();

    #[allow(clippy::print_stdout)]
    {
        println!("Storefront:  {} ({:?})", config.base_url, config.environment);
        println!("Listen:      {}", config.socket_addr());
        println!("GraphQL:     {}", config.wordpress.graphql_url);
        println!("BuddyPress:  {}", config.wordpress.buddypress_url());
        println!(
            "Search:      {}",
            if state.search().is_enabled() { "algolia" } else { "disabled" }
        );
        println!(
            "Sentry:      {}",
            if config.sentry_dsn.is_some() { "enabled" } else { "disabled" }
        );
    }

    state.wordpress().ping().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("WordPress GraphQL endpoint is reachable");
    }
    Ok(())
}
