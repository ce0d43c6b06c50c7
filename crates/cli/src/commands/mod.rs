//! CLI subcommands.

pub mod check;
pub mod products;

use pressfront_core::FilterError;
use pressfront_storefront::config::ConfigError;
use pressfront_storefront::state::StateError;
use pressfront_storefront::wordpress::WordPressError;

/// Errors surfaced by any subcommand.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid filters: {0}")]
    Filter(#[from] FilterError),

    #[error("WordPress error: {0}")]
    WordPress(#[from] WordPressError),

    #[error("{0}")]
    State(#[from] StateError),

    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}
