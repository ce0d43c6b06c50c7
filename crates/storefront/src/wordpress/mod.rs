//! WordPress (WPGraphQL + WooGraphQL) client.
//!
//! # Architecture
//!
//! - Operations in [`queries`] are generated by `graphql_client` from the
//!   documents under `graphql/queries/` and converted to `pressfront_core`
//!   types in `conversions`
//! - HTTP goes through `reqwest` 0.13 directly; `graphql_client` only does codegen
//! - WordPress is the source of truth; nothing is synced locally
//! - Catalog data and CMS pages are cached in `moka` for 5 minutes
//! - Cart calls are never cached and carry the browser's credentials
//!
//! # Example
//!
//! ```rust,ignore
//! use pressfront_storefront::wordpress::WordPressClient;
//!
//! let client = WordPressClient::new(&config.wordpress, http.clone());
//! let products = client.get_products().await?;
//! let cart = client.get_cart(&credentials).await?;
//! ```

mod cache;
mod client;
mod conversions;
pub mod queries;
pub mod types;

pub use client::WordPressClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to WordPress.
#[derive(Debug, Error)]
pub enum WordPressError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL response carried errors and no data.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend replied with something that is not JSON.
    #[error("WordPress returned a non-JSON response (HTTP {status})")]
    InvalidResponse { status: u16, snippet: String },
}

/// A GraphQL error returned by WPGraphQL.
#[derive(Debug, Clone, Default)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

impl GraphQLError {
    /// An error with only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

impl From<graphql_client::Error> for GraphQLError {
    fn from(error: graphql_client::Error) -> Self {
        Self {
            message: error.message,
            locations: error.locations.map_or_else(Vec::new, |locs| {
                locs.into_iter()
                    .map(|l| GraphQLErrorLocation {
                        line: i64::from(l.line),
                        column: i64::from(l.column),
                    })
                    .collect()
            }),
            path: error.path.map_or_else(Vec::new, |p| {
                p.into_iter()
                    .map(|fragment| match fragment {
                        graphql_client::PathFragment::Key(s) => serde_json::Value::String(s),
                        graphql_client::PathFragment::Index(i) => {
                            serde_json::Value::Number(i.into())
                        }
                    })
                    .collect()
            }),
        }
    }
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

pub(crate) fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}
