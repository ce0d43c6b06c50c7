//! Product search.
//!
//! Search is delegated to Algolia when `ALGOLIA_APP_ID` and
//! `ALGOLIA_SEARCH_KEY` are configured. Without credentials the client is
//! [`SearchClient::Disabled`] and every query returns no hits, so pages that
//! embed search keep rendering.

mod algolia;

pub use algolia::AlgoliaClient;

use serde::Serialize;
use tracing::instrument;

use crate::config::AlgoliaConfig;

/// Default number of hits per query.
pub const DEFAULT_LIMIT: usize = 20;

/// Search client.
#[derive(Clone)]
pub enum SearchClient {
    /// Queries an Algolia index.
    Algolia(AlgoliaClient),
    /// No search backend configured.
    Disabled,
}

impl SearchClient {
    /// Build a client from optional Algolia configuration.
    #[must_use]
    pub fn from_config(config: Option<&AlgoliaConfig>, http: reqwest::Client) -> Self {
        config.map_or(Self::Disabled, |config| {
            Self::Algolia(AlgoliaClient::new(config, http))
        })
    }

    /// Whether a search backend is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::Algolia(_))
    }

    /// Run a query. Blank queries and the disabled client return no hits.
    ///
    /// # Errors
    ///
    /// Returns an error if the search backend request fails.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, limit: usize) -> Result<SearchResults, SearchError> {
        let query = query.trim();
        match self {
            Self::Algolia(client) if !query.is_empty() => client.search(query, limit).await,
            _ => Ok(SearchResults::empty(query)),
        }
    }
}

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    /// Storefront path or absolute URL to link to.
    pub url: String,
    pub price: Option<String>,
    pub image_url: Option<String>,
}

/// Search results for a query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub hits: Vec<SearchHit>,
    /// Total matches reported by the backend (may exceed `hits.len()`).
    pub total: usize,
}

impl SearchResults {
    /// No hits for `query`.
    #[must_use]
    pub fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..Self::default()
        }
    }
}

/// Search errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Search response parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_client_returns_no_hits() {
        let client = SearchClient::from_config(None, reqwest::Client::new());
        assert!(!client.is_enabled());

        let results = client.search("hoodie", DEFAULT_LIMIT).await.unwrap();
        assert_eq!(results, SearchResults::empty("hoodie"));
    }
}
