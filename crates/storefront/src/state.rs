//! Application state shared across handlers.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::config::StorefrontConfig;
use crate::search::SearchClient;
use crate::wordpress::WordPressClient;

/// Error creating the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds configuration, the WordPress client,
/// the search client, the shared HTTP client used by the proxy routes and
/// the per-session [`CartStore`].
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    http: reqwest::Client,
    wordpress: WordPressClient,
    search: SearchClient,
    carts: CartStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let http = reqwest::Client::builder()
            .timeout(config.wordpress.timeout)
            .user_agent(concat!("pressfront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let wordpress = WordPressClient::new(&config.wordpress, http.clone());
        let search = SearchClient::from_config(config.algolia.as_ref(), http.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                http,
                wordpress,
                search,
                carts: CartStore::new(),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the shared HTTP client.
    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// Get a reference to the WordPress GraphQL client.
    #[must_use]
    pub fn wordpress(&self) -> &WordPressClient {
        &self.inner.wordpress
    }

    /// Get a reference to the product search client.
    #[must_use]
    pub fn search(&self) -> &SearchClient {
        &self.inner.search
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn carts(&self) -> &CartStore {
        &self.inner.carts
    }
}
