//! Algolia REST search client.

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::config::AlgoliaConfig;

use super::{SearchError, SearchHit, SearchResults};

/// Client for a single Algolia index.
#[derive(Clone)]
pub struct AlgoliaClient {
    http: reqwest::Client,
    query_url: String,
    app_id: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    hits: Vec<RawHit>,
    #[serde(default)]
    nb_hits: usize,
}

/// Hit shape shared by WooCommerce Algolia integrations. Field names vary
/// between plugins, hence the aliases.
#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "objectID")]
    object_id: String,
    #[serde(alias = "name", alias = "post_title", default)]
    title: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(alias = "permalink", default)]
    url: Option<String>,
    #[serde(default)]
    price: Option<Value>,
    #[serde(alias = "image_url", alias = "thumbnail", default)]
    image: Option<String>,
}

impl RawHit {
    fn into_hit(self) -> Option<SearchHit> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;
        let url = match (self.slug, self.url) {
            (Some(slug), _) if !slug.is_empty() => format!("/products/{slug}"),
            (_, Some(url)) => url,
            _ => return None,
        };
        let price = self.price.and_then(|p| match p {
            Value::String(s) if !s.is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        Some(SearchHit {
            id: self.object_id,
            title,
            url,
            price,
            image_url: self.image,
        })
    }
}

impl AlgoliaClient {
    /// Create a client for the configured index.
    #[must_use]
    pub fn new(config: &AlgoliaConfig, http: reqwest::Client) -> Self {
        let host = format!("https://{}-dsn.algolia.net", config.app_id.to_lowercase());
        Self::with_host(config, http, &host)
    }

    /// Create a client against a specific host (used for tests and proxies).
    #[must_use]
    pub fn with_host(config: &AlgoliaConfig, http: reqwest::Client, host: &str) -> Self {
        Self {
            http,
            query_url: format!(
                "{}/1/indexes/{}/query",
                host.trim_end_matches('/'),
                config.index_name
            ),
            app_id: config.app_id.clone(),
            api_key: config.search_key.expose_secret().to_string(),
        }
    }

    /// Query the index.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, limit: usize) -> Result<SearchResults, SearchError> {
        let response = self
            .http
            .post(&self.query_url)
            .header("X-Algolia-Application-Id", &self.app_id)
            .header("X-Algolia-API-Key", &self.api_key)
            .json(&json!({ "query": query, "hitsPerPage": limit }))
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        let parsed: QueryResponse = serde_json::from_slice(&body)?;
        debug!(hits = parsed.hits.len(), total = parsed.nb_hits, "Algolia query");

        Ok(SearchResults {
            query: query.to_string(),
            hits: parsed.hits.into_iter().filter_map(RawHit::into_hit).collect(),
            total: parsed.nb_hits,
        })
    }
}
