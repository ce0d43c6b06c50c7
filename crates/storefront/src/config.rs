//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `WORDPRESS_URL` - WordPress base URL (e.g., <https://cms.example.com>)
//!
//! ## Optional
//! - `WORDPRESS_GRAPHQL_URL` - GraphQL endpoint (default: `{WORDPRESS_URL}/graphql`)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_ENV` - `development` or `production` (default: production)
//! - `STOREFRONT_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `UPSTREAM_TIMEOUT_SECS` - Timeout for WordPress requests (default: 30)
//! - `COOKIE_DOMAIN` - Domain to expire cookies on during logout
//! - `AUTH_TOKEN_COOKIE` - Cookie carrying the `BuddyPress` bearer token (default: pf-auth-token)
//! - `ALGOLIA_APP_ID` / `ALGOLIA_SEARCH_KEY` - Algolia credentials (search disabled if absent)
//! - `ALGOLIA_INDEX_NAME` - Algolia index (default: products)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sentry sampling (default: 1.0 / 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    /// Whether development-only diagnostics should be emitted.
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_ENV".to_string(),
                format!("expected development or production, got {other}"),
            )),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Deployment environment
    pub environment: Environment,
    /// Log output format
    pub log_format: LogFormat,
    /// WordPress backend configuration
    pub wordpress: WordPressConfig,
    /// Algolia search configuration (`None` disables search)
    pub algolia: Option<AlgoliaConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate
    pub sentry_traces_sample_rate: f32,
}

/// WordPress / WooCommerce backend configuration.
#[derive(Debug, Clone)]
pub struct WordPressConfig {
    /// WordPress base URL without trailing slash
    pub base_url: String,
    /// WPGraphQL endpoint
    pub graphql_url: String,
    /// Timeout applied to every upstream request
    pub timeout: Duration,
    /// Cookie domain used when expiring cookies on logout
    pub cookie_domain: Option<String>,
    /// Cookie that carries a bearer token for `BuddyPress` requests
    pub auth_token_cookie: String,
}

impl WordPressConfig {
    /// Configuration for a WordPress install at `base_url` with default settings.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            graphql_url: format!("{base_url}/graphql"),
            base_url,
            timeout: Duration::from_secs(30),
            cookie_domain: None,
            auth_token_cookie: "pf-auth-token".to_string(),
        }
    }

    /// `BuddyPress` REST API root.
    #[must_use]
    pub fn buddypress_url(&self) -> String {
        format!("{}/wp-json/buddypress/v1", self.base_url)
    }

    /// WordPress logout URL.
    #[must_use]
    pub fn logout_url(&self) -> String {
        format!("{}/wp-login.php?action=logout", self.base_url)
    }

    /// WordPress login URL that returns to `redirect_to` afterwards.
    #[must_use]
    pub fn login_url(&self, redirect_to: &str) -> String {
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("redirect_to", redirect_to)
            .finish();
        format!("{}/wp-login.php?{query}", self.base_url)
    }

    /// WooCommerce checkout page.
    #[must_use]
    pub fn checkout_url(&self) -> String {
        format!("{}/checkout", self.base_url)
    }
}

/// Algolia search configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct AlgoliaConfig {
    /// Application id
    pub app_id: String,
    /// Search-only API key
    pub search_key: SecretString,
    /// Index to query
    pub index_name: String,
}

impl std::fmt::Debug for AlgoliaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgoliaConfig")
            .field("app_id", &self.app_id)
            .field("search_key", &"[REDACTED]")
            .field("index_name", &self.index_name)
            .finish()
    }
}

impl StorefrontConfig {
    /// Configuration with defaults for everything but the two required URLs.
    ///
    /// Used by tools and tests that do not read the environment.
    #[must_use]
    pub fn new(base_url: &str, wordpress: WordPressConfig) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: base_url.trim_end_matches('/').to_string(),
            environment: Environment::default(),
            log_format: LogFormat::default(),
            wordpress,
            algolia: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_url("STOREFRONT_BASE_URL")?;
        let environment = Environment::parse(&get_env_or_default("STOREFRONT_ENV", "production"))?;
        let log_format = match get_env_or_default("STOREFRONT_LOG_FORMAT", "pretty").as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            host,
            port,
            base_url,
            environment,
            log_format,
            wordpress: WordPressConfig::from_env()?,
            algolia: AlgoliaConfig::from_env(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_f32("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_f32("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl WordPressConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_url("WORDPRESS_URL")?;
        let graphql_url = match get_optional_env("WORDPRESS_GRAPHQL_URL") {
            Some(url) => validate_url("WORDPRESS_GRAPHQL_URL", &url)?,
            None => format!("{base_url}/graphql"),
        };
        let timeout_secs = get_env_or_default("UPSTREAM_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("UPSTREAM_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            base_url,
            graphql_url,
            timeout: Duration::from_secs(timeout_secs),
            cookie_domain: get_optional_env("COOKIE_DOMAIN"),
            auth_token_cookie: get_env_or_default("AUTH_TOKEN_COOKIE", "pf-auth-token"),
        })
    }
}

impl AlgoliaConfig {
    /// Algolia is optional: missing credentials disable search instead of failing.
    fn from_env() -> Option<Self> {
        let app_id = get_optional_env("ALGOLIA_APP_ID")?;
        let search_key = get_optional_env("ALGOLIA_SEARCH_KEY")?;
        Some(Self {
            app_id,
            search_key: SecretString::from(search_key),
            index_name: get_env_or_default("ALGOLIA_INDEX_NAME", "products"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_f32(key: &str, default: f32) -> Result<f32, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |v| {
        v.parse::<f32>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Get a required absolute http(s) URL, normalized without a trailing slash.
fn get_url(key: &str) -> Result<String, ConfigError> {
    let value = get_required_env(key)?;
    validate_url(key, &value)
}

fn validate_url(key: &str, value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(value.trim_end_matches('/').to_string())
}
