//! Catalog listing command.
//!
//! Runs the same filter pipeline as the shop page, so the output matches
//! what a shopper would see for the equivalent query string.
//!
//! # Usage
//!
//! ```bash
//! pf-cli products --sort newest
//! pf-cli products --category shirts --category hoodies --min-price 20
//! pf-cli products --json > products.json
//! ```
//!
//! # Environment Variables
//!
//! - `WORDPRESS_URL` - WordPress base URL (overridden by `--wordpress-url`)
//! - `WORDPRESS_GRAPHQL_URL` - GraphQL endpoint, when not `<base>/graphql`
//!   (overridden by `--graphql-url`)

use clap::Args;
use pressfront_core::filter::{self, Exclusion, FilterOutcome, FilterState};
use pressfront_core::{CurrencyCode, Price};
use pressfront_storefront::config::WordPressConfig;
use pressfront_storefront::wordpress::WordPressClient;

use super::CommandError;

/// Arguments for `pf-cli products`.
#[derive(Debug, Args)]
pub struct ProductsArgs {
    /// WordPress base URL
    #[arg(long, env = "WORDPRESS_URL")]
    pub wordpress_url: String,

    /// GraphQL endpoint (defaults to `<wordpress-url>/graphql`)
    #[arg(long, env = "WORDPRESS_GRAPHQL_URL")]
    pub graphql_url: Option<String>,

    /// Sort order (`popular`, `price-low`, `price-high`, `newest`)
    #[arg(long, default_value = "popular")]
    pub sort: String,

    /// Minimum price (inclusive)
    #[arg(long)]
    pub min_price: Option<String>,

    /// Maximum price (inclusive)
    #[arg(long)]
    pub max_price: Option<String>,

    /// Category slug (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Size (repeatable)
    #[arg(long = "size")]
    pub sizes: Vec<String>,

    /// Color (repeatable)
    #[arg(long = "color")]
    pub colors: Vec<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl ProductsArgs {
    /// WordPress settings for the catalog query.
    fn wordpress_config(&self) -> WordPressConfig {
        let mut config = WordPressConfig::new(&self.wordpress_url);
        if let Some(url) = self.graphql_url.as_deref().filter(|u| !u.trim().is_empty()) {
            config.graphql_url = url.trim().to_string();
        }
        config
    }

    /// Listing selections, parsed exactly like a shop query string.
    fn filter_state(&self) -> Result<FilterState, CommandError> {
        let mut pairs = vec![("sort", self.sort.clone())];
        pairs.extend(self.min_price.iter().map(|v| ("min_price", v.clone())));
        pairs.extend(self.max_price.iter().map(|v| ("max_price", v.clone())));
        pairs.extend(self.categories.iter().map(|v| ("category", v.clone())));
        pairs.extend(self.sizes.iter().map(|v| ("size", v.clone())));
        pairs.extend(self.colors.iter().map(|v| ("color", v.clone())));
        Ok(FilterState::from_pairs(pairs)?)
    }
}

/// Fetch the catalog, filter it and print the result.
///
/// # Errors
///
/// Returns an error for invalid filters or if WordPress cannot be queried.
#[allow(clippy::print_stdout)]
pub async fn run(args: ProductsArgs) -> Result<(), CommandError> {
    let state = args.filter_state()?;
    let client = WordPressClient::new(&args.wordpress_config(), reqwest::Client::new());

    tracing::info!(endpoint = %client.endpoint(), "Fetching products");
    let products = client.get_products().await?;
    let outcome = filter::apply(&products, &state);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", render_table(&outcome));
    }

    for exclusion in &outcome.excluded {
        match exclusion {
            Exclusion::MissingPrice { id } => tracing::warn!(product_id = %id, "No price"),
            Exclusion::UnparseablePrice { id, raw } => {
                tracing::warn!(product_id = %id, raw = %raw, "Unparseable price");
            }
        }
    }

    Ok(())
}

/// Plain-text table of the listing.
fn render_table(outcome: &FilterOutcome) -> String {
    let name_width = outcome
        .products
        .iter()
        .map(|l| l.product.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut out = format!("{:>8}  {:<name_width$}  {:>10}\n", "ID", "NAME", "PRICE");
    for listing in &outcome.products {
        let price = Price::new(listing.parsed_price, CurrencyCode::default());
        out.push_str(&format!(
            "{:>8}  {:<name_width$}  {:>10}\n",
            listing.product.id.as_i64(),
            listing.product.name,
            price.display(),
        ));
    }
    out.push_str(&format!(
        "{} shown, {} excluded for missing or unparseable prices\n",
        outcome.products.len(),
        outcome.excluded.len()
    ));
    out
}
