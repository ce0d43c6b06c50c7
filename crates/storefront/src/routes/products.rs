//! Catalog route handlers.
//!
//! The shop listing is derived on every request from the cached product list
//! and the query string, so a listing URL always reproduces the same view.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, RawQuery, State},
    response::{IntoResponse, Response},
};
use pressfront_core::filter::{self, Exclusion, FilterOutcome, FilterState, SortKey};
use pressfront_core::Product;
use tower_sessions::Session;
use tracing::{debug, instrument, warn};

use crate::routes::pages;
use crate::routes::view::{FacetView, ImageView, PageContext, ProductCardView};
use crate::state::AppState;
use crate::wordpress::{ProductDetail, WordPressError};

/// Sort dropdown option.
#[derive(Clone)]
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn sort_options(current: SortKey) -> Vec<SortOption> {
    SortKey::ALL
        .iter()
        .map(|key| SortOption {
            value: key.as_str(),
            label: match key {
                SortKey::Popular => "Most popular",
                SortKey::PriceLow => "Price: low to high",
                SortKey::PriceHigh => "Price: high to low",
                SortKey::Newest => "Newest",
            },
            selected: *key == current,
        })
        .collect()
}

/// Shop listing template.
#[derive(Template, WebTemplate)]
#[template(path = "shop.html")]
pub struct ShopTemplate {
    pub page: PageContext,
    pub products: Vec<ProductCardView>,
    pub categories: Vec<FacetView>,
    pub sizes: Vec<FacetView>,
    pub colors: Vec<FacetView>,
    pub sort_options: Vec<SortOption>,
    pub min_price: String,
    pub max_price: String,
    /// Cheapest and dearest listed prices, used as input placeholders.
    pub price_floor: String,
    pub price_ceiling: String,
    pub narrowed: bool,
    /// Shown above the grid when the filters or the catalog could not be used.
    pub notice: Option<String>,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub page: PageContext,
    pub product: ProductDetailView,
}

/// Product detail display data.
#[derive(Clone)]
pub struct ProductDetailView {
    pub card: ProductCardView,
    /// Description HTML from WordPress.
    pub description: String,
    pub gallery: Vec<ImageView>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub purchasable: bool,
}

impl From<&ProductDetail> for ProductDetailView {
    fn from(detail: &ProductDetail) -> Self {
        let product = &detail.product;
        let amount = product.lowest_price();
        let mut card = ProductCardView::new(product, amount.unwrap_or_default());
        if amount.is_none() {
            card.price = "Price unavailable".to_string();
        }

        Self {
            card,
            description: detail
                .description
                .clone()
                .or_else(|| product.short_description.clone())
                .unwrap_or_default(),
            gallery: detail
                .gallery
                .iter()
                .map(|i| ImageView {
                    url: i.url.clone(),
                    alt: i.alt_text.clone().unwrap_or_else(|| product.name.clone()),
                })
                .collect(),
            sizes: product.sizes.clone(),
            colors: product.colors.clone(),
            purchasable: amount.is_some(),
        }
    }
}

/// Parse the listing selections from a raw query string.
///
/// # Errors
///
/// Returns the filter error for malformed sort keys or price bounds.
pub fn filter_state(query: Option<&str>) -> Result<FilterState, filter::FilterError> {
    let query = query.unwrap_or_default();
    FilterState::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
}

/// Run the listing pipeline, logging exclusions in development builds.
pub fn run_filter(state: &AppState, products: &[Product], selections: &FilterState) -> FilterOutcome {
    let outcome = filter::apply(products, selections);
    if state.config().environment.is_development() && !outcome.excluded.is_empty() {
        for exclusion in &outcome.excluded {
            match exclusion {
                Exclusion::MissingPrice { id } => {
                    debug!(product_id = %id, "Product excluded: no price");
                }
                Exclusion::UnparseablePrice { id, raw } => {
                    debug!(product_id = %id, raw = %raw, "Product excluded: unparseable price");
                }
            }
        }
    }
    outcome
}

/// Display the shop listing (`/` and `/shop`).
#[instrument(skip(state, session, query))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RawQuery(query): RawQuery,
) -> Response {
    let page = PageContext::load(&state, &session, "Shop").await;

    let (selections, mut notice) = match filter_state(query.as_deref()) {
        Ok(selections) => (selections, None),
        Err(e) => {
            debug!(error = %e, "Ignoring invalid listing filters");
            (FilterState::default(), Some(format!("Filters ignored: {e}")))
        }
    };

    let products = match state.wordpress().get_products().await {
        Ok(products) => products,
        Err(e) => {
            warn!(error = %e, "Failed to load products");
            notice = Some("Products are temporarily unavailable.".to_string());
            std::sync::Arc::default()
        }
    };

    let outcome = run_filter(&state, &products, &selections);
    let facets = filter::facets(&products);
    let range = selections.price_range;

    ShopTemplate {
        page,
        products: outcome
            .products
            .iter()
            .map(ProductCardView::from_listing)
            .collect(),
        categories: FacetView::list(&facets.categories, |slug| {
            selections.categories.get(slug).copied().unwrap_or(false)
        }),
        sizes: FacetView::list(&facets.sizes, |v| {
            selections.sizes.iter().any(|s| s.eq_ignore_ascii_case(v))
        }),
        colors: FacetView::list(&facets.colors, |v| {
            selections.colors.iter().any(|c| c.eq_ignore_ascii_case(v))
        }),
        sort_options: sort_options(selections.sort),
        min_price: range
            .map(|r| r.min())
            .filter(|m| !m.is_zero())
            .map(|m| m.normalize().to_string())
            .unwrap_or_default(),
        max_price: range
            .map(|r| r.max())
            .filter(|m| *m != rust_decimal::Decimal::MAX)
            .map(|m| m.normalize().to_string())
            .unwrap_or_default(),
        price_floor: facets
            .price_bounds
            .map_or_else(|| "Min".to_string(), |b| b.min().floor().to_string()),
        price_ceiling: facets
            .price_bounds
            .map_or_else(|| "Max".to_string(), |b| b.max().ceil().to_string()),
        narrowed: selections.is_narrowing(),
        notice,
    }
    .into_response()
}

/// Display a product page.
#[instrument(skip(state, session), fields(slug = %slug))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> Response {
    match state.wordpress().get_product(&slug).await {
        Ok(detail) => {
            let page = PageContext::load(&state, &session, detail.product.name.clone()).await;
            ProductTemplate {
                page,
                product: ProductDetailView::from(&detail),
            }
            .into_response()
        }
        Err(WordPressError::NotFound(_)) => pages::not_found(&state, &session).await,
        Err(e) => crate::error::AppError::from(e).into_response(),
    }
}
