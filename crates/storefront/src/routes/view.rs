//! Display data shared by page templates.
//!
//! Templates only ever see pre-formatted strings; prices, counts and labels
//! are rendered here so the markup stays logic free.

use pressfront_core::filter::{FacetCount, Listing};
use pressfront_core::{Cart, CartItem, CurrencyCode, Image, Price, Product, is_price_range};
use rust_decimal::Decimal;
use tower_sessions::Session;
use tracing::warn;

use crate::models::cart_key;
use crate::state::AppState;

/// Layout data every full page renders with.
#[derive(Clone)]
pub struct PageContext {
    pub title: String,
    pub cart_count: u32,
    pub search_enabled: bool,
}

impl PageContext {
    /// Build the layout context from the session's stored cart.
    pub async fn load(state: &AppState, session: &Session, title: impl Into<String>) -> Self {
        let cart_count = match cart_key(session).await {
            Ok(key) => state.carts().get(&key).await.item_count,
            Err(e) => {
                warn!(error = %e, "No session available for cart count");
                0
            }
        };

        Self {
            title: title.into(),
            cart_count,
            search_enabled: state.search().is_enabled(),
        }
    }
}

/// Format an amount in the store currency.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    Price::new(amount, CurrencyCode::default()).display()
}

/// Image display data for templates.
#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

impl ImageView {
    fn new(image: &Image, fallback_alt: &str) -> Self {
        Self {
            url: image.url.clone(),
            alt: image
                .alt_text
                .clone()
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| fallback_alt.to_string()),
        }
    }
}

// =============================================================================
// Products
// =============================================================================

/// Product card display data.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: i64,
    pub slug: String,
    pub name: String,
    /// Lowest price, prefixed with "From" for ranged prices.
    pub price: String,
    /// Regular price shown struck through when the product is on sale.
    pub compare_at_price: Option<String>,
    pub image: Option<ImageView>,
}

impl ProductCardView {
    /// Card for a product that passed the listing filter.
    #[must_use]
    pub fn from_listing(listing: &Listing) -> Self {
        Self::new(&listing.product, listing.parsed_price)
    }

    /// Card for `product` priced at `amount`.
    #[must_use]
    pub fn new(product: &Product, amount: Decimal) -> Self {
        let ranged = product
            .resolvable_price()
            .is_some_and(is_price_range);
        let price = if ranged {
            format!("From {}", format_money(amount))
        } else {
            format_money(amount)
        };

        Self {
            id: product.id.as_i64(),
            slug: product.slug.clone(),
            name: product.name.clone(),
            price,
            compare_at_price: compare_at_price(product, amount),
            image: product.image.as_ref().map(|i| ImageView::new(i, &product.name)),
        }
    }
}

fn compare_at_price(product: &Product, amount: Decimal) -> Option<String> {
    if !product.on_sale {
        return None;
    }
    let regular = product
        .regular_price
        .as_deref()
        .and_then(|raw| pressfront_core::parse_lowest_price(raw).ok())?;
    (regular > amount).then(|| format_money(regular))
}

/// One facet checkbox.
#[derive(Clone)]
pub struct FacetView {
    pub value: String,
    pub label: String,
    pub count: usize,
    pub checked: bool,
}

impl FacetView {
    /// Facet options with their checked state taken from `is_checked`.
    pub fn list(counts: &[FacetCount], is_checked: impl Fn(&str) -> bool) -> Vec<Self> {
        counts
            .iter()
            .map(|c| Self {
                value: c.value.clone(),
                label: c.label.clone(),
                count: c.count,
                checked: is_checked(&c.value),
            })
            .collect()
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Cart line display data.
#[derive(Clone)]
pub struct CartItemView {
    pub key: String,
    pub slug: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: Option<ImageView>,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            key: item.key.clone(),
            slug: item.slug.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            price: format_money(item.price),
            line_price: format_money(item.subtotal),
            image: item.image.as_ref().map(|i| ImageView::new(i, &item.name)),
        }
    }
}

/// Cart display data.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u32,
    pub subtotal: String,
    pub total: String,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items.iter().map(CartItemView::from).collect(),
            item_count: cart.item_count,
            subtotal: format_money(cart.totals.subtotal),
            total: format_money(cart.totals.total),
        }
    }
}
