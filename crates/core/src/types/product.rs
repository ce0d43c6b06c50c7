//! Catalog product model.
//!
//! Products are read-only on the storefront: they are sourced from
//! WooCommerce and never mutated locally.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::parse_lowest_price;

/// Product or category image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

/// Product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category slug, used as the filter key.
    pub slug: String,
    /// Display name.
    pub name: String,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Numeric WooCommerce id. Higher ids are newer products.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// URL slug.
    pub slug: String,
    /// Active price as formatted by WooCommerce; may be a range.
    pub price: Option<String>,
    /// Regular (non-sale) price.
    pub regular_price: Option<String>,
    /// Sale price, when on sale.
    pub sale_price: Option<String>,
    /// Whether the product is currently on sale.
    pub on_sale: bool,
    /// Assigned categories.
    pub categories: Vec<Category>,
    /// Values of the size attribute (`pa_size`).
    pub sizes: Vec<String>,
    /// Values of the color attribute (`pa_color`).
    pub colors: Vec<String>,
    /// Featured image.
    pub image: Option<Image>,
    /// Short description (HTML).
    pub short_description: Option<String>,
}

impl Product {
    /// The first non-empty price field, in order `price`, `sale_price`, `regular_price`.
    #[must_use]
    pub fn resolvable_price(&self) -> Option<&str> {
        [&self.price, &self.sale_price, &self.regular_price]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .map(str::trim)
            .find(|p| !p.is_empty())
    }

    /// Lowest parsed price, or `None` when no price field resolves to an amount.
    #[must_use]
    pub fn lowest_price(&self) -> Option<Decimal> {
        self.resolvable_price()
            .and_then(|raw| parse_lowest_price(raw).ok())
    }

    /// Whether the product belongs to the category with the given slug.
    #[must_use]
    pub fn in_category(&self, slug: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.slug.eq_ignore_ascii_case(slug))
    }
}
