//! Storefront-side types returned by [`super::WordPressClient`].
//!
//! Catalog and cart types come from `pressfront_core`; the types here cover
//! what only the storefront needs (CMS pages, the account area, mutation
//! inputs).

use pressfront_core::{Image, OrderId, OrderStatus, Product, ProductId, VariationId};
use serde::{Deserialize, Serialize};

/// A product with the fields only the product page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    /// Long description (HTML).
    pub description: Option<String>,
    /// Gallery images, excluding the featured image.
    pub gallery: Vec<Image>,
}

/// A CMS page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub id: i64,
    pub title: String,
    /// Rendered content (HTML).
    pub content: String,
    pub uri: String,
}

/// The logged-in WordPress user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Viewer {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
}

/// One row of the order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub number: String,
    pub date: Option<String>,
    pub status: Option<OrderStatus>,
    /// Formatted total as reported by WooCommerce.
    pub total: String,
}

/// Account area data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub viewer: Viewer,
    pub orders: Vec<OrderSummary>,
}

/// Input for adding a product to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AddToCartInput {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub variation_id: Option<VariationId>,
}

const fn default_quantity() -> u32 {
    1
}

/// New quantity for one cart line. A quantity of zero removes the line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CartLineUpdate {
    pub key: String,
    pub quantity: u32,
}

/// A response value together with the refreshed WooCommerce session.
#[derive(Debug, Clone)]
pub struct WithSession<T> {
    pub value: T,
    /// `Session <token>` header value, when WooGraphQL issued one.
    pub session: Option<String>,
}

impl<T> WithSession<T> {
    /// Transform the value, keeping the session.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WithSession<U> {
        WithSession {
            value: f(self.value),
            session: self.session,
        }
    }
}
