//! Shopping cart model.
//!
//! A `Cart` is a snapshot of the WooCommerce session cart. It is rebuilt from
//! server state after every fetch or mutation and replaced wholesale; nothing
//! in this crate merges two carts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{ProductId, VariationId};
use super::product::Image;

/// A single line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// WooCommerce cart item key (used by update/remove mutations).
    pub key: String,
    /// Product id.
    pub product_id: ProductId,
    /// Variation id, for variable products.
    pub variation_id: Option<VariationId>,
    /// Product name at the time of the snapshot.
    pub name: String,
    /// Product slug, for linking back to the product page.
    pub slug: String,
    /// Quantity in the cart.
    pub quantity: u32,
    /// Unit price snapshot.
    pub price: Decimal,
    /// Line subtotal (`price * quantity` as reported by WooCommerce).
    pub subtotal: Decimal,
    /// Product image.
    pub image: Option<Image>,
}

/// Cart totals as reported by WooCommerce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of line subtotals.
    pub subtotal: Decimal,
    /// Total tax.
    pub tax: Decimal,
    /// Shipping total.
    pub shipping: Decimal,
    /// Grand total.
    pub total: Decimal,
}

/// The shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cart {
    /// Line items.
    pub items: Vec<CartItem>,
    /// Total number of units across all lines.
    pub item_count: u32,
    /// Totals.
    pub totals: CartTotals,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a cart from line items, deriving the item count from quantities.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>, totals: CartTotals) -> Self {
        let item_count = items.iter().map(|i| i.quantity).sum();
        Self {
            items,
            item_count,
            totals,
        }
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find a line by its cart item key.
    #[must_use]
    pub fn item(&self, key: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    fn item(key: &str, quantity: u32) -> CartItem {
        CartItem {
            key: key.to_string(),
            product_id: ProductId::new(1),
            variation_id: None,
            name: "Tee".to_string(),
            slug: "tee".to_string(),
            quantity,
            price: dec!(10),
            subtotal: dec!(10) * Decimal::from(quantity),
            image: None,
        }
    }

    #[test]
    fn item_count_sums_quantities() {
        let cart = Cart::from_items(vec![item("a", 2), item("b", 3)], CartTotals::default());
        assert_eq!(cart.item_count, 5);
        assert!(!cart.is_empty());
    }

    #[test]
    fn empty_cart_has_zero_totals() {
        let cart = Cart::empty();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count, 0);
        assert_eq!(cart.totals.total, Decimal::ZERO);
    }

    #[test]
    fn item_lookup_by_key() {
        let cart = Cart::from_items(vec![item("abc", 1)], CartTotals::default());
        assert!(cart.item("abc").is_some());
        assert!(cart.item("missing").is_none());
    }
}
