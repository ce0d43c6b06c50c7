//! Cache types for WordPress responses.

use std::sync::Arc;

use pressfront_core::Product;

use super::types::{Page, ProductDetail};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<Vec<Product>>),
    Product(Box<ProductDetail>),
    Page(Box<Page>),
}

pub fn products_key() -> String {
    "products:all".to_string()
}

pub fn product_key(slug: &str) -> String {
    format!("product:{slug}")
}

pub fn page_key(uri: &str) -> String {
    format!("page:{uri}")
}
