//! Core types for Pressfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;
pub mod status;

pub use cart::{Cart, CartItem, CartTotals};
pub use id::*;
pub use price::{CurrencyCode, Price, PriceError, is_price_range, parse_lowest_price};
pub use product::{Category, Image, Product};
pub use status::OrderStatus;
