//! Pressfront Core - Shared types and catalog logic.
//!
//! This crate provides the types and pure functions used across Pressfront:
//! - `storefront` - Server-rendered storefront and WordPress proxy
//! - `cli` - Command-line tools for inspecting the catalog
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no logging. This keeps it lightweight and easy to test.
//!
//! # Modules
//!
//! - [`types`] - Ids, prices, products, carts and order statuses
//! - [`filter`] - Listing filter/sort pipeline and facet counts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod filter;
pub mod types;

pub use filter::{FilterError, FilterOutcome, FilterState, PriceRange, SortKey};
pub use types::*;
