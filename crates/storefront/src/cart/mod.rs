//! Server-side cart state.
//!
//! [`CartStore`] holds the latest cart snapshot per browser session. It is
//! created once at startup and shared through `AppState`; handlers never
//! reach for a global. Every write replaces the whole snapshot.

pub mod sync;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use pressfront_core::Cart;

pub use sync::{cart_credentials, cart_sync_middleware, store_mutation_result, sync_cart};

/// Idle time after which a session's cart snapshot is dropped.
const CART_IDLE: Duration = Duration::from_secs(24 * 60 * 60);

/// Maximum number of carts held in memory.
const MAX_CARTS: u64 = 10_000;

/// Cart snapshots keyed by storefront session.
#[derive(Clone)]
pub struct CartStore {
    carts: Cache<String, Arc<Cart>>,
}

impl CartStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            carts: Cache::builder()
                .max_capacity(MAX_CARTS)
                .time_to_idle(CART_IDLE)
                .build(),
        }
    }

    /// Overwrite the snapshot for `key`.
    pub async fn replace(&self, key: &str, cart: Cart) {
        self.carts.insert(key.to_string(), Arc::new(cart)).await;
    }

    /// Current snapshot for `key`; an unknown key reads as an empty cart.
    pub async fn get(&self, key: &str) -> Arc<Cart> {
        self.carts.get(key).await.unwrap_or_default()
    }

    /// Drop the snapshot for `key`.
    pub async fn clear(&self, key: &str) {
        self.carts.invalidate(key).await;
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}
