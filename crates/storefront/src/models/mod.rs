//! Session-scoped storefront models.

pub mod session;

pub use session::keys as session_keys;
pub use session::{
    cart_key, is_local_path, return_to, set_return_to, store_woo_session, stored_woo_session,
};
