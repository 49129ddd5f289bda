//! services/storefront/src/keys.rs
//!
//! The fixed storage namespace shared by every store.

pub const CART: &str = "marketHub_cart";
pub const WISHLIST: &str = "marketHub_wishlist";
/// The current session record.
pub const SESSION: &str = "user";
/// The raw bearer token, stored unquoted.
pub const TOKEN: &str = "token";
pub const LOCAL_USERS: &str = "marketHub_users";
pub const LOCAL_PRODUCTS: &str = "marketHub_products";
/// The last successful remote product listing.
pub const PRODUCTS_CACHE: &str = "marketHub_products_cache";
