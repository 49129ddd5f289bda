//! services/storefront/src/stores/cart.rs
//!
//! The cart and wishlist store: an in-memory copy of both collections,
//! mirrored to storage on every mutation.

use markethub_core::cart::{self, CartChange};
use markethub_core::domain::{LineItem, Notification, Product, ProductId, WishlistEntry};
use markethub_core::ports::{KeyValueStore, KeyValueStoreExt, Notifier, PortResult};
use markethub_core::wishlist::{self, WishlistChange};
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::keys;

/// Counts shown by navigation badges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BadgeCounts {
    pub cart_lines: usize,
    pub cart_units: u32,
    pub wishlist: usize,
}

#[derive(Default)]
struct Collections {
    items: Vec<LineItem>,
    wishlist: Vec<WishlistEntry>,
}

pub struct CartStore {
    storage: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<Collections>,
}

impl CartStore {
    /// Builds the store from whatever is currently persisted.
    pub fn load(storage: Arc<dyn KeyValueStore>, notifier: Arc<dyn Notifier>) -> Self {
        let state = read_collections(storage.as_ref());
        Self {
            storage,
            notifier,
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-reads both collections from storage, e.g. after another view wrote to it.
    pub fn reload(&self) {
        let mut state = self.lock();
        *state = read_collections(self.storage.as_ref());
    }

    //=====================================================================================
    // Cart
    //=====================================================================================

    /// Adds one unit of `product`. The in-memory cart only changes once the write succeeds.
    pub fn add_to_cart(&self, product: &Product) -> PortResult<CartChange> {
        let mut state = self.lock();
        let mut items = state.items.clone();
        let change = cart::add_product(&mut items, product);
        self.storage.save_json(keys::CART, &items)?;
        state.items = items;
        drop(state);

        let message = match change {
            CartChange::Added => format!("{} added to cart!", product.title),
            CartChange::Incremented { .. } => format!("Increased {} quantity", product.title),
        };
        self.notifier.notify(Notification::success(message));
        Ok(change)
    }

    /// Removes the line for `product_id`. A missing id is a silent no-op returning `false`.
    pub fn remove_from_cart(&self, product_id: ProductId) -> PortResult<bool> {
        let mut state = self.lock();
        let mut items = state.items.clone();
        if !cart::remove_product(&mut items, product_id) {
            debug!(product_id, "Nothing to remove from cart");
            return Ok(false);
        }
        self.storage.save_json(keys::CART, &items)?;
        state.items = items;
        drop(state);

        self.notifier.notify(Notification::error("Item removed from cart"));
        Ok(true)
    }

    pub fn items(&self) -> Vec<LineItem> {
        self.lock().items.clone()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> u32 {
        cart::unit_count(&self.lock().items)
    }

    /// Computed fresh on every call.
    pub fn subtotal(&self) -> f64 {
        cart::subtotal(&self.lock().items)
    }

    //=====================================================================================
    // Wishlist
    //=====================================================================================

    pub fn toggle_wishlist(&self, product: &Product) -> PortResult<WishlistChange> {
        let mut state = self.lock();
        let mut entries = state.wishlist.clone();
        let change = wishlist::toggle(&mut entries, product);
        self.storage.save_json(keys::WISHLIST, &entries)?;
        state.wishlist = entries;
        drop(state);

        let message = match change {
            WishlistChange::Saved => "Saved to Wishlist",
            WishlistChange::Removed => "Removed from Wishlist",
        };
        self.notifier.notify(Notification::info(message));
        Ok(change)
    }

    pub fn wishlist(&self) -> Vec<WishlistEntry> {
        self.lock().wishlist.clone()
    }

    pub fn is_wishlisted(&self, product_id: ProductId) -> bool {
        wishlist::contains(&self.lock().wishlist, product_id)
    }

    pub fn badge_counts(&self) -> BadgeCounts {
        let state = self.lock();
        BadgeCounts {
            cart_lines: state.items.len(),
            cart_units: cart::unit_count(&state.items),
            wishlist: state.wishlist.len(),
        }
    }
}

fn read_collections(storage: &dyn KeyValueStore) -> Collections {
    Collections {
        items: cart::normalize(read_list(storage, keys::CART)),
        wishlist: wishlist::normalize(read_list(storage, keys::WISHLIST)),
    }
}

// Unreadable data starts the collection over rather than blocking the view.
fn read_list<T: DeserializeOwned>(storage: &dyn KeyValueStore, key: &str) -> Vec<T> {
    match storage.load_json::<Vec<T>>(key) {
        Ok(list) => list.unwrap_or_default(),
        Err(e) => {
            warn!("Discarding unreadable {}: {}", key, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MemoryStore, ToastNotifier};
    use markethub_core::domain::NotificationKind;

    fn product(id: ProductId, title: &str, price: f64) -> Product {
        Product {
            id,
            title: title.to_string(),
            description: String::new(),
            price,
            category: "groceries".to_string(),
            thumbnail: String::new(),
            rating: 4.0,
            stock: 10,
            brand: None,
        }
    }

    fn store() -> (Arc<MemoryStore>, ToastNotifier, CartStore) {
        let storage = Arc::new(MemoryStore::new());
        let toasts = ToastNotifier::new();
        let cart = CartStore::load(storage.clone(), Arc::new(toasts.clone()));
        (storage, toasts, cart)
    }

    #[test]
    fn repeat_add_increments_and_persists() {
        let (storage, toasts, cart) = store();
        let mut feed = toasts.subscribe();
        let apple = product(1, "Apple", 1.99);

        cart.add_to_cart(&apple).unwrap();
        cart.add_to_cart(&apple).unwrap();

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);

        let persisted: Vec<LineItem> = storage.load_json(keys::CART).unwrap().unwrap();
        assert_eq!(persisted, items);

        assert_eq!(feed.try_recv().unwrap().message, "Apple added to cart!");
        assert_eq!(feed.try_recv().unwrap().message, "Increased Apple quantity");
    }

    #[test]
    fn removing_unknown_id_is_silent() {
        let (_storage, toasts, cart) = store();
        cart.add_to_cart(&product(1, "Apple", 1.99)).unwrap();
        let mut feed = toasts.subscribe();

        assert!(!cart.remove_from_cart(42).unwrap());
        assert_eq!(cart.items().len(), 1);
        assert!(feed.try_recv().is_err());

        assert!(cart.remove_from_cart(1).unwrap());
        assert!(cart.items().is_empty());
        assert_eq!(feed.try_recv().unwrap().kind, NotificationKind::Error);
    }

    #[test]
    fn wishlist_toggle_leaves_cart_alone() {
        let (_storage, _toasts, cart) = store();
        let beef = product(2, "Beef Steak", 12.99);
        cart.add_to_cart(&beef).unwrap();

        assert_eq!(cart.toggle_wishlist(&beef).unwrap(), WishlistChange::Saved);
        assert!(cart.is_wishlisted(2));
        assert_eq!(cart.toggle_wishlist(&beef).unwrap(), WishlistChange::Removed);
        assert!(!cart.is_wishlisted(2));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn subtotal_reflects_quantities() {
        let (_storage, _toasts, cart) = store();
        cart.add_to_cart(&product(1, "Apple", 2.0)).unwrap();
        cart.add_to_cart(&product(1, "Apple", 2.0)).unwrap();
        cart.add_to_cart(&product(3, "Milk", 3.5)).unwrap();

        assert!((cart.subtotal() - 7.5).abs() < 1e-9);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(
            cart.badge_counts(),
            BadgeCounts { cart_lines: 2, cart_units: 3, wishlist: 0 }
        );
    }

    #[test]
    fn reload_picks_up_external_writes_and_ignores_garbage() {
        let (storage, _toasts, cart) = store();
        let other_view = CartStore::load(storage.clone(), Arc::new(ToastNotifier::new()));
        other_view.add_to_cart(&product(5, "Honey", 6.0)).unwrap();

        assert!(cart.items().is_empty());
        cart.reload();
        assert_eq!(cart.items().len(), 1);

        storage.set(keys::WISHLIST, "{not json").unwrap();
        cart.reload();
        assert!(cart.wishlist().is_empty());
    }
}
