//! crates/markethub_core/src/wishlist.rs
//!
//! Membership toggling for the wishlist. Entries are unique by product id.

use crate::domain::{Product, ProductId, WishlistEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistChange {
    Saved,
    Removed,
}

/// Flips membership of `product`: saves a snapshot if absent, removes it if present.
pub fn toggle(wishlist: &mut Vec<WishlistEntry>, product: &Product) -> WishlistChange {
    if contains(wishlist, product.id) {
        wishlist.retain(|entry| entry.id != product.id);
        WishlistChange::Removed
    } else {
        wishlist.push(WishlistEntry::from(product));
        WishlistChange::Saved
    }
}

pub fn contains(wishlist: &[WishlistEntry], product_id: ProductId) -> bool {
    wishlist.iter().any(|entry| entry.id == product_id)
}

/// Keeps the first snapshot for each id.
pub fn normalize(wishlist: Vec<WishlistEntry>) -> Vec<WishlistEntry> {
    let mut unique: Vec<WishlistEntry> = Vec::with_capacity(wishlist.len());
    for entry in wishlist {
        if !contains(&unique, entry.id) {
            unique.push(entry);
        }
    }
    unique
}
