//! crates/markethub_core/src/cart.rs
//!
//! State transitions over an ordered list of cart line items.

use crate::domain::{LineItem, Product, ProductId};

/// What `add_product` did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    Added,
    Incremented { quantity: u32 },
}

/// Adds one unit of `product`, merging with an existing line for the same id.
pub fn add_product(cart: &mut Vec<LineItem>, product: &Product) -> CartChange {
    match cart.iter_mut().find(|item| item.product_id == product.id) {
        Some(item) => {
            item.quantity = item.quantity.saturating_add(1);
            CartChange::Incremented { quantity: item.quantity }
        }
        None => {
            cart.push(LineItem::from_product(product));
            CartChange::Added
        }
    }
}

/// Drops the line for `product_id`. Returns `false` if there was none.
pub fn remove_product(cart: &mut Vec<LineItem>, product_id: ProductId) -> bool {
    let before = cart.len();
    cart.retain(|item| item.product_id != product_id);
    cart.len() != before
}

/// Σ price × quantity over the cart.
pub fn subtotal(cart: &[LineItem]) -> f64 {
    cart.iter().map(LineItem::line_total).sum()
}

/// Total units across all lines.
pub fn unit_count(cart: &[LineItem]) -> u32 {
    cart.iter().map(|item| item.quantity).sum()
}

/// Repairs a cart read back from storage: zero-quantity lines are dropped and
/// duplicate ids are merged into the first occurrence.
pub fn normalize(cart: Vec<LineItem>) -> Vec<LineItem> {
    let mut merged: Vec<LineItem> = Vec::with_capacity(cart.len());
    for item in cart.into_iter().filter(|item| item.quantity > 0) {
        match merged.iter_mut().find(|m| m.product_id == item.product_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => merged.push(item),
        }
    }
    merged
}
