//! crates/markethub_core/src/search.rs
//!
//! Case-insensitive substring filters used by the listing and dashboard views.
//! An empty term matches everything.

use crate::domain::{Category, Product, User};

fn matches(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Filters by title only (the user dashboard's search box).
pub fn products_by_title<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    let term = term.trim().to_lowercase();
    products.iter().filter(|p| matches(&p.title, &term)).collect()
}

/// Filters by title or category (the admin dashboard).
pub fn products<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    let term = term.trim().to_lowercase();
    products
        .iter()
        .filter(|p| matches(&p.title, &term) || matches(&p.category, &term))
        .collect()
}

/// Filters by "first last" or email.
pub fn users<'a>(users: &'a [User], term: &str) -> Vec<&'a User> {
    let term = term.trim().to_lowercase();
    users
        .iter()
        .filter(|u| matches(&u.full_name(), &term) || matches(&u.email, &term))
        .collect()
}

pub fn categories<'a>(categories: &'a [Category], term: &str) -> Vec<&'a Category> {
    let term = term.trim().to_lowercase();
    categories.iter().filter(|c| matches(&c.name, &term)).collect()
}
