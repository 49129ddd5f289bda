//! crates/markethub_core/src/domain.rs
//!
//! Defines the core data structures for the storefront.
//! The serde shapes follow the demo API and the persisted browser-storage
//! records, so the same types are used on the wire and at rest.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

pub type ProductId = u64;
pub type UserId = u64;

/// Thumbnail used for products created without one.
pub const PLACEHOLDER_THUMBNAIL: &str = "https://via.placeholder.com/150";

/// Anything listed by a numeric id, so CRUD mirrors can replace or drop it.
pub trait Identified {
    fn id(&self) -> u64;
}

//=========================================================================================
// Catalog
//=========================================================================================

/// A product as returned by the demo API or added locally from the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl Identified for Product {
    fn id(&self) -> u64 {
        self.id
    }
}

/// The dashboard's "new product" form before defaults are filled in.
#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
    pub title: String,
    pub price: f64,
    pub description: Option<String>,
    pub category: Option<String>,
    pub thumbnail: Option<String>,
}

impl ProductDraft {
    /// Fills the dashboard defaults and assigns the given id.
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            title: self.title.trim().to_string(),
            description: non_empty_or(self.description, "No description provided"),
            price: self.price,
            category: non_empty_or(self.category, "electronics"),
            thumbnail: non_empty_or(self.thumbnail, PLACEHOLDER_THUMBNAIL),
            rating: 5.0,
            stock: 10,
            brand: None,
        }
    }
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// A product category managed from the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub count: u32,
}

impl Identified for Category {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Category {
    /// The categories the admin dashboard starts with.
    pub fn defaults() -> Vec<Category> {
        [
            (1, "Electronics", "Electronic devices and accessories"),
            (2, "Furniture", "Office and home furniture"),
            (3, "Stationery", "Office supplies and stationery"),
        ]
        .into_iter()
        .map(|(id, name, description)| Category {
            id,
            name: name.to_string(),
            description: description.to_string(),
            count: 1,
        })
        .collect()
    }
}

//=========================================================================================
// Cart and Wishlist
//=========================================================================================

/// A cart entry. Unique by `product_id`; `quantity` is never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    pub title: String,
    pub price: f64,
    #[serde(rename = "thumbnail", default)]
    pub thumbnail_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub quantity: u32,
}

impl LineItem {
    /// A fresh line for a product added for the first time.
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id,
            title: product.title.clone(),
            price: product.price,
            thumbnail_url: product.thumbnail.clone(),
            category: Some(product.category.clone()).filter(|c| !c.is_empty()),
            quantity: 1,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// A saved product snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub description: String,
}

impl From<&Product> for WishlistEntry {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            price: product.price,
            thumbnail: product.thumbnail.clone(),
            category: product.category.clone(),
            rating: product.rating,
            description: product.description.clone(),
        }
    }
}

//=========================================================================================
// Users and Sessions
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl From<String> for Role {
    // Anything that is not "admin" (including the API's "moderator") is a plain user.
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::User => "user".to_string(),
            Role::Admin => "admin".to_string(),
        }
    }
}

impl Role {
    /// Where a freshly logged-in user of this role is sent.
    pub fn destination(self) -> Destination {
        match self {
            Role::Admin => Destination::AdminDashboard,
            Role::User => Destination::UserDashboard,
        }
    }
}

/// The view a successful login navigates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    AdminDashboard,
    UserDashboard,
}

impl Destination {
    pub fn path(self) -> &'static str {
        match self {
            Destination::AdminDashboard => "/admin",
            Destination::UserDashboard => "/dashboard",
        }
    }
}

/// A user as listed by the demo API's `/users` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub image: String,
}

impl Identified for User {
    fn id(&self) -> u64 {
        self.id
    }
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The client's record of who is logged in. At most one exists at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub role: Role,
    #[serde(rename = "image", default)]
    pub image_url: String,
    pub token: String,
}

/// A successful remote credential check.
///
/// The demo API's login reply usually omits the role; it is looked up separately.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthGrant {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(alias = "token")]
    pub access_token: String,
}

impl AuthGrant {
    pub fn into_session(self, role: Role) -> UserSession {
        UserSession {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            username: self.username,
            role,
            image_url: self.image,
            token: self.access_token,
        }
    }
}

/// A user registered on this client. The password is kept only as a hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalUserRecord {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    #[serde(rename = "image", default)]
    pub image_url: String,
}

impl LocalUserRecord {
    /// Builds a session for this record with the given token.
    pub fn to_session(&self, token: String) -> UserSession {
        UserSession {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
            role: self.role,
            image_url: self.image_url.clone(),
            token,
        }
    }
}

/// The signup form.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Falls back to the local part of the email when empty.
    pub username: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

/// The payload sent to the demo API's `/users/add`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Avatar given to users registered on this client.
pub fn placeholder_avatar(username: &str) -> String {
    format!("https://dummyjson.com/icon/{}/128", username)
}

//=========================================================================================
// Notifications
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// A transient, user-facing message emitted after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Error, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Info, message: message.into() }
    }
}

//=========================================================================================
// Id generation
//=========================================================================================

static LAST_LOCAL_ID: AtomicU64 = AtomicU64::new(0);

/// Returns a millisecond-timestamp id, bumped so that two calls never collide.
pub fn next_local_id() -> u64 {
    let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    let mut last = LAST_LOCAL_ID.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_LOCAL_ID.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(current) => last = current,
        }
    }
}
