pub mod cart;
pub mod credentials;
pub mod crud;
pub mod domain;
pub mod ports;
pub mod search;
pub mod wishlist;

pub use domain::{
    AuthGrant, Category, Destination, Identified, LineItem, LocalUserRecord, NewUser,
    Notification, NotificationKind, Product, ProductDraft, ProductId, Role, SignupForm, User,
    UserId, UserSession, WishlistEntry,
};
pub use ports::{
    KeyValueStore, KeyValueStoreExt, MarketApi, Notifier, PortError, PortResult, RestTransport,
    StorageEvent,
};
