//! crates/markethub_core/src/ports.rs
//!
//! Defines the service contracts (traits) the storefront state is built on.
//! Storage, the demo API and the toast surface are all injected through these
//! ports, so stores can be exercised against isolated in-memory instances.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::domain::{AuthGrant, NewUser, Notification, Product, User, UserId};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PortError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Key-Value Storage
//=========================================================================================

/// Emitted by a store after `key` was written or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
}

/// Synchronous string key-value storage, the stand-in for browser local storage.
///
/// Writes are last-writer-wins; nothing guards concurrent writers outside the process.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> PortResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> PortResult<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> PortResult<()>;

    /// Subscribes to change events for every key.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

/// JSON helpers on top of any [`KeyValueStore`].
pub trait KeyValueStoreExt {
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> PortResult<Option<T>>;

    fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> PortResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> PortResult<Option<T>> {
        match self.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| PortError::Storage(format!("{}: {}", key, e))),
            None => Ok(None),
        }
    }

    fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> PortResult<()> {
        let raw = serde_json::to_string(value).map_err(|e| PortError::Storage(e.to_string()))?;
        self.set(key, &raw)
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The user-facing toast surface. Purely cosmetic; never part of a data contract.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// The typed endpoints of the remote product/user demo API.
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// `GET /products`
    async fn fetch_products(&self) -> PortResult<Vec<Product>>;

    /// `GET /users`
    async fn fetch_users(&self) -> PortResult<Vec<User>>;

    /// `GET /users/{id}`
    async fn fetch_user(&self, id: UserId) -> PortResult<User>;

    /// `POST /user/login`. Any failure, including rejected credentials, is an error.
    async fn login(&self, username: &str, password: &str) -> PortResult<AuthGrant>;

    /// `POST /users/add`. The demo API simulates the insert and does not persist it.
    async fn add_user(&self, user: &NewUser) -> PortResult<User>;
}

/// Untyped REST verbs relative to the configured API base URL.
#[async_trait]
pub trait RestTransport: Send + Sync {
    async fn get(&self, path: &str) -> PortResult<Value>;

    async fn post(&self, path: &str, body: &Value) -> PortResult<Value>;

    async fn put(&self, path: &str, body: &Value) -> PortResult<Value>;

    async fn delete(&self, path: &str) -> PortResult<Value>;
}
