//! services/storefront/src/adapters/dummyjson.rs
//!
//! This module contains the adapter for the DummyJSON demo API. It implements
//! both the typed `MarketApi` port and the untyped `RestTransport` port used by
//! the generic CRUD client, sharing one HTTP client between them.

use async_trait::async_trait;
use markethub_core::crud::extract_collection;
use markethub_core::domain::{AuthGrant, NewUser, Product, User, UserId};
use markethub_core::ports::{KeyValueStore, MarketApi, PortError, PortResult, RestTransport};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::keys;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An HTTP adapter for the demo API.
///
/// Requests carry `Authorization: Bearer <token>` whenever a token is present in
/// storage at send time. No timeouts and no retries are configured.
#[derive(Clone)]
pub struct DummyJsonAdapter {
    client: Client,
    base_url: Url,
    storage: Arc<dyn KeyValueStore>,
}

impl DummyJsonAdapter {
    /// Creates a new `DummyJsonAdapter`. `base_url` should end in `/`.
    pub fn new(client: Client, base_url: Url, storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            client,
            base_url,
            storage,
        }
    }

    fn url(&self, path: &str) -> PortResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| PortError::Unexpected(format!("Invalid path '{}': {}", path, e)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.storage.get(keys::TOKEN) {
            Ok(Some(token)) if !token.is_empty() => request.bearer_auth(token),
            Ok(_) => request,
            Err(e) => {
                warn!("Could not read the stored token, sending unauthenticated: {}", e);
                request
            }
        }
    }

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> PortResult<Value> {
        let url = self.url(path)?;
        debug!(%method, %url, "Request sent");

        let mut request = self.client.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PortError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(PortError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(PortError::Unexpected(format!("{} returned {}", url, status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| PortError::Unexpected(format!("Malformed response from {}: {}", url, e)))
    }

    async fn fetch_collection<T: DeserializeOwned>(&self, path: &str, key: &str) -> PortResult<Vec<T>> {
        let body = self.send(Method::GET, path, None).await?;
        let items = extract_collection(body, key)
            .ok_or_else(|| PortError::Unexpected(format!("Response from {} has no '{}' list", path, key)))?;
        decode(Value::Array(items))
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> PortResult<T> {
    serde_json::from_value(value).map_err(|e| PortError::Unexpected(e.to_string()))
}

//=========================================================================================
// `MarketApi` Trait Implementation
//=========================================================================================

#[async_trait]
impl MarketApi for DummyJsonAdapter {
    async fn fetch_products(&self) -> PortResult<Vec<Product>> {
        self.fetch_collection("products", "products").await
    }

    async fn fetch_users(&self) -> PortResult<Vec<User>> {
        self.fetch_collection("users", "users").await
    }

    async fn fetch_user(&self, id: UserId) -> PortResult<User> {
        let response = self.send(Method::GET, &format!("users/{}", id), None).await?;
        decode(response)
    }

    async fn login(&self, username: &str, password: &str) -> PortResult<AuthGrant> {
        let body = json!({ "username": username, "password": password });
        let response = self.send(Method::POST, "user/login", Some(&body)).await?;
        decode(response)
    }

    async fn add_user(&self, user: &NewUser) -> PortResult<User> {
        let body = serde_json::to_value(user).map_err(|e| PortError::Unexpected(e.to_string()))?;
        let response = self.send(Method::POST, "users/add", Some(&body)).await?;
        decode(response)
    }
}

//=========================================================================================
// `RestTransport` Trait Implementation
//=========================================================================================

#[async_trait]
impl RestTransport for DummyJsonAdapter {
    async fn get(&self, path: &str) -> PortResult<Value> {
        self.send(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> PortResult<Value> {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: &Value) -> PortResult<Value> {
        self.send(Method::PUT, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> PortResult<Value> {
        self.send(Method::DELETE, path, None).await
    }
}
