//! An in-process stand-in for the demo API, serving just enough of its
//! endpoints for the storefront flows.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use markethub_core::ports::{KeyValueStore, PortError, PortResult, StorageEvent};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use storefront_lib::adapters::{DummyJsonAdapter, MemoryStore};
use tokio::sync::broadcast;
use storefront_lib::config::parse_base_url;
use storefront_lib::AppState;

pub const EMILY_TOKEN: &str = "emily-access-token";

#[derive(Clone, Default)]
pub struct FakeApi {
    pub offline: Arc<AtomicBool>,
    pub authorization: Arc<Mutex<Vec<Option<String>>>>,
    pub signups: Arc<Mutex<Vec<Value>>>,
}

impl FakeApi {
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    fn record_auth(&self, headers: &HeaderMap) {
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.authorization.lock().unwrap().push(value);
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.authorization.lock().unwrap().last().cloned().flatten()
    }
}

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn reject(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": message })))
}

pub fn sample_products() -> Value {
    json!([
        {
            "id": 1,
            "title": "Essence Mascara Lash Princess",
            "description": "A popular mascara.",
            "category": "beauty",
            "price": 9.99,
            "rating": 4.94,
            "stock": 5,
            "tags": ["beauty", "mascara"],
            "brand": "Essence",
            "thumbnail": "https://cdn.dummyjson.com/products/1/thumbnail.png"
        },
        {
            "id": 2,
            "title": "Annibale Colombo Bed",
            "description": "A luxurious bed.",
            "category": "furniture",
            "price": 1899.99,
            "rating": 4.14,
            "stock": 47,
            "thumbnail": "https://cdn.dummyjson.com/products/2/thumbnail.png"
        }
    ])
}

async fn products(State(api): State<FakeApi>, headers: HeaderMap) -> Reply {
    api.record_auth(&headers);
    if api.is_offline() {
        return Err(reject(StatusCode::SERVICE_UNAVAILABLE, "offline"));
    }
    Ok(Json(json!({ "products": sample_products(), "total": 2, "skip": 0, "limit": 30 })))
}

async fn create_product(State(api): State<FakeApi>, Json(mut body): Json<Value>) -> Reply {
    if api.is_offline() {
        return Err(reject(StatusCode::SERVICE_UNAVAILABLE, "offline"));
    }
    body["id"] = json!(195);
    Ok(Json(body))
}

async fn update_product(Path(id): Path<u64>, Json(mut body): Json<Value>) -> Reply {
    body["id"] = json!(id);
    body["title"] = json!(format!("{} (updated)", body["title"].as_str().unwrap_or_default()));
    Ok(Json(body))
}

async fn delete_product(Path(id): Path<u64>) -> Reply {
    if id == 404 {
        return Err(reject(StatusCode::NOT_FOUND, "Product with id '404' not found"));
    }
    Ok(Json(json!({ "id": id, "isDeleted": true })))
}

pub fn sample_users() -> Value {
    json!([
        { "id": 1, "firstName": "Emily", "lastName": "Johnson", "email": "emily.johnson@x.dummyjson.com", "username": "emilys", "role": "admin" },
        { "id": 2, "firstName": "Michael", "lastName": "Williams", "email": "michael.williams@x.dummyjson.com", "username": "michaelw", "role": "moderator" }
    ])
}

async fn users(State(api): State<FakeApi>) -> Reply {
    if api.is_offline() {
        return Err(reject(StatusCode::SERVICE_UNAVAILABLE, "offline"));
    }
    Ok(Json(json!({ "users": sample_users(), "total": 2 })))
}

async fn user(State(api): State<FakeApi>, Path(id): Path<u64>) -> Reply {
    if api.is_offline() {
        return Err(reject(StatusCode::SERVICE_UNAVAILABLE, "offline"));
    }
    let users = sample_users();
    let found = users.as_array().into_iter().flatten().find(|u| u["id"] == json!(id)).cloned();
    found
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, &format!("User with id '{}' not found", id)))
}

async fn login(State(api): State<FakeApi>, Json(body): Json<Value>) -> Reply {
    if api.is_offline() {
        return Err(reject(StatusCode::SERVICE_UNAVAILABLE, "offline"));
    }
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match (username, password) {
        ("emilys", "emilyspass") => Ok(Json(json!({
            "id": 1,
            "username": "emilys",
            "email": "emily.johnson@x.dummyjson.com",
            "firstName": "Emily",
            "lastName": "Johnson",
            "gender": "female",
            "image": "https://dummyjson.com/icon/emilys/128",
            "accessToken": EMILY_TOKEN,
            "refreshToken": "refresh"
        }))),
        ("michaelw", "michaelwpass") => Ok(Json(json!({
            "id": 2,
            "username": "michaelw",
            "email": "michael.williams@x.dummyjson.com",
            "firstName": "Michael",
            "lastName": "Williams",
            "accessToken": "michael-access-token"
        }))),
        _ => Err(reject(StatusCode::BAD_REQUEST, "Invalid credentials")),
    }
}

async fn add_user(State(api): State<FakeApi>, Json(mut body): Json<Value>) -> Reply {
    if api.is_offline() {
        return Err(reject(StatusCode::SERVICE_UNAVAILABLE, "offline"));
    }
    api.signups.lock().unwrap().push(body.clone());
    body["id"] = json!(209);
    Ok(Json(body))
}

/// Serves the fake API on an ephemeral port and returns its base URL.
pub async fn spawn_fake_api(api: FakeApi) -> String {
    let app = Router::new()
        .route("/products", get(products).post(create_product))
        .route("/products/{id}", put(update_product).delete(delete_product))
        .route("/users", get(users))
        .route("/users/{id}", get(user))
        .route("/user/login", post(login))
        .route("/users/add", post(add_user))
        .with_state(api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

/// An in-memory store whose writes to selected keys fail, as a full disk would.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: Mutex<Vec<&'static str>>,
}

impl FlakyStore {
    pub fn fail_writes_to(&self, key: &'static str) {
        self.failing.lock().unwrap().push(key);
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        if self.failing.lock().unwrap().iter().any(|k| *k == key) {
            return Err(PortError::Storage(format!("{}: no space left on device", key)));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        self.inner.remove(key)
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.inner.subscribe()
    }
}

/// Client state on a fresh in-memory store, talking to a fresh fake API.
pub async fn app() -> (AppState, FakeApi) {
    app_on(Arc::new(MemoryStore::new())).await
}

/// Client state on the given store, talking to a fresh fake API.
pub async fn app_on(storage: Arc<dyn KeyValueStore>) -> (AppState, FakeApi) {
    let api = FakeApi::default();
    let base_url = spawn_fake_api(api.clone()).await;

    let adapter = Arc::new(DummyJsonAdapter::new(
        reqwest::Client::new(),
        parse_base_url(&base_url).unwrap(),
        storage.clone(),
    ));
    (AppState::with_ports(storage, adapter.clone(), adapter), api)
}
