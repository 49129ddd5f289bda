//! services/storefront/src/stores/crud.rs
//!
//! A generic REST resource client with an optimistic local mirror.
//!
//! Each call sets `loading`, awaits the transport, then applies the outcome to
//! the mirror through the pure transitions in `markethub_core::crud`. Failures
//! are recorded as one generic message; there is no retry and no reconciliation
//! beyond overwriting with the server's representation.

use markethub_core::crud::{extract_collection, CrudOp, CrudOutcome, ResourceList};
use markethub_core::domain::Identified;
use markethub_core::ports::{PortError, PortResult, RestTransport};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

pub struct CrudClient<T> {
    transport: Arc<dyn RestTransport>,
    base_path: String,
    collection_key: String,
    state: Mutex<ResourceList<T>>,
}

impl<T> CrudClient<T>
where
    T: Identified + Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// A client for `base_path` (e.g. `/products`). List responses may wrap the
    /// items under the path's last segment.
    pub fn new(transport: Arc<dyn RestTransport>, base_path: &str) -> Self {
        let base_path = base_path.trim_end_matches('/').to_string();
        let collection_key = base_path
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            transport,
            base_path,
            collection_key,
            state: Mutex::new(ResourceList::default()),
        }
    }

    /// A copy of the mirror, including the loading flag and last error.
    pub fn snapshot(&self) -> ResourceList<T> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn update<R>(&self, f: impl FnOnce(&mut ResourceList<T>) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    fn item_path(&self, id: u64) -> String {
        format!("{}/{}", self.base_path, id)
    }

    /// Brackets one remote call with `begin`/`apply`.
    async fn run<F>(&self, op: CrudOp, call: F) -> PortResult<()>
    where
        F: std::future::Future<Output = PortResult<CrudOutcome<T>>>,
    {
        self.update(ResourceList::begin);
        let result = call.await;
        match result {
            Ok(outcome) => {
                self.update(|state| state.apply(outcome));
                Ok(())
            }
            Err(e) => {
                warn!(path = %self.base_path, "{}: {}", op.failure_message(), e);
                self.update(|state| state.apply(CrudOutcome::Failed(op)));
                Err(e)
            }
        }
    }

    /// `GET {base}`; replaces the mirror.
    pub async fn fetch_all(&self) -> PortResult<()> {
        self.run(CrudOp::Fetch, async {
            let body = self.transport.get(&self.base_path).await?;
            let items = extract_collection(body, &self.collection_key).ok_or_else(|| {
                PortError::Unexpected(format!("No '{}' list in response", self.collection_key))
            })?;
            Ok(CrudOutcome::Fetched(decode(Value::Array(items))?))
        })
        .await
    }

    /// `POST {base}`; appends the server's representation.
    pub async fn create(&self, item: &T) -> PortResult<()> {
        self.run(CrudOp::Create, async {
            let body = self.transport.post(&self.base_path, &encode(item)?).await?;
            Ok(CrudOutcome::Created(decode(body)?))
        })
        .await
    }

    /// `PUT {base}/{id}`; overwrites the local item with the server's representation.
    pub async fn update_item(&self, id: u64, item: &T) -> PortResult<()> {
        self.run(CrudOp::Update, async {
            let body = self.transport.put(&self.item_path(id), &encode(item)?).await?;
            Ok(CrudOutcome::Updated { id, item: decode(body)? })
        })
        .await
    }

    /// `DELETE {base}/{id}`; drops the local item.
    pub async fn delete(&self, id: u64) -> PortResult<()> {
        self.run(CrudOp::Delete, async {
            self.transport.delete(&self.item_path(id)).await?;
            Ok(CrudOutcome::Deleted(id))
        })
        .await
    }
}

fn encode<T: Serialize>(item: &T) -> PortResult<Value> {
    serde_json::to_value(item).map_err(|e| PortError::Unexpected(e.to_string()))
}

fn decode<T: DeserializeOwned>(body: Value) -> PortResult<T> {
    serde_json::from_value(body).map_err(|e| PortError::Unexpected(e.to_string()))
}
