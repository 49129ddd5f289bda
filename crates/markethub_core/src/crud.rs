//! crates/markethub_core/src/crud.rs
//!
//! The local mirror kept by the generic CRUD client, as pure state transitions.
//! A remote call is bracketed by `begin` and `apply`; the transport itself lives
//! elsewhere.

use serde_json::Value;

use crate::domain::Identified;

/// The four operations of the CRUD client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudOp {
    Fetch,
    Create,
    Update,
    Delete,
}

impl CrudOp {
    /// The single message recorded when this operation fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            CrudOp::Fetch => "Failed to fetch data",
            CrudOp::Create => "Failed to create item",
            CrudOp::Update => "Failed to update item",
            CrudOp::Delete => "Failed to delete item",
        }
    }
}

/// The result of one remote call, as seen by the mirror.
#[derive(Debug, Clone, PartialEq)]
pub enum CrudOutcome<T> {
    Fetched(Vec<T>),
    /// Carries the server's representation of the new item.
    Created(T),
    /// Carries the server's representation, which overwrites the local one.
    Updated { id: u64, item: T },
    Deleted(u64),
    Failed(CrudOp),
}

/// Items plus the per-request loading flag and the last operation's error.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceList<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ResourceList<T> {
    fn default() -> Self {
        Self { items: Vec::new(), loading: false, error: None }
    }
}

impl<T: Identified> ResourceList<T> {
    pub fn begin(&mut self) {
        self.loading = true;
    }

    /// Applies a finished call. A failure leaves `items` untouched; a success clears `error`.
    pub fn apply(&mut self, outcome: CrudOutcome<T>) {
        self.loading = false;
        match outcome {
            CrudOutcome::Failed(op) => {
                self.error = Some(op.failure_message().to_string());
                return;
            }
            CrudOutcome::Fetched(items) => self.items = items,
            CrudOutcome::Created(item) => self.items.push(item),
            CrudOutcome::Updated { id, item } => {
                if let Some(slot) = self.items.iter_mut().find(|existing| existing.id() == id) {
                    *slot = item;
                }
            }
            CrudOutcome::Deleted(id) => self.items.retain(|existing| existing.id() != id),
        }
        self.error = None;
    }
}

/// Replaces the element with the same id, or appends. Returns `true` on replace.
pub fn upsert<T: Identified>(items: &mut Vec<T>, item: T) -> bool {
    match items.iter_mut().find(|existing| existing.id() == item.id()) {
        Some(slot) => {
            *slot = item;
            true
        }
        None => {
            items.push(item);
            false
        }
    }
}

/// Drops the element with `id`. Returns `false` if there was none.
pub fn remove<T: Identified>(items: &mut Vec<T>, id: u64) -> bool {
    let before = items.len();
    items.retain(|existing| existing.id() != id);
    items.len() != before
}

/// Pulls the list out of a response that is either a bare array or an object
/// wrapping it under `key` (e.g. `{"products": [...], "total": 194}`).
pub fn extract_collection(body: Value, key: &str) -> Option<Vec<Value>> {
    match body {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}
