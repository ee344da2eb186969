//! # In-Memory Collection
//!
//! Insertion-ordered document list behind an async lock. Natural order
//! (used to break sort ties) is insertion order.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::trace;
use uuid::Uuid;

use super::collection::{Collection, FindQuery};
use super::errors::{StoreError, StoreResult};
use crate::query::{compare_json_values, resolve_path, Direction, Filter, SortKey, ID_FIELD};

/// In-memory collection
#[derive(Debug)]
pub struct MemoryCollection {
    name: String,
    documents: RwLock<Vec<Value>>,
    available: AtomicBool,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Take the collection offline (or back online).
    ///
    /// While offline every operation fails with [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, AtomicOrdering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(AtomicOrdering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable(format!(
                "collection '{}' is offline",
                self.name
            )))
        }
    }
}

/// Multi-key comparison; the first key has the highest precedence
fn compare_by_keys(a: &Value, b: &Value, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ord = compare_json_values(resolve_path(a, &key.field), resolve_path(b, &key.field));
        let ord = match key.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn id_of(doc: &Value) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}

impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find(&self, query: FindQuery<'_>) -> StoreResult<Vec<Value>> {
        self.check_available()?;
        let documents = self.documents.read().await;

        let mut matched: Vec<&Value> = documents
            .iter()
            .filter(|doc| query.filter.matches(doc))
            .collect();

        // Stable: ties keep insertion order
        if !query.sort.is_empty() {
            matched.sort_by(|a, b| compare_by_keys(a, b, query.sort));
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        let page: Vec<Value> = matched
            .into_iter()
            .skip(query.skip)
            .take(limit)
            .cloned()
            .collect();

        trace!(collection = %self.name, returned = page.len(), "find");
        Ok(page)
    }

    async fn count(&self, filter: &Filter) -> StoreResult<usize> {
        self.check_available()?;
        let documents = self.documents.read().await;
        Ok(documents.iter().filter(|doc| filter.matches(doc)).count())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Value>> {
        self.check_available()?;
        let documents = self.documents.read().await;
        Ok(documents.iter().find(|doc| id_of(doc) == Some(id)).cloned())
    }

    async fn insert(&self, doc: Value) -> StoreResult<Value> {
        self.check_available()?;
        let Value::Object(mut fields) = doc else {
            return Err(StoreError::Rejected("document must be an object".to_string()));
        };

        let id = match fields.get(ID_FIELD) {
            Some(Value::String(id)) => id.clone(),
            Some(_) => return Err(StoreError::Rejected("_id must be a string".to_string())),
            None => {
                let id = Uuid::new_v4().to_string();
                fields.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                id
            }
        };

        let mut documents = self.documents.write().await;
        if documents.iter().any(|d| id_of(d) == Some(id.as_str())) {
            return Err(StoreError::Rejected(format!("duplicate _id '{}'", id)));
        }

        let stored = Value::Object(fields);
        documents.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: &str, patch: Value) -> StoreResult<Option<Value>> {
        self.check_available()?;
        let Value::Object(patch) = patch else {
            return Err(StoreError::Rejected("update must be an object".to_string()));
        };

        let mut documents = self.documents.write().await;
        let Some(existing) = documents.iter_mut().find(|d| id_of(d) == Some(id)) else {
            return Ok(None);
        };

        if let Value::Object(base) = existing {
            merge(base, patch);
        }
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        self.check_available()?;
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|d| id_of(d) != Some(id));
        Ok(documents.len() != before)
    }

    async fn delete_many(&self, filter: &Filter) -> StoreResult<usize> {
        self.check_available()?;
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|d| !filter.matches(d));
        Ok(before - documents.len())
    }
}

/// Shallow merge; `_id` is immutable and `null` removes a field
fn merge(base: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, value) in patch {
        if key == ID_FIELD {
            continue;
        }
        if value.is_null() {
            base.remove(&key);
        } else {
            base.insert(key, value);
        }
    }
}
