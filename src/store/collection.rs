//! # Collection Handle
//!
//! The seam between the query layer and whatever holds the records.
//! Records are JSON documents addressable by field name, keyed by `_id`.

use std::future::Future;

use serde_json::Value;

use super::errors::StoreResult;
use crate::query::{Filter, SortKey};

/// A filtered, sorted, windowed read
#[derive(Debug, Clone, Copy)]
pub struct FindQuery<'a> {
    pub filter: &'a Filter,
    pub sort: &'a [SortKey],
    pub skip: usize,
    pub limit: Option<usize>,
}

impl<'a> FindQuery<'a> {
    /// Every record matching `filter`, in natural order
    pub fn new(filter: &'a Filter) -> Self {
        Self {
            filter,
            sort: &[],
            skip: 0,
            limit: None,
        }
    }

    pub fn sort(mut self, keys: &'a [SortKey]) -> Self {
        self.sort = keys;
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Handle to one logical set of homogeneous records.
///
/// Implementations own their concurrency discipline; callers may share
/// one handle across concurrent requests.
pub trait Collection: Send + Sync {
    /// Collection name, used in logs
    fn name(&self) -> &str;

    /// Records matching the query, sorted then windowed
    fn find(&self, query: FindQuery<'_>) -> impl Future<Output = StoreResult<Vec<Value>>> + Send;

    /// Number of records matching `filter`, ignoring any window
    fn count(&self, filter: &Filter) -> impl Future<Output = StoreResult<usize>> + Send;

    /// Fetch one record by `_id`
    fn get(&self, id: &str) -> impl Future<Output = StoreResult<Option<Value>>> + Send;

    /// Store a new record, assigning `_id` when absent; returns the stored record
    fn insert(&self, doc: Value) -> impl Future<Output = StoreResult<Value>> + Send;

    /// Shallow-merge `patch` into a record; `None` when it does not exist
    fn update(
        &self,
        id: &str,
        patch: Value,
    ) -> impl Future<Output = StoreResult<Option<Value>>> + Send;

    /// Remove one record; `false` when it did not exist
    fn delete(&self, id: &str) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Remove every record matching `filter`; returns how many were removed
    fn delete_many(&self, filter: &Filter) -> impl Future<Output = StoreResult<usize>> + Send;
}
