//! # Query Executor
//!
//! Runs a [`QueryDescriptor`] against a collection and assembles the
//! [`ResultEnvelope`].
//!
//! Order of work: count the full match set, fetch the sorted page,
//! expand the requested relation for that page only, project.
//! Store errors propagate unchanged and are never retried here.
//! Dropping the returned future cancels the in-flight store call.

use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::descriptor::QueryDescriptor;
use super::filter::{resolve_path, Comparison, Filter};
use super::projection::{project, ID_FIELD};
use super::response::{Pagination, ResultEnvelope};
use crate::store::{Collection, FindQuery, StoreResult};

/// How populated records relate to the page records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    /// Attach every target record whose `foreign_field` holds this record's `_id`
    Children { foreign_field: String },
    /// Resolve the id stored in `local_field` to the target record
    Parent { local_field: String },
}

/// Relation to expand inline
#[derive(Debug)]
pub struct PopulateSpec<'a, C: Collection> {
    /// Field the expansion is written to
    pub path: String,
    pub target: &'a C,
    pub link: Link,
    /// Projection applied to the populated records
    pub select: Option<Vec<String>>,
}

impl<'a, C: Collection> PopulateSpec<'a, C> {
    /// One-to-many: `bootcamp.courses`
    pub fn children(path: impl Into<String>, target: &'a C, foreign_field: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            target,
            link: Link::Children {
                foreign_field: foreign_field.into(),
            },
            select: None,
        }
    }

    /// Many-to-one: `course.bootcamp`; written back over the id field
    pub fn parent(target: &'a C, local_field: impl Into<String>) -> Self {
        let local_field = local_field.into();
        Self {
            path: local_field.clone(),
            target,
            link: Link::Parent { local_field },
            select: None,
        }
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    fn shape(&self, doc: &Value) -> Value {
        match &self.select {
            Some(fields) => project(doc, fields),
            None => doc.clone(),
        }
    }
}

/// Run a list query and build its envelope
pub async fn execute<C: Collection>(
    descriptor: &QueryDescriptor,
    collection: &C,
    populate: Option<&PopulateSpec<'_, C>>,
) -> StoreResult<ResultEnvelope> {
    debug!(
        collection = collection.name(),
        query = %descriptor.to_log_value(),
        "executing list query"
    );

    let total = collection.count(descriptor.filter()).await?;

    let query = FindQuery::new(descriptor.filter())
        .sort(descriptor.sort())
        .skip(descriptor.skip())
        .limit(descriptor.limit());
    let records = collection.find(query).await?;

    let expansions = match populate {
        Some(spec) => Some(expand(spec, &records).await?),
        None => None,
    };

    let data: Vec<Value> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let mut out = match descriptor.select() {
                Some(fields) => project(record, fields),
                None => record.clone(),
            };
            if let (Some(spec), Some(values)) = (populate, &expansions) {
                attach(&mut out, &spec.path, values[i].clone());
            }
            out
        })
        .collect();

    trace!(
        collection = collection.name(),
        total,
        returned = data.len(),
        "list query complete"
    );

    Ok(ResultEnvelope::new(
        data,
        Pagination::compute(descriptor.page(), descriptor.limit(), total),
    ))
}

/// Expand a relation on already-fetched records (single-record reads)
pub async fn populate<C: Collection>(
    spec: &PopulateSpec<'_, C>,
    mut records: Vec<Value>,
) -> StoreResult<Vec<Value>> {
    let values = expand(spec, &records).await?;
    for (record, value) in records.iter_mut().zip(values) {
        attach(record, &spec.path, value);
    }
    Ok(records)
}

/// One batched lookup against the target; returns one value per record
async fn expand<C: Collection>(
    spec: &PopulateSpec<'_, C>,
    records: &[Value],
) -> StoreResult<Vec<Value>> {
    match &spec.link {
        Link::Children { foreign_field } => {
            let ids: BTreeSet<String> = records.iter().filter_map(record_id).collect();
            let mut grouped: HashMap<String, Vec<Value>> = HashMap::new();

            if !ids.is_empty() {
                let filter = Filter::new()
                    .compare(foreign_field.clone(), Comparison::In(ids.into_iter().collect()));
                for child in spec.target.find(FindQuery::new(&filter)).await? {
                    if let Some(parent_id) = resolve_path(&child, foreign_field).and_then(Value::as_str) {
                        grouped
                            .entry(parent_id.to_string())
                            .or_default()
                            .push(spec.shape(&child));
                    }
                }
            }

            Ok(records
                .iter()
                .map(|record| {
                    let children = record_id(record)
                        .and_then(|id| grouped.get(&id).cloned())
                        .unwrap_or_default();
                    Value::Array(children)
                })
                .collect())
        }
        Link::Parent { local_field } => {
            let ids: BTreeSet<String> = records
                .iter()
                .filter_map(|r| resolve_path(r, local_field).and_then(Value::as_str))
                .map(str::to_string)
                .collect();
            let mut parents: HashMap<String, Value> = HashMap::new();

            if !ids.is_empty() {
                let filter =
                    Filter::new().compare(ID_FIELD, Comparison::In(ids.into_iter().collect()));
                for parent in spec.target.find(FindQuery::new(&filter)).await? {
                    if let Some(id) = record_id(&parent) {
                        parents.insert(id, spec.shape(&parent));
                    }
                }
            }

            Ok(records
                .iter()
                .map(|record| {
                    resolve_path(record, local_field)
                        .and_then(Value::as_str)
                        .and_then(|id| parents.get(id).cloned())
                        .unwrap_or(Value::Null)
                })
                .collect())
        }
    }
}

fn record_id(record: &Value) -> Option<String> {
    record.get(ID_FIELD).and_then(Value::as_str).map(str::to_string)
}

fn attach(record: &mut Value, path: &str, value: Value) {
    if let Value::Object(fields) = record {
        fields.insert(path.to_string(), value);
    } else {
        let mut fields = Map::new();
        fields.insert(path.to_string(), value);
        *record = Value::Object(fields);
    }
}
