//! # Query Descriptor
//!
//! Immutable, store-independent representation of one list request.

use serde::Serialize;
use serde_json::json;

use super::filter::Filter;

/// Default page number
pub const DEFAULT_PAGE: usize = 1;

/// Default limit if not specified
pub const DEFAULT_LIMIT: usize = 25;

/// Maximum number of records that can be returned
pub const MAX_LIMIT: usize = 1000;

/// Creation-timestamp field used for the default sort
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

/// One sort key; the first key in a list has the highest precedence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub field: String,
    pub direction: Direction,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

/// Parsed list query: filter, projection, sort and page window.
///
/// Built once per request by `QueryDescriptor::translate` and never
/// mutated afterwards; fields are read through accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub(crate) filter: Filter,
    pub(crate) select: Option<Vec<String>>,
    pub(crate) sort: Vec<SortKey>,
    pub(crate) page: usize,
    pub(crate) limit: usize,
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self {
            filter: Filter::new(),
            select: None,
            sort: vec![SortKey::desc(CREATED_AT_FIELD)],
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl QueryDescriptor {
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Fields to project (`None` = all)
    pub fn select(&self) -> Option<&[String]> {
        self.select.as_deref()
    }

    pub fn sort(&self) -> &[SortKey] {
        &self.sort
    }

    /// 1-based page number
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Offset of the first record on this page.
    ///
    /// The translator rejects pages whose offset would overflow.
    pub fn skip(&self) -> usize {
        (self.page - 1) * self.limit
    }

    /// Summary for log lines
    pub fn to_log_value(&self) -> serde_json::Value {
        json!({
            "filter": self.filter.to_store_document(),
            "select": self.select,
            "sort": self.sort,
            "page": self.page,
            "limit": self.limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_descriptor() {
        let d = QueryDescriptor::default();
        assert_eq!(d.page(), 1);
        assert_eq!(d.limit(), 25);
        assert_eq!(d.skip(), 0);
        assert_eq!(d.sort(), &[SortKey::desc("createdAt")]);
        assert!(d.select().is_none());
    }

    #[test]
    fn test_skip() {
        let d = QueryDescriptor {
            page: 3,
            limit: 10,
            ..Default::default()
        };
        assert_eq!(d.skip(), 20);
    }
}
