//! # Result Envelope
//!
//! Uniform response body for every list read.

use serde::Serialize;
use serde_json::Value;

/// Reference to a neighbouring page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub page: usize,
    pub limit: usize,
}

/// Links to the neighbouring pages that exist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

impl Pagination {
    /// Compute the page links for a window over `total` matching records.
    ///
    /// `next` exists iff `(page-1)*limit + limit < total`;
    /// `prev` exists iff `page > 1`. Page `0` is treated as page `1`.
    pub fn compute(page: usize, limit: usize, total: usize) -> Self {
        let page = page.max(1);
        let start = (page - 1).saturating_mul(limit);
        let end = start.saturating_add(limit);

        Self {
            next: (end < total).then(|| PageRef {
                page: page + 1,
                limit,
            }),
            prev: (page > 1).then(|| PageRef {
                page: page - 1,
                limit,
            }),
        }
    }
}

/// List response with pagination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEnvelope<T: Serialize = Value> {
    /// Always true; failures travel as errors
    pub success: bool,

    /// Number of records on this page (not the total match count)
    pub count: usize,

    pub pagination: Pagination,

    pub data: Vec<T>,
}

impl<T: Serialize> ResultEnvelope<T> {
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            success: true,
            count: data.len(),
            pagination,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pagination_boundaries() {
        let last = Pagination::compute(3, 10, 30);
        assert_eq!(last.next, None);
        assert_eq!(last.prev, Some(PageRef { page: 2, limit: 10 }));

        let first = Pagination::compute(1, 10, 30);
        assert_eq!(first.next, Some(PageRef { page: 2, limit: 10 }));
        assert_eq!(first.prev, None);

        let empty = Pagination::compute(1, 25, 0);
        assert_eq!(empty, Pagination::default());
    }

    #[test]
    fn test_page_zero_is_first_page() {
        assert_eq!(Pagination::compute(0, 10, 5), Pagination::compute(1, 10, 5));
        assert_eq!(
            Pagination::compute(0, 10, 30).next,
            Some(PageRef { page: 2, limit: 10 })
        );
    }

    #[test]
    fn test_envelope_serialization() {
        let envelope = ResultEnvelope::new(
            vec![json!({"_id": "1"}), json!({"_id": "2"})],
            Pagination::compute(1, 2, 5),
        );

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 2);
        assert_eq!(json["pagination"], json!({"next": {"page": 2, "limit": 2}}));
        assert!(json["pagination"].get("prev").is_none());
    }
}
