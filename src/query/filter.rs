//! # Filter Expressions
//!
//! The closed set of comparisons a list query may apply, and how each
//! one is evaluated against a stored document.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Range and membership operators accepted in `field[op]` form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterOperator {
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// Value in list
    In,
}

impl FilterOperator {
    /// Every supported operator, in canonical order
    pub const ALL: [FilterOperator; 5] = [
        FilterOperator::Gt,
        FilterOperator::Gte,
        FilterOperator::Lt,
        FilterOperator::Lte,
        FilterOperator::In,
    ];

    /// Parse an operator token as it appears inside brackets
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == token)
    }

    /// Get the operator string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::In => "in",
        }
    }

    /// Operator token in the document store's native query language
    pub fn store_token(&self) -> &'static str {
        match self {
            FilterOperator::Gt => "$gt",
            FilterOperator::Gte => "$gte",
            FilterOperator::Lt => "$lt",
            FilterOperator::Lte => "$lte",
            FilterOperator::In => "$in",
        }
    }
}

/// One comparison with its operand.
///
/// Operands stay as the literal text from the request; they are cast to
/// the stored value's type when matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    Gt(String),
    Gte(String),
    Lt(String),
    Lte(String),
    In(Vec<String>),
}

impl Comparison {
    pub fn operator(&self) -> FilterOperator {
        match self {
            Comparison::Gt(_) => FilterOperator::Gt,
            Comparison::Gte(_) => FilterOperator::Gte,
            Comparison::Lt(_) => FilterOperator::Lt,
            Comparison::Lte(_) => FilterOperator::Lte,
            Comparison::In(_) => FilterOperator::In,
        }
    }

    /// Check one stored scalar against this comparison
    fn matches_scalar(&self, stored: &Value) -> bool {
        match self {
            Comparison::Gt(lit) => compare_literal(stored, lit) == Some(Ordering::Greater),
            Comparison::Gte(lit) => matches!(
                compare_literal(stored, lit),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Comparison::Lt(lit) => compare_literal(stored, lit) == Some(Ordering::Less),
            Comparison::Lte(lit) => matches!(
                compare_literal(stored, lit),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Comparison::In(items) => items
                .iter()
                .any(|lit| compare_literal(stored, lit) == Some(Ordering::Equal)),
        }
    }

    fn to_store_value(&self) -> Value {
        match self {
            Comparison::Gt(v) | Comparison::Gte(v) | Comparison::Lt(v) | Comparison::Lte(v) => {
                Value::String(v.clone())
            }
            Comparison::In(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

/// Filter applied to a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldFilter {
    /// Direct equality (`field=value`)
    Equals(String),
    /// Conjunction of operator comparisons (`field[gte]=1&field[lt]=5`)
    Compare(Vec<Comparison>),
}

impl FieldFilter {
    fn matches(&self, stored: Option<&Value>) -> bool {
        let stored = match stored {
            Some(v) => v,
            // A missing field only equals an explicit null
            None => return matches!(self, FieldFilter::Equals(lit) if lit == "null"),
        };

        match self {
            FieldFilter::Equals(lit) => any_element(stored, |v| {
                compare_literal(v, lit) == Some(Ordering::Equal)
            }),
            FieldFilter::Compare(comparisons) => comparisons
                .iter()
                .all(|cmp| any_element(stored, |v| cmp.matches_scalar(v))),
        }
    }
}

/// A set of field filters combined with AND logic
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    fields: BTreeMap<String, FieldFilter>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a direct equality on `field`
    pub fn equals(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields
            .insert(field.into(), FieldFilter::Equals(value.into()));
        self
    }

    /// Add an operator comparison on `field`, AND-ed with any existing ones
    pub fn compare(mut self, field: impl Into<String>, comparison: Comparison) -> Self {
        let slot = self
            .fields
            .entry(field.into())
            .or_insert_with(|| FieldFilter::Compare(Vec::new()));
        match slot {
            FieldFilter::Compare(list) => list.push(comparison),
            other => *other = FieldFilter::Compare(vec![comparison]),
        }
        self
    }

    pub(crate) fn insert(&mut self, field: String, filter: FieldFilter) {
        self.fields.insert(field, filter);
    }

    pub fn get(&self, field: &str) -> Option<&FieldFilter> {
        self.fields.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldFilter)> {
        self.fields.iter()
    }

    /// Check if a document matches all field filters
    pub fn matches(&self, doc: &Value) -> bool {
        self.fields
            .iter()
            .all(|(path, filter)| filter.matches(resolve_path(doc, path)))
    }

    /// Render in the store's native syntax, e.g. `{"cost": {"$lte": "2000"}}`
    pub fn to_store_document(&self) -> Value {
        let mut out = Map::new();
        for (field, filter) in &self.fields {
            let value = match filter {
                FieldFilter::Equals(v) => Value::String(v.clone()),
                FieldFilter::Compare(list) => Value::Object(
                    list.iter()
                        .map(|c| (c.operator().store_token().to_string(), c.to_store_value()))
                        .collect(),
                ),
            };
            out.insert(field.clone(), value);
        }
        Value::Object(out)
    }
}

/// Resolve a dotted path (`location.city`) inside a document
pub fn resolve_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |current, segment| current.get(segment))
}

/// Arrays match when any element does
fn any_element(stored: &Value, pred: impl Fn(&Value) -> bool) -> bool {
    match stored {
        Value::Array(items) => items.iter().any(&pred),
        other => pred(other),
    }
}

/// Compare a stored value against a request literal, casting the literal
/// to the stored value's type. `None` means the two are not comparable.
fn compare_literal(stored: &Value, literal: &str) -> Option<Ordering> {
    match stored {
        Value::Number(n) => {
            let lhs = n.as_f64()?;
            let rhs: f64 = literal.trim().parse().ok()?;
            lhs.partial_cmp(&rhs)
        }
        Value::String(s) => Some(s.as_str().cmp(literal)),
        Value::Bool(b) => literal.parse::<bool>().ok().map(|rhs| b.cmp(&rhs)),
        Value::Null => (literal == "null").then_some(Ordering::Equal),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Total order over JSON values used for sorting.
///
/// Types rank missing/null < numbers < strings < objects < arrays < booleans.
pub fn compare_json_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(Value::String(_)) => 2,
            Some(Value::Object(_)) => 3,
            Some(Value::Array(_)) => 4,
            Some(Value::Bool(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Array(x)), Some(Value::Array(y))) => x.len().cmp(&y.len()),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_tokens() {
        assert_eq!(FilterOperator::parse("gte"), Some(FilterOperator::Gte));
        assert_eq!(FilterOperator::parse("ne"), None);
        assert_eq!(FilterOperator::parse("$gt"), None);
        assert_eq!(FilterOperator::Lte.store_token(), "$lte");
    }

    #[test]
    fn test_eq_filter_casts_to_stored_type() {
        let filter = Filter::new().equals("housing", "true");
        assert!(filter.matches(&json!({"housing": true})));
        assert!(!filter.matches(&json!({"housing": false})));

        let filter = Filter::new().equals("zipcode", "02118");
        assert!(filter.matches(&json!({"zipcode": "02118"})));
        assert!(filter.matches(&json!({"zipcode": 2118})));

        // A non-numeric literal never equals a stored number
        let filter = Filter::new().equals("zipcode", "MA");
        assert!(!filter.matches(&json!({"zipcode": 2118})));
    }

    #[test]
    fn test_range_filter() {
        let filter = Filter::new()
            .compare("averageCost", Comparison::Gte("1000".into()))
            .compare("averageCost", Comparison::Lt("5000".into()));

        assert!(filter.matches(&json!({"averageCost": 1000})));
        assert!(filter.matches(&json!({"averageCost": 4999.5})));
        assert!(!filter.matches(&json!({"averageCost": 5000})));
        assert!(!filter.matches(&json!({"averageCost": 999})));
        assert!(!filter.matches(&json!({"name": "no cost"})));
    }

    #[test]
    fn test_non_numeric_literal_never_matches_number() {
        let filter = Filter::new().compare("averageCost", Comparison::Gt("abc".into()));
        assert!(!filter.matches(&json!({"averageCost": 10})));
    }

    #[test]
    fn test_in_filter_and_array_fields() {
        let filter = Filter::new().compare(
            "careers",
            Comparison::In(vec!["Business".into(), "UI/UX".into()]),
        );
        assert!(filter.matches(&json!({"careers": ["Web Development", "UI/UX"]})));
        assert!(!filter.matches(&json!({"careers": ["Data Science"]})));

        let filter = Filter::new().equals("careers", "Business");
        assert!(filter.matches(&json!({"careers": ["Business", "Other"]})));
    }

    #[test]
    fn test_nested_path() {
        let doc = json!({"location": {"city": "Boston", "state": "MA"}});
        assert_eq!(resolve_path(&doc, "location.city"), Some(&json!("Boston")));
        assert_eq!(resolve_path(&doc, "location.zip"), None);

        let filter = Filter::new().equals("location.state", "MA");
        assert!(filter.matches(&doc));
    }

    #[test]
    fn test_store_document() {
        let filter = Filter::new()
            .equals("housing", "true")
            .compare("averageCost", Comparison::Lte("2000".into()));
        assert_eq!(
            filter.to_store_document(),
            json!({"averageCost": {"$lte": "2000"}, "housing": "true"})
        );
    }

    #[test]
    fn test_sort_ordering_ranks_types() {
        assert_eq!(
            compare_json_values(Some(&json!(2)), Some(&json!(10))),
            Ordering::Less
        );
        assert_eq!(
            compare_json_values(None, Some(&json!("a"))),
            Ordering::Less
        );
        assert_eq!(
            compare_json_values(Some(&json!("b")), Some(&json!(100))),
            Ordering::Greater
        );
    }
}
