//! # Query Parameter Parser
//!
//! Translates the raw query-string mapping of a list request into a
//! [`QueryDescriptor`]. Pure: no I/O, no shared state.
//!
//! ```text
//! ?averageCost[lte]=2000&careers[in]=Business,UI/UX&select=name,averageCost&sort=-name&page=2&limit=10
//! ```

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use super::descriptor::{QueryDescriptor, SortKey, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};
use super::errors::{QueryResult, ValidationError};
use super::filter::{Comparison, FieldFilter, Filter, FilterOperator};

/// Keys consumed as controls, never as filter fields
pub const RESERVED_KEYS: [&str; 4] = ["select", "sort", "page", "limit"];

/// One raw parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// Single occurrence
    Text(String),
    /// Repeated key, in arrival order
    List(Vec<String>),
    /// Already-nested operator mapping (`{lte: "2000"}`)
    Map(BTreeMap<String, RawValue>),
}

impl RawValue {
    /// Build a nested operator mapping
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RawValue>,
    {
        RawValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<Vec<String>> for RawValue {
    fn from(values: Vec<String>) -> Self {
        RawValue::List(values)
    }
}

/// Raw query parameters of one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams {
    entries: BTreeMap<String, RawValue>,
}

impl RawParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Collect decoded `key=value` pairs, folding repeated keys into a list
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: BTreeMap<String, RawValue> = BTreeMap::new();
        for (key, value) in pairs {
            let value = value.into();
            match entries.entry(key.into()) {
                Entry::Vacant(slot) => {
                    slot.insert(RawValue::Text(value));
                }
                Entry::Occupied(mut slot) => {
                    let merged = match slot.get_mut() {
                        RawValue::Text(first) => {
                            RawValue::List(vec![std::mem::take(first), value])
                        }
                        RawValue::List(items) => {
                            items.push(value);
                            continue;
                        }
                        RawValue::Map(_) => continue,
                    };
                    slot.insert(merged);
                }
            }
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RawValue)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

impl QueryDescriptor {
    /// Parse raw query parameters into a descriptor
    pub fn translate(raw: &RawParams) -> QueryResult<Self> {
        translate(raw)
    }
}

/// Parse raw query parameters into a descriptor.
///
/// Reserved keys become controls; every other key becomes a filter term
/// or an error. No term is ever dropped.
pub fn translate(raw: &RawParams) -> QueryResult<QueryDescriptor> {
    let mut fields: BTreeMap<String, FieldFilter> = BTreeMap::new();
    let mut select = None;
    let mut sort = None;
    let mut page = DEFAULT_PAGE;
    let mut limit = DEFAULT_LIMIT;

    for (key, value) in raw.iter() {
        let (field, operator) = parse_key(key)?;

        if RESERVED_KEYS.contains(&field) {
            if operator.is_some() {
                return Err(ValidationError::malformed(
                    key,
                    "control parameters do not take operators",
                ));
            }
            let text = match value {
                RawValue::Text(text) => text.as_str(),
                _ => {
                    return Err(ValidationError::malformed(key, "expected a single value"));
                }
            };
            match field {
                "select" => select = Some(parse_select(key, text)?),
                "sort" => sort = Some(parse_sort(key, text)?),
                "page" => page = parse_positive(key, text)?,
                _ => limit = parse_positive(key, text)?,
            }
            continue;
        }

        validate_field(key, field)?;

        match (operator, value) {
            (None, RawValue::Text(text)) => add_equality(&mut fields, key, field, text)?,
            (None, RawValue::List(_)) => {
                return Err(ValidationError::malformed(
                    key,
                    "given more than once; use field[in]=a,b",
                ));
            }
            (None, RawValue::Map(ops)) => {
                if ops.is_empty() {
                    return Err(ValidationError::malformed(key, "empty operator mapping"));
                }
                for (token, operand) in ops {
                    let op = parse_operator(key, token)?;
                    add_comparison(&mut fields, key, field, op, operand)?;
                }
            }
            (Some(_), RawValue::Map(_)) => {
                return Err(ValidationError::malformed(key, "nested operator mapping"));
            }
            (Some(token), operand) => {
                let op = parse_operator(key, token)?;
                add_comparison(&mut fields, key, field, op, operand)?;
            }
        }
    }

    if limit > MAX_LIMIT {
        return Err(ValidationError::pagination(
            "limit",
            &limit.to_string(),
            format!("must not exceed {}", MAX_LIMIT),
        ));
    }
    let in_range = (page - 1)
        .checked_mul(limit)
        .and_then(|skip| skip.checked_add(limit))
        .is_some();
    if !in_range {
        return Err(ValidationError::pagination(
            "page",
            &page.to_string(),
            "page is out of range",
        ));
    }

    let mut filter = Filter::new();
    for (field, field_filter) in fields {
        filter.insert(field, field_filter);
    }

    Ok(QueryDescriptor {
        filter,
        select,
        sort: sort.unwrap_or_else(|| QueryDescriptor::default().sort),
        page,
        limit,
    })
}

/// Split `field[op]` into its parts
fn parse_key(key: &str) -> QueryResult<(&str, Option<&str>)> {
    let Some(open) = key.find('[') else {
        if key.contains(']') {
            return Err(ValidationError::malformed(key, "unbalanced bracket"));
        }
        if key.is_empty() {
            return Err(ValidationError::malformed(key, "empty parameter name"));
        }
        return Ok((key, None));
    };

    let field = &key[..open];
    let rest = &key[open + 1..];
    let close = rest
        .find(']')
        .ok_or_else(|| ValidationError::malformed(key, "unclosed bracket"))?;
    let operator = &rest[..close];

    if close + 1 != rest.len() {
        return Err(ValidationError::malformed(
            key,
            "unexpected text after operator",
        ));
    }
    if field.is_empty() {
        return Err(ValidationError::malformed(key, "missing field name"));
    }
    if operator.is_empty() || operator.contains('[') {
        return Err(ValidationError::malformed(key, "empty or invalid operator"));
    }

    Ok((field, Some(operator)))
}

fn parse_operator(param: &str, token: &str) -> QueryResult<FilterOperator> {
    FilterOperator::parse(token).ok_or_else(|| ValidationError::UnknownOperator {
        param: param.to_string(),
        operator: token.to_string(),
    })
}

/// Field paths are dot-separated and may never carry store operators
fn validate_field(param: &str, field: &str) -> QueryResult<()> {
    let valid = !field.contains('$')
        && field
            .split('.')
            .all(|segment| !segment.is_empty() && !segment.contains(char::is_whitespace));
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidField {
            param: param.to_string(),
        })
    }
}

fn add_equality(
    fields: &mut BTreeMap<String, FieldFilter>,
    param: &str,
    field: &str,
    value: &str,
) -> QueryResult<()> {
    match fields.entry(field.to_string()) {
        Entry::Vacant(slot) => {
            slot.insert(FieldFilter::Equals(value.to_string()));
            Ok(())
        }
        Entry::Occupied(_) => Err(ValidationError::ConflictingFilter {
            param: param.to_string(),
        }),
    }
}

fn add_comparison(
    fields: &mut BTreeMap<String, FieldFilter>,
    param: &str,
    field: &str,
    op: FilterOperator,
    operand: &RawValue,
) -> QueryResult<()> {
    let comparison = build_comparison(param, op, operand)?;

    let slot = fields
        .entry(field.to_string())
        .or_insert_with(|| FieldFilter::Compare(Vec::new()));
    match slot {
        FieldFilter::Equals(_) => Err(ValidationError::ConflictingFilter {
            param: param.to_string(),
        }),
        FieldFilter::Compare(list) => {
            if list.iter().any(|c| c.operator() == op) {
                return Err(ValidationError::malformed(
                    param,
                    format!("operator '{}' given more than once", op.as_str()),
                ));
            }
            list.push(comparison);
            list.sort_by_key(Comparison::operator);
            Ok(())
        }
    }
}

fn build_comparison(
    param: &str,
    op: FilterOperator,
    operand: &RawValue,
) -> QueryResult<Comparison> {
    if op == FilterOperator::In {
        let items: Vec<String> = match operand {
            RawValue::Text(text) => text.split(',').map(|s| s.trim().to_string()).collect(),
            RawValue::List(values) => values
                .iter()
                .flat_map(|value| value.split(','))
                .map(|s| s.trim().to_string())
                .collect(),
            RawValue::Map(_) => {
                return Err(ValidationError::malformed(param, "nested operator mapping"));
            }
        };
        if items.iter().any(String::is_empty) {
            return Err(ValidationError::malformed(param, "empty value in list"));
        }
        return Ok(Comparison::In(items));
    }

    let literal = match operand {
        RawValue::Text(text) if !text.trim().is_empty() => text.clone(),
        RawValue::Text(_) => return Err(ValidationError::malformed(param, "missing value")),
        RawValue::List(_) => {
            return Err(ValidationError::malformed(param, "given more than once"));
        }
        RawValue::Map(_) => {
            return Err(ValidationError::malformed(param, "nested operator mapping"));
        }
    };

    Ok(match op {
        FilterOperator::Gt => Comparison::Gt(literal),
        FilterOperator::Gte => Comparison::Gte(literal),
        FilterOperator::Lt => Comparison::Lt(literal),
        FilterOperator::Lte => Comparison::Lte(literal),
        FilterOperator::In => unreachable!("handled above"),
    })
}

/// Parse select parameter (comma-separated field list)
fn parse_select(param: &str, value: &str) -> QueryResult<Vec<String>> {
    let mut fields: Vec<String> = Vec::new();
    for part in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        validate_field(param, part)?;
        if !fields.iter().any(|f| f == part) {
            fields.push(part.to_string());
        }
    }

    if fields.is_empty() {
        return Err(ValidationError::malformed(param, "select cannot be empty"));
    }
    Ok(fields)
}

/// Parse sort parameter (`-name,createdAt`)
fn parse_sort(param: &str, value: &str) -> QueryResult<Vec<SortKey>> {
    let mut keys = Vec::new();
    for part in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let key = match part.strip_prefix('-') {
            Some(field) => SortKey::desc(field),
            None => SortKey::asc(part),
        };
        validate_field(param, &key.field)?;
        keys.push(key);
    }

    if keys.is_empty() {
        return Err(ValidationError::malformed(param, "sort cannot be empty"));
    }
    Ok(keys)
}

/// Parse page / limit
fn parse_positive(param: &str, value: &str) -> QueryResult<usize> {
    let digits = value.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::pagination(param, value, "expected a positive integer"));
    }
    let n: usize = digits
        .parse()
        .map_err(|_| ValidationError::pagination(param, value, "expected a positive integer"))?;
    if n == 0 {
        return Err(ValidationError::pagination(param, value, "must be at least 1"));
    }
    Ok(n)
}
