//! # Advanced Results Query Layer
//!
//! Turns the query string of a list request into a filtered, sorted,
//! field-selected, paginated and relation-expanded read, and wraps the
//! page in a uniform envelope.
//!
//! - [`translate`] is pure and raises [`ValidationError`].
//! - [`execute`] talks to a [`Collection`](crate::store::Collection) and
//!   raises [`StoreError`](crate::store::StoreError).

pub mod descriptor;
pub mod errors;
pub mod executor;
pub mod filter;
pub mod parser;
pub mod projection;
pub mod response;

pub use descriptor::{
    Direction, QueryDescriptor, SortKey, CREATED_AT_FIELD, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT,
};
pub use errors::{QueryResult, ValidationError};
pub use executor::{execute, populate, Link, PopulateSpec};
pub use filter::{compare_json_values, resolve_path, Comparison, FieldFilter, Filter, FilterOperator};
pub use parser::{translate, RawParams, RawValue, RESERVED_KEYS};
pub use projection::{project, ID_FIELD};
pub use response::{PageRef, Pagination, ResultEnvelope};
