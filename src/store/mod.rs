//! # Document Store
//!
//! Collection handles the query layer runs against. The shipped
//! implementation keeps documents in memory.

pub mod collection;
pub mod database;
pub mod errors;
pub mod memory;

pub use collection::{Collection, FindQuery};
pub use database::{Database, SeedData};
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryCollection;
