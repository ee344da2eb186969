//! # Database
//!
//! The four collections the API serves, plus initial-data loading.

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::collection::Collection;
use super::errors::StoreResult;
use super::memory::MemoryCollection;

/// Initial records, one array per collection
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub bootcamps: Vec<Value>,
    #[serde(default)]
    pub courses: Vec<Value>,
    #[serde(default)]
    pub reviews: Vec<Value>,
    #[serde(default)]
    pub users: Vec<Value>,
}

/// All collections of the API
#[derive(Debug)]
pub struct Database {
    pub bootcamps: MemoryCollection,
    pub courses: MemoryCollection,
    pub reviews: MemoryCollection,
    pub users: MemoryCollection,
}

impl Database {
    pub fn new() -> Self {
        Self {
            bootcamps: MemoryCollection::new("bootcamps"),
            courses: MemoryCollection::new("courses"),
            reviews: MemoryCollection::new("reviews"),
            users: MemoryCollection::new("users"),
        }
    }

    /// Insert seed records as-is. Derived fields are the caller's concern.
    pub async fn seed(&self, data: SeedData) -> StoreResult<()> {
        let counts = (
            data.users.len(),
            data.bootcamps.len(),
            data.courses.len(),
            data.reviews.len(),
        );

        for doc in data.users {
            self.users.insert(doc).await?;
        }
        for doc in data.bootcamps {
            self.bootcamps.insert(doc).await?;
        }
        for doc in data.courses {
            self.courses.insert(doc).await?;
        }
        for doc in data.reviews {
            self.reviews.insert(doc).await?;
        }

        info!(
            users = counts.0,
            bootcamps = counts.1,
            courses = counts.2,
            reviews = counts.3,
            "seeded database"
        );
        Ok(())
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}
