//! # Models
//!
//! Resource semantics for bootcamps, courses, reviews and users:
//! payload validation, derived fields, and the aggregates kept on
//! bootcamps. Records themselves stay JSON documents in the store.

pub mod bootcamp;
pub mod course;
pub mod errors;
pub mod review;
pub mod sanitize;
pub mod user;
pub mod validate;

pub use bootcamp::{slugify, BootcampInput, CAREERS};
pub use course::{average_cost, CourseInput, MinimumSkill};
pub use errors::{ModelError, ModelResult};
pub use review::{average_rating, ReviewInput};
pub use sanitize::sanitize_body;
pub use user::{public_view, LoginInput, UserInput, HIDDEN_FIELDS};
pub use validate::Mode;
