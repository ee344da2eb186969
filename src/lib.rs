//! devcamper - bootcamp directory REST API
//!
//! Advanced list queries (filtering, projection, sorting, pagination,
//! relation population) over bootcamps, courses, reviews and users.

pub mod auth;
pub mod cli;
pub mod config;
pub mod geo;
pub mod http_server;
pub mod logging;
pub mod models;
pub mod query;
pub mod store;
