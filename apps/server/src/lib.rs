//! Roster - a person and country directory server.
//!
//! An axum HTTP layer routes into two directory services (persons and
//! countries), which sit on a sqlx/SQLite storage gateway. Bulk
//! import/export goes through the `roster-tabular` crate.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

pub use error::{Error, Result};
