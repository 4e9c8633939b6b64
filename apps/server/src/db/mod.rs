//! Storage layer
//!
//! SQLite (embedded) via sqlx. Uniqueness and the tax-identification check
//! constraint live in the schema; see `migrations/`.

pub mod store;

pub use store::{CountryRecord, DirectoryStore, PersonRecord};
