//! HTTP interface
//!
//! Routing, request binding, and the translation of service results into
//! HTTP responses.

pub mod handlers;
pub mod routes;

pub use routes::create_router;
