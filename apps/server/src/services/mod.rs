//! Business logic layer
//!
//! The two directory services validate requests, apply business rules, and
//! reshape storage rows into response objects.

pub mod countries;
pub mod persons;

pub use countries::CountryService;
pub use persons::PersonService;
