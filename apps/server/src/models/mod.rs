//! Request/response types for the two directory entities.

pub mod country;
pub mod person;

pub use country::{CountryAddRequest, CountryResponse};
pub use person::{
    age_in_days, Gender, PersonAddRequest, PersonResponse, PersonUpdateRequest, SearchField,
    SortField, SortOrder,
};
