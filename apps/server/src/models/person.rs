//! Person request/response types and the typed search/sort field sets.

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Rendering used when matching search text against a date of birth.
pub const SEARCH_DATE_FORMAT: &str = "%d %B %Y";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload for creating a person. Every field is optional at the wire level;
/// [`PersonAddRequest::validate`] reports what is missing, one message per
/// field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonAddRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub country_id: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub receive_newsletters: bool,
}

impl PersonAddRequest {
    pub fn validate(&self) -> Vec<String> {
        field_errors(
            self.name.as_deref(),
            self.email.as_deref(),
            self.date_of_birth,
            self.gender,
            self.country_id.as_deref(),
        )
    }
}

/// Payload for updating a person. Carries the same field set as
/// [`PersonAddRequest`] plus the target identifier; every mutable field is
/// overwritten on update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonUpdateRequest {
    #[serde(default)]
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub country_id: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub receive_newsletters: bool,
}

impl PersonUpdateRequest {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.id.trim().is_empty() {
            errors.push("Person id cannot be blank".to_string());
        }
        errors.extend(field_errors(
            self.name.as_deref(),
            self.email.as_deref(),
            self.date_of_birth,
            self.gender,
            self.country_id.as_deref(),
        ));
        errors
    }
}

fn field_errors(
    name: Option<&str>,
    email: Option<&str>,
    date_of_birth: Option<NaiveDate>,
    gender: Option<Gender>,
    country_id: Option<&str>,
) -> Vec<String> {
    let mut errors = Vec::new();

    if name.map(str::trim).filter(|n| !n.is_empty()).is_none() {
        errors.push("Person name cannot be blank".to_string());
    }

    match email.map(str::trim).filter(|e| !e.is_empty()) {
        None => errors.push("Email cannot be blank".to_string()),
        Some(email) if !EMAIL_RE.is_match(email) => {
            errors.push("Email value should be valid".to_string());
        }
        Some(_) => {}
    }

    if date_of_birth.is_none() {
        errors.push("Please supply date of birth".to_string());
    }

    if gender.is_none() {
        errors.push("Gender cannot be blank".to_string());
    }

    if country_id.map(str::trim).filter(|c| !c.is_empty()).is_none() {
        errors.push("Please select a country".to_string());
    }

    errors
}

/// A person as returned to callers: stored fields, the resolved country
/// name, and the derived age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub age: Option<i64>,
    pub gender: Gender,
    pub country_id: Option<String>,
    pub country: Option<String>,
    pub address: Option<String>,
    pub receive_newsletters: bool,
}

/// Age as the rounded count of days elapsed since the date of birth.
///
/// This is a day count, not calendar years; see DESIGN.md.
pub fn age_in_days(date_of_birth: Option<NaiveDate>, now: DateTime<Utc>) -> Option<i64> {
    let midnight = date_of_birth?.and_hms_opt(0, 0, 0)?;
    let elapsed = now.naive_utc().signed_duration_since(midnight);
    Some((elapsed.num_seconds() as f64 / 86_400.0).round() as i64)
}

/// Fields a person listing can be filtered on.
///
/// Parsing is the only place an unrecognized wire name can appear; a failed
/// parse means "no filter", and every variant below must be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Name,
    Email,
    DateOfBirth,
    Gender,
    Country,
    Address,
}

impl SearchField {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(SearchField::Name),
            "email" => Some(SearchField::Email),
            "date_of_birth" => Some(SearchField::DateOfBirth),
            "gender" => Some(SearchField::Gender),
            "country" => Some(SearchField::Country),
            "address" => Some(SearchField::Address),
            _ => None,
        }
    }

    /// The string rendering matched against search text, or `None` when the
    /// person has no value for this field.
    pub fn text_of(&self, person: &PersonResponse) -> Option<String> {
        match self {
            SearchField::Name => Some(person.name.clone()),
            SearchField::Email => Some(person.email.clone()),
            SearchField::DateOfBirth => person
                .date_of_birth
                .map(|d| d.format(SEARCH_DATE_FORMAT).to_string()),
            SearchField::Gender => Some(person.gender.to_string()),
            SearchField::Country => person.country.clone(),
            SearchField::Address => person.address.clone(),
        }
    }
}

/// Fields a person listing can be ordered by: the searchable set plus the
/// derived age and the newsletter flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Email,
    DateOfBirth,
    Age,
    Gender,
    Country,
    Address,
    ReceiveNewsletters,
}

impl SortField {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(SortField::Name),
            "email" => Some(SortField::Email),
            "date_of_birth" => Some(SortField::DateOfBirth),
            "age" => Some(SortField::Age),
            "gender" => Some(SortField::Gender),
            "country" => Some(SortField::Country),
            "address" => Some(SortField::Address),
            "receive_newsletters" => Some(SortField::ReceiveNewsletters),
            _ => None,
        }
    }

    /// Ascending comparison between two persons on this field.
    /// Text fields compare case-insensitively; date, age, and the newsletter
    /// flag use their natural ordering.
    pub fn compare(&self, a: &PersonResponse, b: &PersonResponse) -> Ordering {
        match self {
            SortField::Name => cmp_text(&a.name, &b.name),
            SortField::Email => cmp_text(&a.email, &b.email),
            SortField::DateOfBirth => a.date_of_birth.cmp(&b.date_of_birth),
            SortField::Age => a.age.cmp(&b.age),
            SortField::Gender => cmp_text(a.gender.as_str(), b.gender.as_str()),
            SortField::Country => cmp_opt_text(a.country.as_deref(), b.country.as_deref()),
            SortField::Address => cmp_opt_text(a.address.as_deref(), b.address.as_deref()),
            SortField::ReceiveNewsletters => a.receive_newsletters.cmp(&b.receive_newsletters),
        }
    }
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn cmp_opt_text(a: Option<&str>, b: Option<&str>) -> Ordering {
    a.map(str::to_lowercase).cmp(&b.map(str::to_lowercase))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "ASC" => Some(SortOrder::Asc),
            "DESC" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}
