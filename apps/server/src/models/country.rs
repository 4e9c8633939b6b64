//! Country request/response types.

use serde::{Deserialize, Serialize};

/// Payload for creating a country.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryAddRequest {
    pub name: Option<String>,
}

impl CountryAddRequest {
    /// The trimmed country name, if one was supplied and is non-blank.
    pub fn trimmed_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryResponse {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_missing_names_are_rejected() {
        assert_eq!(CountryAddRequest::default().trimmed_name(), None);
        let blank = CountryAddRequest {
            name: Some("   ".to_string()),
        };
        assert_eq!(blank.trimmed_name(), None);
    }

    #[test]
    fn names_are_trimmed() {
        let request = CountryAddRequest {
            name: Some("  Japan ".to_string()),
        };
        assert_eq!(request.trimmed_name(), Some("Japan"));
    }
}
