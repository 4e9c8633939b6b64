//! Error taxonomy for the directory server.
//!
//! Services return [`Error`]; the axum layer converts each variant into an
//! HTTP status plus a JSON problem body via [`IntoResponse`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed required input. Carries one message per field.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A unique key already exists (currently: country names).
    #[error("{0}")]
    Conflict(String),

    /// The referenced identifier does not exist.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// An uploaded file was rejected before or during parsing.
    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("tabular format error: {0}")]
    Tabular(roster_tabular::TabularError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Single-message validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Database(_) | Error::Tabular(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::Conflict(_) => "conflict",
            Error::NotFound { .. } => "not_found",
            Error::InvalidUpload(_) => "invalid_upload",
            Error::Database(_) | Error::Tabular(_) | Error::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let messages = match &self {
            Error::Validation(messages) => messages.clone(),
            other => vec![other.to_string()],
        };

        let body = json!({
            "error": self.kind(),
            "messages": messages,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_joins_field_messages() {
        let err = Error::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "validation failed: a; b");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            Error::Conflict("dup".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::NotFound { entity: "person", id: "x".into() }.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::InvalidUpload("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
