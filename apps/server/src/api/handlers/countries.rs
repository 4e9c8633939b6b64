//! Country handlers.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{models::CountryAddRequest, state::AppState, Error, Result};

pub async fn list_countries(State(state): State<AppState>) -> Result<Response> {
    let countries = state.country_service.all_countries().await?;
    Ok((StatusCode::OK, Json(countries)).into_response())
}

pub async fn add_country(
    State(state): State<AppState>,
    Json(request): Json<CountryAddRequest>,
) -> Result<Response> {
    let country = state.country_service.add_country(request).await?;
    Ok((StatusCode::CREATED, Json(country)).into_response())
}

pub async fn get_country(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    match state.country_service.country_by_id(&id).await? {
        Some(country) => Ok((StatusCode::OK, Json(country)).into_response()),
        None => Err(Error::NotFound {
            entity: "country",
            id,
        }),
    }
}

/// Bulk-import countries from a multipart `.xlsx` upload.
///
/// Only the `file` field is consumed; the extension check runs before any
/// parsing so oversized or mislabeled uploads fail cheaply.
pub async fn import_countries(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidUpload(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if !filename.to_lowercase().ends_with(".xlsx") {
            return Err(Error::InvalidUpload(format!(
                "only .xlsx workbooks are accepted, got '{filename}'"
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidUpload(e.to_string()))?;
        let inserted = state.country_service.import_workbook(&bytes).await?;

        return Ok((StatusCode::OK, Json(json!({ "inserted": inserted }))).into_response());
    }

    Err(Error::InvalidUpload(
        "multipart field 'file' is required".to_string(),
    ))
}
