//! Person handlers.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::{PersonAddRequest, PersonUpdateRequest, SortOrder},
    state::AppState,
    Error, Result,
};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Default, Deserialize)]
pub struct PersonListQuery {
    pub search_by: Option<String>,
    pub search_text: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Filtered and sorted person listing. Defaults to sorting by name
/// ascending; unrecognized search/sort fields fall back to the full set in
/// its loaded order.
pub async fn list_persons(
    State(state): State<AppState>,
    Query(query): Query<PersonListQuery>,
) -> Result<Response> {
    let persons = state
        .person_service
        .search_persons(query.search_by.as_deref(), query.search_text.as_deref())
        .await?;

    let sort_by = query.sort_by.as_deref().unwrap_or("name");
    let order = query
        .sort_order
        .as_deref()
        .and_then(SortOrder::parse)
        .unwrap_or_default();
    let sorted = state.person_service.sort_persons(persons, Some(sort_by), order);

    Ok((StatusCode::OK, Json(sorted)).into_response())
}

pub async fn add_person(
    State(state): State<AppState>,
    Json(request): Json<PersonAddRequest>,
) -> Result<Response> {
    let person = state.person_service.add_person(request).await?;
    Ok((StatusCode::CREATED, Json(person)).into_response())
}

pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    match state.person_service.person_by_id(&id).await? {
        Some(person) => Ok((StatusCode::OK, Json(person)).into_response()),
        None => Err(Error::NotFound {
            entity: "person",
            id,
        }),
    }
}

pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut request): Json<PersonUpdateRequest>,
) -> Result<Response> {
    if request.id.is_empty() {
        request.id = id;
    } else if request.id != id {
        return Err(Error::validation(
            "person id in the body does not match the URL",
        ));
    }

    let person = state.person_service.update_person(request).await?;
    Ok((StatusCode::OK, Json(person)).into_response())
}

pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let deleted = state.person_service.delete_person(&id).await?;
    Ok((StatusCode::OK, Json(json!({ "deleted": deleted }))).into_response())
}

pub async fn export_csv(State(state): State<AppState>) -> Result<Response> {
    let bytes = state.person_service.export_csv().await?;
    Ok(download_response("text/csv", "persons.csv", bytes))
}

pub async fn export_workbook(State(state): State<AppState>) -> Result<Response> {
    let bytes = state.person_service.export_workbook().await?;
    Ok(download_response(XLSX_CONTENT_TYPE, "persons.xlsx", bytes))
}

pub async fn export_pdf(State(state): State<AppState>) -> Result<Response> {
    let bytes = state.person_service.export_pdf().await?;
    Ok(download_response("application/pdf", "persons.pdf", bytes))
}

fn download_response(content_type: &str, filename: &str, bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}
