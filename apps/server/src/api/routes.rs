//! Router assembly.

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api::handlers::{countries, health, persons};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);
    let max_body = state.config.server.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health))
        // Countries
        .route(
            "/countries",
            get(countries::list_countries).post(countries::add_country),
        )
        .route("/countries/import", post(countries::import_countries))
        .route("/countries/:id", get(countries::get_country))
        // Persons
        .route(
            "/persons",
            get(persons::list_persons).post(persons::add_person),
        )
        .route("/persons/export/csv", get(persons::export_csv))
        .route("/persons/export/xlsx", get(persons::export_workbook))
        .route("/persons/export/pdf", get(persons::export_pdf))
        .route(
            "/persons/:id",
            get(persons::get_person)
                .put(persons::update_person)
                .delete(persons::delete_person),
        )
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
