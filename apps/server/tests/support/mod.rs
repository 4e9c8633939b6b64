//! Shared helpers for integration tests.
//!
//! Each test builds the full router over a single-connection in-memory
//! SQLite pool and issues in-process requests through `tower::ServiceExt`.

#![allow(dead_code)]

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use roster::{
    api::create_router,
    config::{Config, DatabaseConfig, ExportConfig, LoggingConfig, ServerConfig},
    state::AppState,
};
use serde_json::json;
use tower::ServiceExt;

pub struct TestApp {
    router: axum::Router,
}

impl TestApp {
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(mutate: impl FnOnce(&mut Config)) -> anyhow::Result<Self> {
        let mut config = test_config();
        mutate(&mut config);

        let state = AppState::new(config).await?;
        Ok(Self {
            router: create_router(state),
        })
    }

    /// Issue an in-process JSON request and parse the JSON response body.
    pub async fn request_json(
        &self,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let request = match body {
            Some(value) => Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&value)?))?,
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, value))
    }

    /// GET a binary endpoint; returns status, response headers, and bytes.
    pub async fn get_bytes(&self, uri: &str) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())?;

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, headers, bytes))
    }

    /// POST a single file as a `multipart/form-data` field named `file`.
    pub async fn post_multipart(
        &self,
        uri: &str,
        filename: &str,
        file_bytes: &[u8],
    ) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let boundary = "roster-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\n\
                 Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(file_bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))?;

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, value))
    }
}

fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: vec!["*".to_string()],
            max_upload_bytes: 5 * 1024 * 1024,
        },
        database: DatabaseConfig {
            // A single connection keeps the in-memory database alive and
            // shared for the lifetime of the test app.
            url: "sqlite::memory:".to_string(),
            pool_max_size: 1,
            pool_timeout_seconds: 5,
        },
        export: ExportConfig::default(),
        logging: LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

/// Create a country through the API and return its id.
pub async fn seed_country(app: &TestApp, name: &str) -> anyhow::Result<String> {
    let (status, body) = app
        .request_json(Method::POST, "/countries", Some(json!({ "name": name })))
        .await?;
    anyhow::ensure!(
        status == StatusCode::CREATED,
        "seeding country '{name}' failed with {status}"
    );
    Ok(body["id"].as_str().unwrap_or_default().to_string())
}

/// A complete, valid person payload.
pub fn person_payload(name: &str, email: &str, country_id: &str) -> serde_json::Value {
    json!({
        "name": name,
        "email": email,
        "date_of_birth": "1990-01-15",
        "gender": "female",
        "country_id": country_id,
        "address": "12 Harbour Street",
        "receive_newsletters": true,
    })
}

/// Create a person through the API and return the full response body.
pub async fn seed_person(
    app: &TestApp,
    name: &str,
    country_id: &str,
) -> anyhow::Result<serde_json::Value> {
    let email = format!("{}@example.com", name.to_lowercase());
    let (status, body) = app
        .request_json(
            Method::POST,
            "/persons",
            Some(person_payload(name, &email, country_id)),
        )
        .await?;
    anyhow::ensure!(
        status == StatusCode::CREATED,
        "seeding person '{name}' failed with {status}"
    );
    Ok(body)
}
