//! Integration tests for the person export endpoints.

mod support;

use axum::http::{header, StatusCode};
use support::{seed_country, seed_person, TestApp};

#[tokio::test]
async fn csv_export_has_the_fixed_header_and_formatted_dates() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let country_id = seed_country(&app, "Japan").await?;
    seed_person(&app, "Norton", &country_id).await?;

    let (status, headers, bytes) = app.get_bytes("/persons/export/csv").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).map(|v| v.to_str().unwrap_or_default()),
        Some("text/csv")
    );
    assert_eq!(
        headers
            .get(header::CONTENT_DISPOSITION)
            .map(|v| v.to_str().unwrap_or_default()),
        Some("attachment; filename=\"persons.csv\"")
    );

    let text = String::from_utf8(bytes.to_vec())?;
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("Name,Email,Date of Birth,Age,Gender,Country,Address,Receive Newsletters")
    );
    let row = lines.next().expect("one person row");
    assert!(row.starts_with("Norton,norton@example.com,15 01 1990,"));
    assert!(row.ends_with(",female,Japan,12 Harbour Street,true"));
    Ok(())
}

#[tokio::test]
async fn workbook_export_round_trips_through_the_reader() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let country_id = seed_country(&app, "Japan").await?;
    seed_person(&app, "Norton", &country_id).await?;
    seed_person(&app, "Smith", &country_id).await?;

    let (status, headers, bytes) = app.get_bytes("/persons/export/xlsx").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).map(|v| v.to_str().unwrap_or_default()),
        Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
    );
    assert!(bytes.starts_with(b"PK"), "xlsx must be a zip container");

    // First column of the export sheet is the person name.
    let names = roster_tabular::read_text_column(&bytes, "PersonsSheet")?;
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Norton".to_string()));
    assert!(names.contains(&"Smith".to_string()));
    Ok(())
}

#[tokio::test]
async fn pdf_export_is_a_pdf_document() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let country_id = seed_country(&app, "Japan").await?;
    seed_person(&app, "Norton", &country_id).await?;

    let (status, headers, bytes) = app.get_bytes("/persons/export/pdf").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).map(|v| v.to_str().unwrap_or_default()),
        Some("application/pdf")
    );
    assert!(bytes.starts_with(b"%PDF"));
    Ok(())
}

#[tokio::test]
async fn exports_of_an_empty_directory_still_carry_the_header() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, _, bytes) = app.get_bytes("/persons/export/csv").await?;
    assert_eq!(status, StatusCode::OK);

    let text = String::from_utf8(bytes.to_vec())?;
    assert_eq!(
        text.lines().collect::<Vec<_>>(),
        vec!["Name,Email,Date of Birth,Age,Gender,Country,Address,Receive Newsletters"]
    );
    Ok(())
}
