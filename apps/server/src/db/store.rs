//! SQLite-backed storage for countries and persons.

use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};

use crate::{Error, Result};

/// A country row as stored.
#[derive(Debug, Clone)]
pub struct CountryRecord {
    pub id: String,
    pub name: String,
}

/// A person row as stored, with the country name resolved by join.
#[derive(Debug, Clone)]
pub struct PersonRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: String,
    pub country_id: Option<String>,
    pub country_name: Option<String>,
    pub address: Option<String>,
    pub receive_newsletters: bool,
}

#[derive(Clone)]
pub struct DirectoryStore {
    pool: SqlitePool,
}

impl DirectoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a country. The `countries.name` unique constraint is the
    /// single arbiter of duplicates; a violation surfaces as `Conflict`.
    pub async fn insert_country(&self, id: &str, name: &str) -> Result<()> {
        sqlx::query("INSERT INTO countries (id, name) VALUES (?1, ?2)")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::Conflict(format!("Country name '{name}' already exists"))
                } else {
                    Error::Database(e)
                }
            })?;
        Ok(())
    }

    /// Insert a country unless the name is already present. Returns whether
    /// a row was inserted.
    pub async fn insert_country_if_absent(&self, id: &str, name: &str) -> Result<bool> {
        let result =
            sqlx::query("INSERT INTO countries (id, name) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING")
                .bind(id)
                .bind(name)
                .execute(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn all_countries(&self) -> Result<Vec<CountryRecord>> {
        let rows = sqlx::query("SELECT id, name FROM countries")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| CountryRecord {
                id: r.get("id"),
                name: r.get("name"),
            })
            .collect())
    }

    pub async fn country_by_id(&self, id: &str) -> Result<Option<CountryRecord>> {
        let row = sqlx::query("SELECT id, name FROM countries WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|r| CountryRecord {
            id: r.get("id"),
            name: r.get("name"),
        }))
    }

    pub async fn insert_person(&self, record: &PersonRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO persons (id, name, email, date_of_birth, gender, country_id, address, receive_newsletters)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(record.date_of_birth)
        .bind(&record.gender)
        .bind(&record.country_id)
        .bind(&record.address)
        .bind(record.receive_newsletters)
        .execute(&self.pool)
        .await
        .map_err(map_person_write_error)?;
        Ok(())
    }

    pub async fn all_persons(&self) -> Result<Vec<PersonRecord>> {
        let rows = sqlx::query(
            "SELECT p.id, p.name, p.email, p.date_of_birth, p.gender, p.country_id,
                    c.name AS country_name, p.address, p.receive_newsletters
             FROM persons p
             LEFT JOIN countries c ON c.id = p.country_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(person_from_row).collect())
    }

    pub async fn person_by_id(&self, id: &str) -> Result<Option<PersonRecord>> {
        let row = sqlx::query(
            "SELECT p.id, p.name, p.email, p.date_of_birth, p.gender, p.country_id,
                    c.name AS country_name, p.address, p.receive_newsletters
             FROM persons p
             LEFT JOIN countries c ON c.id = p.country_id
             WHERE p.id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(person_from_row))
    }

    /// Overwrite all mutable fields of a person. Returns whether a row
    /// matched the identifier.
    pub async fn update_person(&self, record: &PersonRecord) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE persons
             SET name = ?2, email = ?3, date_of_birth = ?4, gender = ?5,
                 country_id = ?6, address = ?7, receive_newsletters = ?8
             WHERE id = ?1",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(record.date_of_birth)
        .bind(&record.gender)
        .bind(&record.country_id)
        .bind(&record.address)
        .bind(record.receive_newsletters)
        .execute(&self.pool)
        .await
        .map_err(map_person_write_error)?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a person. Returns whether a row existed.
    pub async fn delete_person(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM persons WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }
}

fn person_from_row(r: sqlx::sqlite::SqliteRow) -> PersonRecord {
    PersonRecord {
        id: r.get("id"),
        name: r.get("name"),
        email: r.get("email"),
        date_of_birth: r.get("date_of_birth"),
        gender: r.get("gender"),
        country_id: r.get("country_id"),
        country_name: r.get("country_name"),
        address: r.get("address"),
        receive_newsletters: r.get("receive_newsletters"),
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Person writes can only trip the `country_id` foreign key; surface that as
/// a field-level validation failure rather than a storage error.
fn map_person_write_error(e: sqlx::Error) -> Error {
    match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            Error::validation("Given country id doesn't exist")
        }
        _ => Error::Database(e),
    }
}
