//! Person directory service - CRUD, in-memory search/sort, and tabular
//! export of person records.

use chrono::{DateTime, Utc};
use roster_tabular::{Cell, Sheet};
use uuid::Uuid;

use crate::{
    config::ExportConfig,
    db::{DirectoryStore, PersonRecord},
    models::{
        age_in_days, Gender, PersonAddRequest, PersonResponse, PersonUpdateRequest, SearchField,
        SortField, SortOrder,
    },
    Error, Result,
};

/// Fixed column set shared by the CSV, workbook, and PDF exports.
const EXPORT_COLUMNS: [&str; 8] = [
    "Name",
    "Email",
    "Date of Birth",
    "Age",
    "Gender",
    "Country",
    "Address",
    "Receive Newsletters",
];

pub struct PersonService {
    store: DirectoryStore,
    export: ExportConfig,
}

impl PersonService {
    pub fn new(store: DirectoryStore, export: ExportConfig) -> Self {
        Self { store, export }
    }

    /// Create a person with a server-assigned identifier and return the
    /// response with the resolved country name and derived age.
    pub async fn add_person(&self, request: PersonAddRequest) -> Result<PersonResponse> {
        let errors = request.validate();
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        let id = Uuid::new_v4().to_string();
        let record = PersonRecord {
            id: id.clone(),
            name: request.name.unwrap_or_default(),
            email: request.email.unwrap_or_default(),
            date_of_birth: request.date_of_birth,
            gender: request.gender.unwrap_or(Gender::Other).as_str().to_string(),
            country_id: request.country_id,
            country_name: None,
            address: request.address,
            receive_newsletters: request.receive_newsletters,
        };
        self.store.insert_person(&record).await?;

        tracing::info!(person = %id, "person created");

        // Read back through the join so the response carries the country name.
        self.person_by_id(&id)
            .await?
            .ok_or_else(|| Error::Internal(format!("person '{id}' missing after insert")))
    }

    pub async fn all_persons(&self) -> Result<Vec<PersonResponse>> {
        let now = Utc::now();
        let persons = self.store.all_persons().await?;
        Ok(persons
            .into_iter()
            .map(|record| to_response(record, now))
            .collect())
    }

    /// Look up a person by id. An unknown id is an empty result, not an
    /// error.
    pub async fn person_by_id(&self, id: &str) -> Result<Option<PersonResponse>> {
        let record = self.store.person_by_id(id).await?;
        Ok(record.map(|record| to_response(record, Utc::now())))
    }

    /// Overwrite all mutable fields of an existing person.
    pub async fn update_person(&self, request: PersonUpdateRequest) -> Result<PersonResponse> {
        let errors = request.validate();
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        let id = request.id.clone();
        let record = PersonRecord {
            id: id.clone(),
            name: request.name.unwrap_or_default(),
            email: request.email.unwrap_or_default(),
            date_of_birth: request.date_of_birth,
            gender: request.gender.unwrap_or(Gender::Other).as_str().to_string(),
            country_id: request.country_id,
            country_name: None,
            address: request.address,
            receive_newsletters: request.receive_newsletters,
        };

        if !self.store.update_person(&record).await? {
            return Err(Error::NotFound {
                entity: "person",
                id,
            });
        }

        self.person_by_id(&id)
            .await?
            .ok_or_else(|| Error::Internal(format!("person '{id}' missing after update")))
    }

    /// Delete a person. Returns whether a matching record existed; deleting
    /// an unknown id is not an error.
    pub async fn delete_person(&self, id: &str) -> Result<bool> {
        if id.trim().is_empty() {
            return Err(Error::validation("Person id cannot be blank"));
        }

        let deleted = self.store.delete_person(id).await?;
        if deleted {
            tracing::info!(person = %id, "person deleted");
        }
        Ok(deleted)
    }

    /// Load all persons and filter them by a named field. An unrecognized
    /// field name or empty search text yields the unfiltered set.
    pub async fn search_persons(
        &self,
        search_by: Option<&str>,
        search_text: Option<&str>,
    ) -> Result<Vec<PersonResponse>> {
        let persons = self.all_persons().await?;

        let field = search_by.and_then(SearchField::parse);
        let text = search_text.map(str::trim).filter(|t| !t.is_empty());
        match (field, text) {
            (Some(field), Some(text)) => Ok(filter_persons(persons, field, text)),
            _ => Ok(persons),
        }
    }

    /// Order an already-loaded listing by a named field. An unrecognized
    /// field name leaves the order unchanged.
    pub fn sort_persons(
        &self,
        persons: Vec<PersonResponse>,
        sort_by: Option<&str>,
        order: SortOrder,
    ) -> Vec<PersonResponse> {
        sort_persons(persons, sort_by, order)
    }

    pub async fn export_csv(&self) -> Result<Vec<u8>> {
        let persons = self.all_persons().await?;
        person_sheet(&persons, &self.export.date_format)
            .to_csv()
            .map_err(Error::Tabular)
    }

    pub async fn export_workbook(&self) -> Result<Vec<u8>> {
        let persons = self.all_persons().await?;
        person_sheet(&persons, &self.export.date_format)
            .to_workbook(&self.export.worksheet_name)
            .map_err(Error::Tabular)
    }

    pub async fn export_pdf(&self) -> Result<Vec<u8>> {
        let persons = self.all_persons().await?;
        person_sheet(&persons, &self.export.date_format)
            .to_pdf("Persons")
            .map_err(Error::Tabular)
    }
}

fn to_response(record: PersonRecord, now: DateTime<Utc>) -> PersonResponse {
    PersonResponse {
        age: age_in_days(record.date_of_birth, now),
        gender: Gender::parse(&record.gender).unwrap_or(Gender::Other),
        id: record.id,
        name: record.name,
        email: record.email,
        date_of_birth: record.date_of_birth,
        country_id: record.country_id,
        country: record.country_name,
        address: record.address,
        receive_newsletters: record.receive_newsletters,
    }
}

/// Case-insensitive substring filter on one field's string rendering.
/// A person with no value for the field is retained.
fn filter_persons(
    persons: Vec<PersonResponse>,
    field: SearchField,
    text: &str,
) -> Vec<PersonResponse> {
    let needle = text.to_lowercase();
    persons
        .into_iter()
        .filter(|person| match field.text_of(person) {
            Some(value) => value.to_lowercase().contains(&needle),
            None => true,
        })
        .collect()
}

fn sort_persons(
    mut persons: Vec<PersonResponse>,
    sort_by: Option<&str>,
    order: SortOrder,
) -> Vec<PersonResponse> {
    let Some(field) = sort_by.and_then(SortField::parse) else {
        return persons;
    };

    persons.sort_by(|a, b| {
        let ordering = field.compare(a, b);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    persons
}

fn person_sheet(persons: &[PersonResponse], date_format: &str) -> Sheet {
    let mut sheet = Sheet::new(EXPORT_COLUMNS);
    for person in persons {
        sheet.push_row(vec![
            Cell::text(person.name.clone()),
            Cell::text(person.email.clone()),
            person
                .date_of_birth
                .map(|d| Cell::Text(d.format(date_format).to_string()))
                .unwrap_or(Cell::Empty),
            person.age.map(|a| Cell::Number(a as f64)).unwrap_or(Cell::Empty),
            Cell::text(person.gender.as_str()),
            person.country.clone().map(Cell::Text).unwrap_or(Cell::Empty),
            person.address.clone().map(Cell::Text).unwrap_or(Cell::Empty),
            Cell::Bool(person.receive_newsletters),
        ]);
    }
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn person(name: &str) -> PersonResponse {
        PersonResponse {
            id: format!("id-{name}"),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 15),
            age: Some(9_000),
            gender: Gender::Female,
            country_id: None,
            country: None,
            address: None,
            receive_newsletters: false,
        }
    }

    fn names(persons: &[PersonResponse]) -> Vec<&str> {
        persons.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn filter_matches_substring_case_insensitively() {
        let persons = vec![person("Smith"), person("Norton")];
        let filtered = filter_persons(persons, SearchField::Name, "no");
        assert_eq!(names(&filtered), vec!["Norton"]);
    }

    #[test]
    fn filter_retains_persons_without_a_value_for_the_field() {
        let mut with_address = person("Smith");
        with_address.address = Some("12 Harbour Street".to_string());
        let without_address = person("Norton");

        let filtered = filter_persons(
            vec![with_address, without_address],
            SearchField::Address,
            "harbour",
        );
        assert_eq!(names(&filtered), vec!["Smith", "Norton"]);
    }

    #[test]
    fn sort_by_name_descending_is_case_insensitive() {
        let persons = vec![person("norton"), person("Smith")];
        let sorted = sort_persons(persons, Some("name"), SortOrder::Desc);
        assert_eq!(names(&sorted), vec!["Smith", "norton"]);
    }

    #[test]
    fn sort_with_unrecognized_field_keeps_the_order() {
        let persons = vec![person("Smith"), person("Norton")];
        let sorted = sort_persons(persons, Some("shoe_size"), SortOrder::Asc);
        assert_eq!(names(&sorted), vec!["Smith", "Norton"]);
    }

    #[test]
    fn sort_by_date_of_birth_uses_natural_ordering() {
        let mut older = person("Older");
        older.date_of_birth = NaiveDate::from_ymd_opt(1980, 6, 1);
        let mut younger = person("Younger");
        younger.date_of_birth = NaiveDate::from_ymd_opt(2001, 2, 3);

        let sorted = sort_persons(vec![younger, older], Some("date_of_birth"), SortOrder::Asc);
        assert_eq!(names(&sorted), vec!["Older", "Younger"]);
    }

    #[test]
    fn export_sheet_has_the_fixed_header_and_formatted_dates() {
        let mut p = person("Norton");
        p.country = Some("Japan".to_string());
        let sheet = person_sheet(&[p], "%d %m %Y");

        assert_eq!(
            sheet.columns,
            vec![
                "Name",
                "Email",
                "Date of Birth",
                "Age",
                "Gender",
                "Country",
                "Address",
                "Receive Newsletters",
            ]
        );
        assert_eq!(sheet.rows[0][2], Cell::Text("15 01 1990".to_string()));
        assert_eq!(sheet.rows[0][3], Cell::Number(9_000.0));
        assert_eq!(sheet.rows[0][6], Cell::Empty);
    }

    #[test]
    fn export_sheet_leaves_missing_dates_blank() {
        let mut p = person("Norton");
        p.date_of_birth = None;
        p.age = None;
        let sheet = person_sheet(&[p], "%d %m %Y");
        assert_eq!(sheet.rows[0][2], Cell::Empty);
        assert_eq!(sheet.rows[0][3], Cell::Empty);
    }
}
