//! Country directory service - CRUD and bulk import for country records.

use roster_tabular::TabularError;
use uuid::Uuid;

use crate::{
    db::{CountryRecord, DirectoryStore},
    models::{CountryAddRequest, CountryResponse},
    Error, Result,
};

pub struct CountryService {
    store: DirectoryStore,
    import_worksheet: String,
}

impl CountryService {
    pub fn new(store: DirectoryStore, import_worksheet: String) -> Self {
        Self {
            store,
            import_worksheet,
        }
    }

    /// Create a country with a server-assigned identifier.
    ///
    /// Duplicate names are rejected by the `countries.name` unique
    /// constraint and surface as `Conflict`.
    pub async fn add_country(&self, request: CountryAddRequest) -> Result<CountryResponse> {
        let Some(name) = request.trimmed_name() else {
            return Err(Error::validation("Country name cannot be blank"));
        };

        let id = Uuid::new_v4().to_string();
        self.store.insert_country(&id, name).await?;

        tracing::info!(country = name, "country created");

        Ok(CountryResponse {
            id,
            name: name.to_string(),
        })
    }

    pub async fn all_countries(&self) -> Result<Vec<CountryResponse>> {
        let countries = self.store.all_countries().await?;
        Ok(countries.into_iter().map(to_response).collect())
    }

    /// Look up a country by id. An unknown id is an empty result, not an
    /// error.
    pub async fn country_by_id(&self, id: &str) -> Result<Option<CountryResponse>> {
        Ok(self.store.country_by_id(id).await?.map(to_response))
    }

    /// Bulk-import country names from an `.xlsx` workbook.
    ///
    /// Reads the first column of the configured worksheet, skipping the
    /// header row. Each name is inserted only if it is not already present;
    /// rows land one at a time, so a name repeated within the file is
    /// admitted once. Returns the number of rows inserted.
    pub async fn import_workbook(&self, bytes: &[u8]) -> Result<u64> {
        let names = roster_tabular::read_text_column(bytes, &self.import_worksheet)
            .map_err(|e| match e {
                e @ (TabularError::MissingSheet(_) | TabularError::WorkbookRead(_)) => {
                    Error::InvalidUpload(e.to_string())
                }
                other => Error::Tabular(other),
            })?;

        let mut inserted = 0u64;
        for name in names {
            let id = Uuid::new_v4().to_string();
            if self.store.insert_country_if_absent(&id, &name).await? {
                inserted += 1;
            } else {
                tracing::debug!(country = %name, "import skipped existing country");
            }
        }

        tracing::info!(inserted, "country import finished");
        Ok(inserted)
    }
}

fn to_response(record: CountryRecord) -> CountryResponse {
    CountryResponse {
        id: record.id,
        name: record.name,
    }
}
