//! Shared application state

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::{
    config::Config,
    db::DirectoryStore,
    services::{CountryService, PersonService},
    Error, Result,
};

#[derive(Debug, Clone)]
pub struct AppStateOptions {
    pub run_migrations: bool,
}

impl Default for AppStateOptions {
    fn default() -> Self {
        Self {
            run_migrations: true,
        }
    }
}

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: SqlitePool,
    pub country_service: Arc<CountryService>,
    pub person_service: Arc<PersonService>,
}

impl AppState {
    /// Initialize the application state
    pub async fn new(config: Config) -> Result<Self> {
        Self::new_with_options(config, AppStateOptions::default()).await
    }

    pub async fn new_with_options(config: Config, options: AppStateOptions) -> Result<Self> {
        tracing::info!("Initializing application state...");

        let config_arc = Arc::new(config);

        let db_pool = create_db_pool(config_arc.as_ref()).await?;

        if options.run_migrations {
            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&db_pool)
                .await
                .map_err(|e| Error::Internal(format!("Migration failed: {e}")))?;
        }

        let store = DirectoryStore::new(db_pool.clone());
        let country_service = Arc::new(CountryService::new(
            store.clone(),
            config_arc.export.import_worksheet.clone(),
        ));
        let person_service = Arc::new(PersonService::new(store, config_arc.export.clone()));

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            config: config_arc,
            db_pool,
            country_service,
            person_service,
        })
    }
}

async fn create_db_pool(config: &Config) -> Result<SqlitePool> {
    tracing::info!("Creating database connection pool...");

    let options = SqliteConnectOptions::from_str(&config.database.url)
        .map_err(Error::Database)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.pool_max_size)
        .acquire_timeout(std::time::Duration::from_secs(
            config.database.pool_timeout_seconds,
        ))
        .connect_with(options)
        .await
        .map_err(Error::Database)?;

    tracing::info!(
        max_connections = config.database.pool_max_size,
        "Database pool created"
    );

    Ok(pool)
}
