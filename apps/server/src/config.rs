//! Configuration management for the directory server.
//!
//! Values are resolved in three layers: compiled defaults, an optional
//! `config.{yaml,toml,json}` file in the working directory, and
//! `ROSTER__SECTION__KEY` environment variables (e.g.
//! `ROSTER__SERVER__PORT=9090`).

use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Maximum request body size in bytes. Bounds workbook uploads, which are
    /// parsed fully in memory.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
    #[serde(default = "default_pool_timeout")]
    pub pool_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// strftime pattern for dates in CSV and workbook exports.
    #[serde(default = "default_export_date_format")]
    pub date_format: String,
    /// Worksheet name used by the person export workbook.
    #[serde(default = "default_export_worksheet")]
    pub worksheet_name: String,
    /// Worksheet name expected in country import workbooks.
    #[serde(default = "default_import_worksheet")]
    pub import_worksheet: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            date_format: default_export_date_format(),
            worksheet_name: default_export_worksheet(),
            import_worksheet: default_import_worksheet(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter directive, e.g. "info" or "roster=debug,sqlx=warn".
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" for human-readable output, "json" for structured logs.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            // Start with defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("server.cors_origins", default_cors_origins())?
            .set_default("server.max_upload_bytes", default_max_upload_bytes() as i64)?
            .set_default("database.url", default_database_url())?
            .set_default("database.pool_max_size", default_pool_max_size())?
            .set_default("database.pool_timeout_seconds", default_pool_timeout())?
            .set_default("export.date_format", default_export_date_format())?
            .set_default("export.worksheet_name", default_export_worksheet())?
            .set_default("export.import_worksheet", default_import_worksheet())?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?
            // Optional config file in the working directory
            .add_source(config::File::with_name("config").required(false))
            // Environment overrides: ROSTER__SERVER__PORT etc.
            .add_source(
                config::Environment::with_prefix("ROSTER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be non-zero".to_string());
        }
        if self.server.max_upload_bytes == 0 {
            return Err("server.max_upload_bytes must be non-zero".to_string());
        }
        if self.database.pool_max_size == 0 {
            return Err("database.pool_max_size must be at least 1".to_string());
        }
        if self.export.date_format.is_empty() {
            return Err("export.date_format must not be empty".to_string());
        }
        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            other => {
                return Err(format!(
                    "logging.format must be 'pretty' or 'json', got '{other}'"
                ));
            }
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid listen address: {e}"))
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_database_url() -> String {
    "sqlite://roster.db".to_string()
}

fn default_pool_max_size() -> u32 {
    5
}

fn default_pool_timeout() -> u64 {
    30
}

fn default_export_date_format() -> String {
    "%d %m %Y".to_string()
}

fn default_export_worksheet() -> String {
    "PersonsSheet".to_string()
}

fn default_import_worksheet() -> String {
    "Countries".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                cors_origins: default_cors_origins(),
                max_upload_bytes: default_max_upload_bytes(),
            },
            database: DatabaseConfig {
                url: default_database_url(),
                pool_max_size: default_pool_max_size(),
                pool_timeout_seconds: default_pool_timeout(),
            },
            export: ExportConfig::default(),
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(base_config().validate(), Ok(()));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let mut config = base_config();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let mut config = base_config();
        config.database.pool_max_size = 0;
        assert!(config.validate().is_err());
    }
}
