use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Postgres (`postgres://...`) or SQLite (`sqlite://...?mode=rwc`) URL.
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory of the content-addressed byte store.
    pub data_dir: PathBuf,
    /// Largest single upload accepted, in bytes.
    pub max_blob_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub gemini: GeminiConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "postgres://localhost:5432/libras_db")?
            .set_default("database.max_connections", 20)?
            .set_default("storage.data_dir", "./data/blobs")?
            .set_default("storage.max_blob_size", 32 * 1024 * 1024)?
            .set_default("gemini.api_key", "")?
            .set_default("gemini.model", "models/gemini-flash-latest")?
            .set_default(
                "gemini.endpoint",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("gemini.temperature", 0.2)?
            .set_default("gemini.max_output_tokens", 512)?
            .set_default("gemini.timeout_secs", 60)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., LIBRAS__GEMINI__API_KEY)
            .add_source(Environment::with_prefix("LIBRAS").separator("__"))
            .build()?;

        let config: Self = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.gemini.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "gemini.api_key must be set (LIBRAS__GEMINI__API_KEY)".into(),
            ));
        }
        if self.storage.max_blob_size == 0 {
            return Err(ConfigError::Message(
                "storage.max_blob_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
