use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// Connection pool upper bound. Default: 100.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Connections kept open when idle. Default: 5.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory of the filesystem payload store. Default: "./data/artifacts".
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
    /// Maximum accepted payload size in bytes. Default: 128 MB.
    #[serde(default = "default_max_artifact_size")]
    pub max_artifact_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
}

fn default_max_connections() -> u32 {
    100
}
fn default_min_connections() -> u32 {
    5
}
fn default_root_dir() -> PathBuf {
    PathBuf::from("./data/artifacts")
}
fn default_max_artifact_size() -> u64 {
    128 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            max_artifact_size: default_max_artifact_size(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("database.url", "postgres://localhost/trellis")?
            .set_default("storage.root_dir", "./data/artifacts")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., TRELLIS__DATABASE__URL)
            .add_source(Environment::with_prefix("TRELLIS").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
