use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub scorers: ScorersConfig,
}

/// Credentials and addressing for the hosted search/rerank service
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub cluster_id: String,
    pub collection: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_search_rows")]
    pub search_rows: u32,
    #[serde(default = "default_rerank_rows")]
    pub rerank_rows: u32,
    /// Directory answer files are persisted to; temp dir when unset
    pub answer_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScorersConfig {
    /// Path to the JSON scorer configuration file
    pub feature_file: Option<PathBuf>,
}

fn default_search_rows() -> u32 {
    30
}

fn default_rerank_rows() -> u32 {
    10
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            search_rows: default_search_rows(),
            rerank_rows: default_rerank_rows(),
            answer_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from the given path, or the default location,
    /// creating a default file there if none exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            let config = Config::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(&config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(config_path, toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Could not determine home directory")?;

        Ok(home.join(".rankbridge").join("config.toml"))
    }

    /// Whether the service section is filled in enough to build a client
    pub fn validate_service(&self) -> Result<()> {
        let s = &self.service;
        for (field, value) in [
            ("service.url", &s.url),
            ("service.username", &s.username),
            ("service.password", &s.password),
            ("service.cluster_id", &s.cluster_id),
            ("service.collection", &s.collection),
        ] {
            if value.is_empty() {
                anyhow::bail!("Missing '{}' in configuration", field);
            }
        }
        Ok(())
    }
}
