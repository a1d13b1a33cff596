//! Configuration for the Baserow connection and table layout
//!
//! Loads configuration from config.yml with environment overrides

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Rows requested per page when following pagination.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Default table ids of the hosted Baserow database.
pub const DEFAULT_CLIENTS_TABLE: u64 = 683;
pub const DEFAULT_INTERACTIONS_TABLE: u64 = 682;
pub const DEFAULT_CONVERSIONS_TABLE: u64 = 685;
pub const DEFAULT_SETTINGS_TABLE: u64 = 686;

const DEFAULT_BASE_URL: &str = "https://baserow.codewave-ia.com.br/api/database/rows/table";

/// YAML config structures
#[derive(Debug, Deserialize)]
struct YamlConfig {
    baserow: Option<BaserowSection>,
    tables: Option<TablesSection>,
    limits: Option<LimitsSection>,
}

#[derive(Debug, Deserialize)]
struct BaserowSection {
    base_url: Option<String>,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TablesSection {
    clients: Option<u64>,
    interactions: Option<u64>,
    conversions: Option<u64>,
    settings: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct LimitsSection {
    page_size: Option<usize>,
}

/// Table ids of the four dashboard collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableIds {
    pub clients: u64,
    pub interactions: u64,
    pub conversions: u64,
    pub settings: u64,
}

impl Default for TableIds {
    fn default() -> Self {
        Self {
            clients: DEFAULT_CLIENTS_TABLE,
            interactions: DEFAULT_INTERACTIONS_TABLE,
            conversions: DEFAULT_CONVERSIONS_TABLE,
            settings: DEFAULT_SETTINGS_TABLE,
        }
    }
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub token: String,
    pub tables: TableIds,
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: String::new(),
            tables: TableIds::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Load from a YAML file (missing file falls back to defaults),
    /// then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Config::default();

        if path.exists() {
            let raw = fs::read_to_string(path)?;
            let yaml: YamlConfig = serde_yaml::from_str(&raw)?;
            config.apply_yaml(yaml);
        }

        config.apply_env();
        Ok(config)
    }

    /// Build purely from environment variables and defaults.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    fn apply_yaml(&mut self, yaml: YamlConfig) {
        if let Some(baserow) = yaml.baserow {
            if let Some(url) = baserow.base_url {
                self.base_url = url;
            }
            if let Some(token) = baserow.token {
                self.token = token;
            }
        }
        if let Some(tables) = yaml.tables {
            if let Some(id) = tables.clients {
                self.tables.clients = id;
            }
            if let Some(id) = tables.interactions {
                self.tables.interactions = id;
            }
            if let Some(id) = tables.conversions {
                self.tables.conversions = id;
            }
            if let Some(id) = tables.settings {
                self.tables.settings = id;
            }
        }
        if let Some(limits) = yaml.limits {
            if let Some(size) = limits.page_size {
                self.page_size = size.max(1);
            }
        }
    }

    fn apply_env(&mut self) {
        if let Ok(url) = env::var("BASEROW_BASE_URL") {
            self.base_url = url;
        }
        if let Ok(token) = env::var("BASEROW_TOKEN") {
            self.token = token;
        }
        if let Some(id) = env_u64("BASEROW_TABLE_CLIENTS") {
            self.tables.clients = id;
        }
        if let Some(id) = env_u64("BASEROW_TABLE_INTERACTIONS") {
            self.tables.interactions = id;
        }
        if let Some(id) = env_u64("BASEROW_TABLE_CONVERSIONS") {
            self.tables.conversions = id;
        }
        if let Some(id) = env_u64("BASEROW_TABLE_SETTINGS") {
            self.tables.settings = id;
        }
        if let Some(size) = env_usize("BASEROW_PAGE_SIZE") {
            self.page_size = size.max(1);
        }
    }

    /// Fail fast before any request goes out.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("base URL is empty".to_string()));
        }
        if self.token.trim().is_empty() {
            return Err(Error::Config(
                "API token is not set (baserow.token in config.yml or BASEROW_TOKEN)".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
