//! Configuration management for budgetview
//!
//! This module handles loading, validation, and management of
//! budgetview configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Transaction source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to the JSON file holding envelopes and transactions
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// User whose envelopes are shown
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// Artificial delay added to every source request, in milliseconds
    #[serde(default)]
    pub latency_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            user_id: default_user_id(),
            latency_ms: 0,
        }
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from("./data/transactions.json")
}

fn default_user_id() -> String {
    "demo".to_string()
}

/// Sort direction used for the initial table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("Invalid sort order: {}", s)),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

/// Transaction table settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Show the pagination control and fetch envelope document counts
    #[serde(default = "default_true")]
    pub pagination_enable: bool,
    /// Show the filter toolbar and make column headers sortable
    #[serde(default = "default_true")]
    pub filter_enable: bool,
    /// Initial rows per page
    #[serde(default = "default_per_page")]
    pub per_page: usize,
    /// Page sizes offered by the pagination control
    #[serde(default = "default_rows_per_page_options")]
    pub rows_per_page_options: Vec<usize>,
    /// Column the table is initially sorted by
    #[serde(default = "default_sort_field")]
    pub default_sort_field: String,
    /// Initial sort direction
    #[serde(default)]
    pub default_sort_direction: SortOrder,
    /// How long a request waits for a pending fetch before rendering, in milliseconds
    #[serde(default = "default_settle_timeout")]
    pub settle_timeout_ms: u64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            pagination_enable: true,
            filter_enable: true,
            per_page: default_per_page(),
            rows_per_page_options: default_rows_per_page_options(),
            default_sort_field: default_sort_field(),
            default_sort_direction: SortOrder::Desc,
            settle_timeout_ms: default_settle_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_per_page() -> usize {
    10
}

fn default_rows_per_page_options() -> Vec<usize> {
    vec![5, 10, 25]
}

fn default_sort_field() -> String {
    "date".to_string()
}

fn default_settle_timeout() -> u64 {
    2000
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Transaction source settings
    #[serde(default)]
    pub source: SourceConfig,
    /// Transaction table settings
    #[serde(default)]
    pub view: ViewConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|_| ConfigError::IoError)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content).map_err(|_| ConfigError::InvalidYaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.source.user_id.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "source.user_id".to_string(),
            });
        }

        if self.view.per_page == 0 {
            return Err(ConfigError::InvalidValue {
                field: "view.per_page".to_string(),
                reason: "Rows per page must be greater than 0".to_string(),
            });
        }

        if self.view.rows_per_page_options.iter().any(|&n| n == 0) {
            return Err(ConfigError::InvalidValue {
                field: "view.rows_per_page_options".to_string(),
                reason: "Every page size option must be greater than 0".to_string(),
            });
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" | "off" => {}
            other => {
                return Err(ConfigError::InvalidValue {
                    field: "logging.level".to_string(),
                    reason: format!("Unknown log level '{}'", other),
                })
            }
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Page sizes offered to the user, always including the initial size
    pub fn page_size_options(&self) -> Vec<usize> {
        let mut options = self.view.rows_per_page_options.clone();
        if !options.contains(&self.view.per_page) {
            options.push(self.view.per_page);
        }
        options.sort_unstable();
        options
    }
}
