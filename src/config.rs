//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::query::DEFAULT_LINE_LIMIT;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Log store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Root directory of replay files
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_project")]
    pub project: String,

    #[serde(default = "default_log_store")]
    pub log_store: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("slsframe").to_string_lossy().to_string())
        .unwrap_or_else(|| "./slsframe_data".to_string())
}

fn default_project() -> String {
    "default".to_string()
}

fn default_log_store() -> String {
    "logs".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            project: default_project(),
            log_store: default_log_store(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty allows any
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_max_body_size() -> usize {
    10 * 1024 * 1024 // 10 MB
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Query execution configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Records requested per search
    #[serde(default = "default_line_limit")]
    pub line_limit: usize,
}

fn default_line_limit() -> usize {
    DEFAULT_LINE_LIMIT
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            line_limit: default_line_limit(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("slsframe").join("config.toml")),
            Some(PathBuf::from("/etc/slsframe/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Check values that serde defaults cannot guard
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.project.trim().is_empty() {
            return Err(ConfigError::Invalid("source.project must not be empty".to_string()));
        }
        if self.source.log_store.trim().is_empty() {
            return Err(ConfigError::Invalid("source.log_store must not be empty".to_string()));
        }
        if self.query.line_limit == 0 {
            return Err(ConfigError::Invalid("query.line_limit must be positive".to_string()));
        }
        Ok(())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Source overrides
        if let Some(data_dir) = var("SLSFRAME_DATA_DIR") {
            self.source.data_dir = data_dir;
        }
        if let Some(project) = var("SLSFRAME_PROJECT") {
            self.source.project = project;
        }
        if let Some(log_store) = var("SLSFRAME_LOGSTORE") {
            self.source.log_store = log_store;
        }

        // Query overrides
        if let Some(limit) = var("SLSFRAME_LINE_LIMIT").and_then(|s| s.parse().ok()) {
            self.query.line_limit = limit;
        }

        // API overrides
        if let Some(host) = var("SLSFRAME_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("SLSFRAME_API_PORT").and_then(|s| s.parse().ok()) {
            self.api.port = port;
        }

        // Logging overrides
        if let Some(level) = var("SLSFRAME_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("SLSFRAME_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# slsframe Configuration
#
# Environment variables override these settings:
# - SLSFRAME_DATA_DIR
# - SLSFRAME_PROJECT
# - SLSFRAME_LOGSTORE
# - SLSFRAME_LINE_LIMIT
# - SLSFRAME_API_HOST
# - SLSFRAME_API_PORT
# - SLSFRAME_LOG_LEVEL
# - SLSFRAME_LOG_FORMAT

[source]
# Directory holding replay files laid out as {project}/{log_store}.json
data_dir = "~/.local/share/slsframe"

# Project and log store to search
project = "default"
log_store = "logs"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8082

# Allowed CORS origins (empty allows any)
cors_origins = []

# Maximum request body size (bytes)
max_body_size = 10485760

[query]
# Records requested per search
line_limit = 500

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
