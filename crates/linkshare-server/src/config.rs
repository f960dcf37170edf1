// File: src/config.rs
// Purpose: Configuration parsing from linkshare.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "LINKSHARE_CONFIG_PATH";

/// Environment variable overriding `[storage] data_path`
pub const DATA_PATH_ENV: &str = "LINKSHARE_DATA_PATH";

/// Environment variable switching logging to debug
pub const DEBUG_ENV: &str = "DEBUG";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Prefix of every discovered route (default: "/api/")
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the database (default: "app/data")
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    /// Only warnings and errors
    #[serde(default)]
    pub quiet: bool,

    /// Set from the `DEBUG` environment variable
    #[serde(default)]
    pub debug: bool,
}

// Default values
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_prefix() -> String {
    linkshare_router::DEFAULT_PREFIX.to_string()
}

fn default_data_path() -> PathBuf {
    PathBuf::from("app/data")
}

fn default_level() -> String {
    "info".to_string()
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            quiet: false,
            debug: false,
        }
    }
}

impl StorageConfig {
    /// Database file inside the data directory
    pub fn database_file(&self) -> PathBuf {
        self.data_path.join("linkshare.db")
    }
}

impl LoggingConfig {
    /// Level the subscriber starts with; `debug` wins over `quiet`
    pub fn effective_level(&self) -> &str {
        if self.debug {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            &self.level
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Missing file means defaults
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load from `$LINKSHARE_CONFIG_PATH`, falling back to ./linkshare.toml
    pub fn load_default() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "linkshare.toml".to_string());
        Self::load(path)
    }

    /// Apply environment overrides read through `var`
    pub fn apply_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(data_path) = var(DATA_PATH_ENV).filter(|v| !v.is_empty()) {
            self.storage.data_path = PathBuf::from(data_path);
        }
        if var(DEBUG_ENV).is_some_and(|v| !v.is_empty()) {
            self.logging.debug = true;
        }
        self
    }

    /// Apply overrides from the process environment
    pub fn with_process_env(self) -> Self {
        self.apply_env(|name| std::env::var(name).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.routing.prefix, "/api/");
        assert_eq!(config.storage.data_path, PathBuf::from("app/data"));
        assert_eq!(
            config.storage.database_file(),
            PathBuf::from("app/data/linkshare.db")
        );
        assert_eq!(config.logging.effective_level(), "info");
    }

    #[test]
    fn test_empty_config() {
        let config = toml::from_str::<Config>("").unwrap_or_default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.routing.prefix, "/api/");
    }

    #[test]
    fn test_partial_sections() {
        let toml = r#"
            [server]
            port = 8080

            [routing]
            prefix = "/v1/"

            [logging]
            quiet = true
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.routing.prefix, "/v1/");
        assert_eq!(config.logging.effective_level(), "warn");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linkshare.toml");
        fs::write(&path, "[server\nport = ").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("linkshare.toml"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> =
            HashMap::from([(DATA_PATH_ENV, "/tmp/shares"), (DEBUG_ENV, "1")]);
        let config = Config::default().apply_env(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.storage.data_path, PathBuf::from("/tmp/shares"));
        assert!(config.logging.debug);
        assert_eq!(config.logging.effective_level(), "debug");
    }

    #[test]
    fn test_empty_debug_is_ignored() {
        let config = Config::default().apply_env(|name| (name == DEBUG_ENV).then(String::new));
        assert!(!config.logging.debug);
    }
}
