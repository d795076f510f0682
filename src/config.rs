//! Configuration handling
//!
//! Settings come from an optional `cosmoql.toml` file. A `.env` file next to
//! it is loaded first, and the following environment variables override the
//! file:
//!
//! - `COSMOQL_LOG` - tracing filter directives
//! - `COSMOQL_INITIAL_DATA` - JSON state file loaded at startup
//! - `COSMOQL_PERSIST` - JSON state file written after a run
//! - `COSMOQL_RETURN_ALL_ON_PARSE_ERROR` - `true`/`false`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DbError, DbResult};
use crate::logging::DEFAULT_LOG_FILTER;

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "cosmoql.toml";

/// Environment variable names
pub const ENV_LOG: &str = "COSMOQL_LOG";
pub const ENV_INITIAL_DATA: &str = "COSMOQL_INITIAL_DATA";
pub const ENV_PERSIST: &str = "COSMOQL_PERSIST";
pub const ENV_RETURN_ALL_ON_PARSE_ERROR: &str = "COSMOQL_RETURN_ALL_ON_PARSE_ERROR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Tracing filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// State file loaded into the store at startup
    #[serde(default)]
    pub initial_data: Option<PathBuf>,
    /// State file the store is dumped to
    #[serde(default)]
    pub persist: Option<PathBuf>,
    /// Answer an unparseable query with every document instead of an error
    #[serde(default = "default_return_all_on_parse_error")]
    pub return_all_on_parse_error: bool,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

fn default_return_all_on_parse_error() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            initial_data: None,
            persist: None,
            return_all_on_parse_error: default_return_all_on_parse_error(),
        }
    }
}

impl Config {
    /// Load configuration from a directory
    ///
    /// A missing `cosmoql.toml` is not an error: defaults are used and the
    /// environment overrides still apply.
    pub fn load(dir: &Path) -> DbResult<Self> {
        // Load .env if present (ignore errors)
        let env_path = dir.join(".env");
        if env_path.exists() {
            let _ = dotenvy::from_path(&env_path);
        }

        let config_path = dir.join(CONFIG_FILE_NAME);
        let mut config = if config_path.exists() {
            Self::read_file(&config_path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from an explicit file, which must exist
    pub fn from_file(path: &Path) -> DbResult<Self> {
        if let Some(dir) = path.parent() {
            let env_path = dir.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
            }
        }

        let mut config = Self::read_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from TOML text without touching the environment
    pub fn from_toml_str(content: &str) -> DbResult<Self> {
        toml::from_str(content).map_err(|e| DbError::ConfigError(e.to_string()))
    }

    fn read_file(path: &Path) -> DbResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DbError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(filter) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
            self.log_filter = filter;
        }

        if let Some(path) = lookup(ENV_INITIAL_DATA).filter(|v| !v.is_empty()) {
            self.initial_data = Some(PathBuf::from(path));
        }

        if let Some(path) = lookup(ENV_PERSIST).filter(|v| !v.is_empty()) {
            self.persist = Some(PathBuf::from(path));
        }

        if let Some(flag) = lookup(ENV_RETURN_ALL_ON_PARSE_ERROR) {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.return_all_on_parse_error = true,
                "0" | "false" | "no" => self.return_all_on_parse_error = false,
                other => tracing::warn!(
                    "Ignoring {}={}: expected true or false",
                    ENV_RETURN_ALL_ON_PARSE_ERROR,
                    other
                ),
            }
        }
    }
}
