//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! gitshim has two configuration scopes:
//! - **Global**: user-level settings (token variable, budgets, retry margin)
//! - **Repo**: repository-level overrides (remote name, API base)
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$GITSHIM_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitshim/config.toml`
//! 3. `~/.gitshim/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use gitshim::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/repo"))).unwrap();
//! println!("Remote: {}", config.remote());
//! println!("Log limit: {}", config.log_limit());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, RepoConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::core::ancestry::{DEFAULT_LOG_LIMIT, DEFAULT_MAX_DEPTH};
use crate::forge::DEFAULT_RATE_LIMIT_MARGIN;

/// Environment variable read for the token when `token_env` is not set.
pub const DEFAULT_TOKEN_ENV: &str = "AUTH_TOKEN";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("access token not found: set the {0} environment variable")]
    MissingToken(String),
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence and defaults. Repo config overrides global
/// config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (if in a repo)
    pub repo: Option<RepoConfig>,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
    /// Path to the repo config file (if loaded)
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `repo_path` is provided, also loads repo-specific config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or fail
    /// validation. Missing config files are not an error (defaults are used).
    pub fn load(repo_path: Option<&Path>) -> Result<Config, ConfigError> {
        Self::load_with(Self::find_global().as_deref(), repo_path)
    }

    /// Load configuration from an explicit global file and repository.
    pub fn load_with(
        global_file: Option<&Path>,
        repo_path: Option<&Path>,
    ) -> Result<Config, ConfigError> {
        let (global, global_path) = match global_file {
            Some(path) if path.exists() => {
                (read_toml::<GlobalConfig>(path)?, Some(path.to_path_buf()))
            }
            _ => (GlobalConfig::default(), None),
        };

        let (repo, repo_path_found) = match repo_path.map(Self::repo_config_path) {
            Some(path) if path.exists() => (Some(read_toml::<RepoConfig>(&path)?), Some(path)),
            _ => (None, None),
        };

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        Ok(Config {
            global,
            repo,
            global_path,
            repo_path: repo_path_found,
        })
    }

    /// Find the global config file in the standard locations.
    fn find_global() -> Option<PathBuf> {
        // 1. $GITSHIM_CONFIG
        if let Ok(path) = std::env::var("GITSHIM_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. $XDG_CONFIG_HOME/gitshim/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("gitshim/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. ~/.gitshim/config.toml
        dirs::home_dir()
            .map(|home| home.join(".gitshim/config.toml"))
            .filter(|path| path.exists())
    }

    /// Get the path for repo config.
    ///
    /// Returns `.git/gitshim/config.toml` relative to the given repo path.
    pub fn repo_config_path(repo_path: &Path) -> PathBuf {
        repo_path.join(".git/gitshim/config.toml")
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Get the remote name.
    ///
    /// Defaults to "origin" if not configured.
    pub fn remote(&self) -> &str {
        self.repo
            .as_ref()
            .and_then(|r| r.remote.as_deref())
            .unwrap_or("origin")
    }

    /// Get the API base override, repo scope first.
    pub fn api_base(&self) -> Option<&str> {
        self.repo
            .as_ref()
            .and_then(|r| r.api_base.as_deref())
            .or(self.global.api_base.as_deref())
    }

    /// Get the revision whose tracked files are cleaned before a reset.
    ///
    /// Defaults to "HEAD".
    pub fn cleanup_rev(&self) -> &str {
        self.repo
            .as_ref()
            .and_then(|r| r.cleanup_rev.as_deref())
            .unwrap_or("HEAD")
    }

    /// Get the name of the environment variable holding the token.
    pub fn token_env(&self) -> &str {
        self.global
            .token_env
            .as_deref()
            .unwrap_or(DEFAULT_TOKEN_ENV)
    }

    /// Read the access token from the environment.
    ///
    /// # Errors
    ///
    /// `ConfigError::MissingToken` if the variable is unset or empty.
    pub fn token(&self) -> Result<String, ConfigError> {
        let var = self.token_env();
        match std::env::var(var) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(ConfigError::MissingToken(var.to_string())),
        }
    }

    /// Get the safety margin added to rate-limit waits.
    pub fn rate_limit_margin(&self) -> Duration {
        self.global
            .rate_limit_margin_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RATE_LIMIT_MARGIN)
    }

    /// Get the parent-edge budget of `log`.
    pub fn log_limit(&self) -> usize {
        self.global.log_limit.unwrap_or(DEFAULT_LOG_LIMIT)
    }

    /// Get the level budget of the base-commit search.
    pub fn max_depth(&self) -> usize {
        self.global.max_depth.unwrap_or(DEFAULT_MAX_DEPTH)
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}

/// Read and parse a TOML config file.
fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
