//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$GITSHIM_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitshim/config.toml`
//! 3. `~/.gitshim/config.toml`
//!
//! # Repo Config
//!
//! Located at `.git/gitshim/config.toml`.
//!
//! # Validation
//!
//! Values are validated after parsing: budgets must be positive and names
//! must be non-empty.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// token_env = "GITHUB_TOKEN"
/// rate_limit_margin_secs = 30
/// log_limit = 100
/// max_depth = 100
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Environment variable holding the access token (default: AUTH_TOKEN)
    pub token_env: Option<String>,

    /// API base URL for hosts other than github.com
    pub api_base: Option<String>,

    /// Seconds added to the server's rate-limit reset time
    pub rate_limit_margin_secs: Option<u64>,

    /// Parent edges listed by `log` on the remote path
    pub log_limit: Option<usize>,

    /// Levels searched for the base commit by `diff-numstat`
    pub max_depth: Option<usize>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(var) = &self.token_env {
            if var.trim().is_empty() || var.contains('=') {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid token_env '{}'",
                    var
                )));
            }
        }

        if self.log_limit == Some(0) {
            return Err(ConfigError::InvalidValue(
                "log_limit must be greater than 0".to_string(),
            ));
        }

        if self.max_depth == Some(0) {
            return Err(ConfigError::InvalidValue(
                "max_depth must be greater than 0".to_string(),
            ));
        }

        validate_api_base(self.api_base.as_deref())
    }
}

/// Repository configuration.
///
/// # Example
///
/// ```toml
/// remote = "upstream"
/// api_base = "https://ghe.example.com/api/v3"
/// cleanup_rev = "HEAD"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Remote name (default: "origin")
    pub remote: Option<String>,

    /// API base URL, overriding the global one
    pub api_base: Option<String>,

    /// Revision whose tracked files are removed before a remote reset
    pub cleanup_rev: Option<String>,
}

impl RepoConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(remote) = &self.remote {
            if remote.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "remote cannot be empty".to_string(),
                ));
            }
        }

        if let Some(rev) = &self.cleanup_rev {
            if rev.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "cleanup_rev cannot be empty".to_string(),
                ));
            }
        }

        validate_api_base(self.api_base.as_deref())
    }
}

fn validate_api_base(api_base: Option<&str>) -> Result<(), ConfigError> {
    match api_base {
        Some(base) if !(base.starts_with("https://") || base.starts_with("http://")) => {
            Err(ConfigError::InvalidValue(format!(
                "api_base must be an http(s) URL, got '{}'",
                base
            )))
        }
        _ => Ok(()),
    }
}
