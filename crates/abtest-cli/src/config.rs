//! Admin tool configuration
//!
//! Layered lowest to highest: built-in defaults, a TOML file, `ABTEST_*`
//! environment variables, then command-line flags (applied by the caller).
//!
//! ```toml
//! [api]
//! base_url = "https://admin.example.org"
//! timeout_secs = 10
//!
//! [preview]
//! session_file = "~/.abtest/preview.json"
//!
//! [log]
//! level = "debug"
//! json = true
//! ```

use abtest_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides `api.base_url`
pub const ENV_API_URL: &str = "ABTEST_API_URL";
/// Overrides `log.level`
pub const ENV_LOG: &str = "ABTEST_LOG";
/// Overrides `preview.session_file`
pub const ENV_SESSION_FILE: &str = "ABTEST_SESSION_FILE";

/// Configuration loading failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid log filter '{0}'")]
    LogFilter(String),
}

/// Preview session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub session_file: PathBuf,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            session_file: PathBuf::from(".abtest-preview.json"),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete admin tool configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub api: ClientConfig,
    pub preview: PreviewConfig,
    pub log: LogConfig,
}

impl AdminConfig {
    /// Defaults only
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown types
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// - [`ConfigError::Read`] if the file cannot be read
    /// - [`ConfigError::Parse`] if it is not valid configuration
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// File (if given) plus process environment
    ///
    /// # Errors
    /// Same as [`Self::from_file`]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    /// Apply `ABTEST_*` overrides from a lookup
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = var(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(level) = var(ENV_LOG) {
            self.log.level = level;
        }
        if let Some(file) = var(ENV_SESSION_FILE) {
            self.preview.session_file = PathBuf::from(file);
        }
        self
    }

    /// With API base URL
    #[inline]
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api.base_url = url.into();
        self
    }

    /// With log level
    #[inline]
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log.level = level.into();
        self
    }

    /// With JSON logs
    #[inline]
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.log.json = json;
        self
    }

    /// With preview session file
    #[inline]
    #[must_use]
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.preview.session_file = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = AdminConfig::from_toml(
            "[api]\nbase_url = \"https://admin.example.org\"\n",
            Path::new("abtest.toml"),
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://admin.example.org");
        assert_eq!(config.api.timeout_secs, ClientConfig::default().timeout_secs);
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn env_overrides_file() {
        let env: HashMap<&str, &str> = [
            (ENV_API_URL, "http://staging:8080"),
            (ENV_LOG, "debug"),
            (ENV_SESSION_FILE, "  "),
        ]
        .into_iter()
        .collect();

        let config = AdminConfig::new().with_env(|k| env.get(k).map(ToString::to_string));
        assert_eq!(config.api.base_url, "http://staging:8080");
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.preview, PreviewConfig::default());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abtest.toml");
        let config = AdminConfig::new()
            .with_api_url("https://admin.example.org")
            .with_json_logs(true)
            .with_session_file(dir.path().join("preview.json"));
        fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

        assert_eq!(AdminConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn malformed_file_names_path() {
        let err = AdminConfig::from_toml("[api\n", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }
}
