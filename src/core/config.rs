//! Configuration management with layered hierarchy
//!
//! Later layers win:
//!
//! 1. built-in defaults
//! 2. global user config (`<config_dir>/roster/config.yaml`)
//! 3. file named by `ROSTER_CONFIG`
//! 4. environment variables
//! 5. command-line flags (applied by the binary through [`Config::merge`])

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::transport::{AccessTokenProvider, EnvToken, StaticToken};

pub const DEFAULT_API_URL: &str = "http://localhost:8089";
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TOKEN_ENV: &str = "ROSTER_TOKEN";

/// Environment variable naming an extra config file
pub const CONFIG_ENV: &str = "ROSTER_CONFIG";

/// Roster client configuration
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the backend
    pub api_url: Option<String>,

    /// Bearer token; prefer `token_env` over storing it in a file
    pub token: Option<String>,

    /// Environment variable to read the bearer token from
    pub token_env: Option<String>,

    /// Rows per page for list output
    pub page_size: Option<usize>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let extra = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = Self::load_files(Self::global_config_path().as_deref(), extra.as_deref());
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Merge the global file and an optional extra file, in that order
    pub fn load_files(global: Option<&Path>, extra: Option<&Path>) -> Self {
        let mut config = Config::default();
        for path in [global, extra].into_iter().flatten() {
            if let Some(layer) = Self::from_file(path) {
                config.merge(layer);
            }
        }
        config
    }

    /// Read one YAML layer; missing or malformed files are skipped
    pub fn from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read config file");
                return None;
            }
        };
        if contents.trim().is_empty() {
            return Some(Config::default());
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config layer");
                Some(config)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                None
            }
        }
    }

    /// Apply `ROSTER_API_URL` and `ROSTER_PAGE_SIZE` from a lookup function
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("ROSTER_API_URL").filter(|v| !v.trim().is_empty()) {
            self.api_url = Some(url);
        }
        if let Some(raw) = lookup("ROSTER_PAGE_SIZE") {
            match raw.trim().parse::<usize>() {
                Ok(size) => self.page_size = Some(size),
                Err(_) => warn!(value = %raw, "ignoring invalid ROSTER_PAGE_SIZE"),
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "roster")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }
        if other.token.is_some() {
            self.token = other.token;
        }
        if other.token_env.is_some() {
            self.token_env = other.token_env;
        }
        if other.page_size.is_some() {
            self.page_size = other.page_size;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// Configured page size; zero falls back to the default
    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
            .and_then(NonZeroUsize::new)
            .or_else(|| NonZeroUsize::new(DEFAULT_PAGE_SIZE))
            .unwrap_or(NonZeroUsize::MIN)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS).max(1))
    }

    pub fn token_env(&self) -> &str {
        self.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV)
    }

    /// Token source: the environment variable when set, else the stored token
    pub fn token_provider(&self) -> Arc<dyn AccessTokenProvider> {
        let var = self.token_env();
        let env_set = std::env::var(var).is_ok_and(|v| !v.trim().is_empty());
        match &self.token {
            Some(token) if !env_set && !token.trim().is_empty() => Arc::new(StaticToken::new(token.clone())),
            _ => Arc::new(EnvToken::new(var)),
        }
    }

    /// Token for display: first four characters, rest hidden
    pub fn masked_token(&self) -> Option<String> {
        self.token.as_ref().map(|token| {
            let visible: String = token.chars().take(4).collect();
            format!("{visible}****")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url(), "http://localhost:8089");
        assert_eq!(config.page_size().get(), 10);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.token_env(), "ROSTER_TOKEN");
    }

    #[test]
    fn test_later_file_wins() {
        let dir = tempdir().unwrap();
        let global = dir.path().join("global.yaml");
        let extra = dir.path().join("extra.yaml");
        std::fs::write(&global, "api_url: http://global:1\npage_size: 25\n").unwrap();
        std::fs::write(&extra, "api_url: http://extra:2\n").unwrap();

        let config = Config::load_files(Some(&global), Some(&extra));
        assert_eq!(config.api_url(), "http://extra:2");
        assert_eq!(config.page_size().get(), 25);
    }

    #[test]
    fn test_malformed_file_is_skipped() {
        let dir = tempdir().unwrap();
        let global = dir.path().join("global.yaml");
        std::fs::write(&global, "page_size: [not, a, number\n").unwrap();

        let config = Config::load_files(Some(&global), None);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config {
            api_url: Some("http://file:1".into()),
            ..Config::default()
        };
        let env: HashMap<&str, &str> = [("ROSTER_API_URL", "http://env:2"), ("ROSTER_PAGE_SIZE", "5")].into();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_url(), "http://env:2");
        assert_eq!(config.page_size().get(), 5);
    }

    #[test]
    fn test_invalid_page_size_env_is_ignored() {
        let mut config = Config::default();
        config.apply_env(|key| (key == "ROSTER_PAGE_SIZE").then(|| "lots".to_string()));
        assert_eq!(config.page_size, None);
    }

    #[test]
    fn test_zero_page_size_falls_back() {
        let config = Config {
            page_size: Some(0),
            ..Config::default()
        };
        assert_eq!(config.page_size().get(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_masked_token() {
        let config = Config {
            token: Some("abcdefgh".into()),
            ..Config::default()
        };
        assert_eq!(config.masked_token().as_deref(), Some("abcd****"));
    }
}
