//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Match feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Origin of the backend; the push scheme mirrors its http/https scheme
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_matches_path")]
    pub matches_path: String,

    #[serde(default = "default_push_path")]
    pub push_path: String,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Unset means no client-side timeout
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    /// Drop HTTP responses older than the last one applied
    #[serde(default)]
    pub discard_stale_responses: bool,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_matches_path() -> String {
    "/api/matches".to_string()
}

fn default_push_path() -> String {
    "/ws/matches".to_string()
}

fn default_poll_interval() -> u64 {
    10_000 // 10 seconds
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            matches_path: default_matches_path(),
            push_path: default_push_path(),
            poll_interval_ms: default_poll_interval(),
            request_timeout_ms: None,
            discard_stale_responses: false,
        }
    }
}

impl FeedConfig {
    /// Feed configuration for a given base address, other fields defaulted
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
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

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
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
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("matchday").join("config.toml")),
            Some(PathBuf::from("/etc/matchday/config.toml")),
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

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Feed overrides
        if let Some(url) = var("MATCHDAY_BASE_URL") {
            self.feed.base_url = url;
        }
        if let Some(ms) = var("MATCHDAY_POLL_INTERVAL_MS").and_then(|s| s.parse().ok()) {
            self.feed.poll_interval_ms = ms;
        }
        if let Some(ms) = var("MATCHDAY_REQUEST_TIMEOUT_MS").and_then(|s| s.parse().ok()) {
            self.feed.request_timeout_ms = Some(ms);
        }
        if let Some(flag) = var("MATCHDAY_DISCARD_STALE") {
            self.feed.discard_stale_responses = flag.to_lowercase() == "true" || flag == "1";
        }

        // Logging overrides
        if let Some(level) = var("MATCHDAY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("MATCHDAY_LOG_FORMAT") {
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
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Matchday Configuration
#
# Environment variables override these settings:
# - MATCHDAY_BASE_URL
# - MATCHDAY_POLL_INTERVAL_MS
# - MATCHDAY_REQUEST_TIMEOUT_MS
# - MATCHDAY_DISCARD_STALE
# - MATCHDAY_LOG_LEVEL
# - MATCHDAY_LOG_FORMAT

[feed]
# Backend origin. An https origin makes the push channel use wss.
base_url = "http://localhost:8000"

# Path of the matches collection
matches_path = "/api/matches"

# Path of the push channel
push_path = "/ws/matches"

# Polling interval (ms)
poll_interval_ms = 10000

# Client-side request timeout (ms). Unset waits as long as the transport allows.
# request_timeout_ms = 5000

# Ignore HTTP responses that arrive after a newer one was applied
discard_stale_responses = false

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.feed.base_url, "http://localhost:8000");
        assert_eq!(config.feed.matches_path, "/api/matches");
        assert_eq!(config.feed.push_path, "/ws/matches");
        assert_eq!(config.feed.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.feed.request_timeout(), None);
        assert!(!config.feed.discard_stale_responses);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config = Config::parse(&generate_default_config()).unwrap();
        let defaults = FeedConfig::default();

        assert_eq!(config.feed.base_url, defaults.base_url);
        assert_eq!(config.feed.poll_interval_ms, defaults.poll_interval_ms);
        assert_eq!(config.feed.request_timeout_ms, None);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [feed]
            base_url = "https://scores.example.com"
            request_timeout_ms = 2500
            "#,
        )
        .unwrap();

        assert_eq!(config.feed.base_url, "https://scores.example.com");
        assert_eq!(config.feed.request_timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(config.feed.push_path, "/ws/matches");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[feed]\npoll_interval_ms = 3000").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.feed.poll_interval_ms, 3000);
    }

    #[test]
    fn test_load_errors() {
        let err = Config::load(Path::new("/nonexistent/matchday.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[feed\nbase_url = ").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("MATCHDAY_BASE_URL", "https://feed.example.com"),
            ("MATCHDAY_POLL_INTERVAL_MS", "1500"),
            ("MATCHDAY_REQUEST_TIMEOUT_MS", "not-a-number"),
            ("MATCHDAY_DISCARD_STALE", "TRUE"),
            ("MATCHDAY_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.feed.base_url, "https://feed.example.com");
        assert_eq!(config.feed.poll_interval_ms, 1500);
        assert_eq!(config.feed.request_timeout_ms, None);
        assert!(config.feed.discard_stale_responses);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }
}
