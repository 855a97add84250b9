//! Configuration file parser for ~/.config/retroflix/config.toml.
//!
//! The file is optional: a missing or empty file yields `Config::default()`.
//! Unknown keys are accepted but logged, since they are usually typos.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::worker::DEFAULT_CACHE_NAME;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid base_url '{url}': {reason}")]
    BaseUrl { url: String, reason: String },
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Application configuration. Every key is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site root serving `content.json`, `tv.json`, `ott.json` and the app shell.
    pub base_url: String,

    /// Notification stream endpoint, relative to `base_url` or absolute.
    pub notification_stream: String,

    /// Versioned name of the offline cache. Bumping it retires older caches
    /// on the next activation.
    pub cache_name: String,

    /// Theme used when no `theme` preference has been saved yet.
    pub theme: String,

    /// Per-request deadline for document fetches.
    pub request_timeout_secs: u64,

    /// Also store successful runtime responses (JSON documents) in the cache.
    pub runtime_caching: bool,

    /// Keybinding overrides: action name to key string.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/".to_string(),
            notification_stream: "sse_notifications.php".to_string(),
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            theme: "dark".to_string(),
            request_timeout_secs: 15,
            runtime_caching: false,
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 7] = [
        "base_url",
        "notification_stream",
        "cache_name",
        "theme",
        "request_timeout_secs",
        "runtime_caching",
        "keybindings",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing, empty or whitespace-only file → defaults
    /// - Larger than 1 MiB → `ConfigError::TooLarge`
    /// - Invalid TOML or wrong value types → `ConfigError::Parse`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            base_url = %config.base_url,
            cache = %config.cache_name,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parse `base_url`, forcing a trailing slash so relative documents
    /// resolve inside it rather than next to it.
    pub fn base_url(&self) -> Result<url::Url, ConfigError> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = url::Url::parse(&raw).map_err(|e| ConfigError::BaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::BaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Scratch directory removed on drop.
    struct TempDir(std::path::PathBuf);

    impl TempDir {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!(
                "retroflix_config_{}_{}",
                name,
                std::process::id()
            ));
            std::fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }

        fn write(&self, content: &str) -> std::path::PathBuf {
            let path = self.0.join("config.toml");
            std::fs::write(&path, content).unwrap();
            path
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.0).ok();
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.theme, "dark");
        assert_eq!(config.cache_name, "retroflix-v1");
        assert_eq!(config.notification_stream, "sse_notifications.php");
        assert_eq!(config.request_timeout_secs, 15);
        assert!(!config.runtime_caching);
        assert!(config.keybindings.is_empty());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/retroflix_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.cache_name, "retroflix-v1");
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let dir = TempDir::new("whitespace");
        let path = dir.write("   \n  \n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.theme, "dark");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = TempDir::new("partial");
        let path = dir.write("theme = \"light\"\nruntime_caching = true\n");

        let config = Config::load(&path).unwrap();
        assert_eq!(config.theme, "light");
        assert!(config.runtime_caching);
        assert_eq!(config.cache_name, "retroflix-v1");
    }

    #[test]
    fn test_full_config() {
        let dir = TempDir::new("full");
        let path = dir.write(
            r#"
base_url = "https://partners.example.com/app"
notification_stream = "https://push.example.com/events"
cache_name = "retroflix-v2"
theme = "light"
request_timeout_secs = 5
runtime_caching = true

[keybindings]
quit = "Ctrl+q"
visit_site = "w"
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.cache_name, "retroflix-v2");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(
            config.keybindings.get("visit_site").map(String::as_str),
            Some("w")
        );
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "https://partners.example.com/app/"
        );
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = TempDir::new("invalid");
        let path = dir.write("this is not [valid toml");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let dir = TempDir::new("wrongtype");
        let path = dir.write("runtime_caching = \"yes\"\n");
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let dir = TempDir::new("unknown");
        let path = dir.write("theme = \"dark\"\nrefresh_interval_minutes = 5\n");
        assert_eq!(Config::load(&path).unwrap().theme, "dark");
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = TempDir::new("too_large");
        let path = dir.write(&"a".repeat(1_048_577));

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
    }

    #[test]
    fn test_base_url_validation() {
        let mut config = Config::default();
        assert_eq!(config.base_url().unwrap().as_str(), "http://127.0.0.1:8000/");

        config.base_url = "ftp://example.com/".to_string();
        assert!(matches!(config.base_url(), Err(ConfigError::BaseUrl { .. })));

        config.base_url = "not a url".to_string();
        assert!(config.base_url().is_err());
    }

    #[test]
    fn test_zero_timeout_clamped() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), std::time::Duration::from_secs(1));
    }
}
