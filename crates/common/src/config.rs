//! Configuration file locations and JSON load/save helpers.
//!
//! The tunables of the pointer pipeline live in `headmouse-pointer-core`;
//! this module only knows where configuration files go and how to read them.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{HeadmouseError, HeadmouseResult};

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "headmouse=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

/// Load a JSON config from `path`, falling back to defaults when the file is
/// missing or unreadable.
pub fn load_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    if path.exists() {
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to parse config at {:?}: {}", path, e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, e);
            }
        }
    }
    T::default()
}

/// Load a JSON config from `path`, reporting every failure.
pub fn load_strict<T>(path: &Path) -> HeadmouseResult<T>
where
    T: DeserializeOwned,
{
    if !path.exists() {
        return Err(HeadmouseError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| HeadmouseError::config(format!("Failed to parse {}: {e}", path.display())))
}

/// Save a config as pretty JSON, creating parent directories.
pub fn save_json<T>(path: &Path, value: &T) -> HeadmouseResult<()>
where
    T: Serialize,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("headmouse").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "headmouse-common-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_save_then_load_logging_config() {
        let dir = scratch_dir("save");
        let path = dir.join("nested").join("logging.json");
        let config = LoggingConfig {
            level: "debug".to_string(),
            json: true,
            file: None,
        };

        save_json(&path, &config).unwrap();
        let loaded: LoggingConfig = load_strict(&path).unwrap();
        assert_eq!(loaded.level, "debug");
        assert!(loaded.json);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = scratch_dir("missing");
        let loaded: LoggingConfig = load_or_default(&dir.join("absent.json"));
        assert_eq!(loaded.level, "info");

        let strict: HeadmouseResult<LoggingConfig> = load_strict(&dir.join("absent.json"));
        assert!(matches!(strict, Err(HeadmouseError::FileNotFound { .. })));
    }

    #[test]
    fn test_malformed_file_is_a_config_error() {
        let dir = scratch_dir("malformed");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        let strict: HeadmouseResult<LoggingConfig> = load_strict(&path);
        assert!(matches!(strict, Err(HeadmouseError::Config { .. })));

        let lenient: LoggingConfig = load_or_default(&path);
        assert!(!lenient.json);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: LoggingConfig = serde_json::from_str(r#"{"json":true}"#).unwrap();
        assert!(parsed.json);
        assert_eq!(parsed.level, "info");
    }
}
