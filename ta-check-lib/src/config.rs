//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and `TA_*`
//! environment variables, and merging configurations with proper
//! precedence rules.

use crate::error::TaCheckError;
use crate::types::ID_PLACEHOLDER;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Configuration loaded from TOML files.
///
/// ```toml
/// [defaults]
/// department = "135"
/// cohort = "20"
/// concurrency = 10
/// timeout = "30s"
/// fail_fast = true
///
/// [sources]
/// cache_path = "data/data_13_22.json"
/// status_url = "https://digilib.itb.ac.id/gdl/go/{id}"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Remote endpoints and local cache location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<SourcesConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Default department code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    /// Default cohort code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cohort: Option<String>,

    /// Maximum number of probes in flight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Per-request timeout (as string, e.g., "30s", "2m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Abort on the first probe error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_fast: Option<bool>,
}

/// Where data comes from.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourcesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roster_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<String>,

    /// Portal page template containing `{id}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_marker: Option<String>,
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to log which config files were picked up
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, TaCheckError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(TaCheckError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            TaCheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            TaCheckError::config(format!("Failed to parse TOML configuration: {}", e))
        })?;

        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is lowest, then the home directory file, then the local file.
    pub fn discover_and_load(&self) -> Result<FileConfig, TaCheckError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            let config = self.load_file(&path)?;
            merged_config = self.merge_configs(merged_config, config);
            loaded_files.push(path);
        }

        if self.verbose {
            for path in &loaded_files {
                debug!(path = %path.display(), "loaded config file");
            }
        }

        Ok(merged_config)
    }

    /// Get the local configuration file path.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./ta-check.toml", "./.ta-check.toml"]
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Get the global configuration file path in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = PathBuf::from(env::var_os("HOME")?);
        [".ta-check.toml", "ta-check.toml"]
            .iter()
            .map(|name| home.join(name))
            .find(|path| path.exists())
    }

    /// Get the XDG configuration file path.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let base = match env::var_os("XDG_CONFIG_HOME") {
            Some(xdg) => PathBuf::from(xdg),
            None => PathBuf::from(env::var_os("HOME")?).join(".config"),
        };
        let path = base.join("ta-check").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations, `higher` winning field by field.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(lower), Some(higher)) => Some(DefaultsConfig {
                    department: higher.department.or(lower.department),
                    cohort: higher.cohort.or(lower.cohort),
                    concurrency: higher.concurrency.or(lower.concurrency),
                    timeout: higher.timeout.or(lower.timeout),
                    fail_fast: higher.fail_fast.or(lower.fail_fast),
                }),
                (lower, higher) => higher.or(lower),
            },
            sources: match (lower.sources, higher.sources) {
                (Some(lower), Some(higher)) => Some(SourcesConfig {
                    roster_url: higher.roster_url.or(lower.roster_url),
                    cache_path: higher.cache_path.or(lower.cache_path),
                    status_url: higher.status_url.or(lower.status_url),
                    submitted_marker: higher.submitted_marker.or(lower.submitted_marker),
                }),
                (lower, higher) => higher.or(lower),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), TaCheckError> {
        if let Some(defaults) = &config.defaults {
            if let Some(concurrency) = defaults.concurrency {
                if concurrency == 0 || concurrency > 100 {
                    return Err(TaCheckError::config("Concurrency must be between 1 and 100"));
                }
            }

            if let Some(timeout_str) = &defaults.timeout {
                if parse_timeout_string(timeout_str).is_none() {
                    return Err(TaCheckError::config(format!(
                        "Invalid timeout format '{}'. Use format like '5s', '30s', '2m'",
                        timeout_str
                    )));
                }
            }
        }

        if let Some(sources) = &config.sources {
            if let Some(template) = &sources.status_url {
                if !template.contains(ID_PLACEHOLDER) {
                    return Err(TaCheckError::config(format!(
                        "status_url '{}' must contain {}",
                        template, ID_PLACEHOLDER
                    )));
                }
            }

            if sources.submitted_marker.as_deref() == Some("") {
                return Err(TaCheckError::config("submitted_marker cannot be empty"));
            }
        }

        Ok(())
    }
}

/// Environment variable configuration that mirrors the config file.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub concurrency: Option<usize>,
    pub timeout: Option<String>,
    pub roster_url: Option<String>,
    pub cache_path: Option<String>,
    pub status_url: Option<String>,
    pub submitted_marker: Option<String>,
    pub config: Option<String>,
}

/// Load configuration from `TA_*` environment variables.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    let mut env_config = EnvConfig::default();

    if let Ok(val) = env::var("TA_CONCURRENCY") {
        match val.parse::<usize>() {
            Ok(concurrency) if (1..=100).contains(&concurrency) => {
                debug!(concurrency, "using TA_CONCURRENCY");
                env_config.concurrency = Some(concurrency);
            }
            _ => warn!("ignoring invalid TA_CONCURRENCY='{}', must be 1-100", val),
        }
    }

    if let Ok(timeout_str) = env::var("TA_TIMEOUT") {
        if parse_timeout_string(&timeout_str).is_some() {
            debug!(timeout = %timeout_str, "using TA_TIMEOUT");
            env_config.timeout = Some(timeout_str);
        } else {
            warn!(
                "ignoring invalid TA_TIMEOUT='{}', use format like '5s', '30s', '2m'",
                timeout_str
            );
        }
    }

    if let Ok(url) = env::var("TA_STATUS_URL") {
        if url.contains(ID_PLACEHOLDER) {
            env_config.status_url = Some(url);
        } else {
            warn!("ignoring TA_STATUS_URL='{}' without {}", url, ID_PLACEHOLDER);
        }
    }

    env_config.roster_url = non_empty_var("TA_ROSTER_URL");
    env_config.cache_path = non_empty_var("TA_CACHE_PATH");
    env_config.submitted_marker = non_empty_var("TA_MARKER");
    env_config.config = non_empty_var("TA_CONFIG");

    env_config
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse timeout strings like "30s", "2m", or bare seconds into seconds.
pub fn parse_timeout_string(timeout_str: &str) -> Option<u64> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let secs = if let Some(stripped) = timeout_str.strip_suffix('s') {
        stripped.parse::<u64>().ok()
    } else if let Some(stripped) = timeout_str.strip_suffix('m') {
        stripped
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
    } else {
        timeout_str.parse::<u64>().ok()
    }?;

    (secs > 0).then_some(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_timeout_string() {
        assert_eq!(parse_timeout_string("5s"), Some(5));
        assert_eq!(parse_timeout_string("30s"), Some(30));
        assert_eq!(parse_timeout_string("2m"), Some(120));
        assert_eq!(parse_timeout_string("5"), Some(5));
        assert_eq!(parse_timeout_string("0s"), None);
        assert_eq!(parse_timeout_string("invalid"), None);
    }

    #[test]
    fn test_huge_minute_timeout_is_rejected() {
        assert_eq!(parse_timeout_string("999999999999999999m"), None);
        assert_eq!(parse_timeout_string("300000000000000000m"), Some(18_000_000_000_000_000_000));

        let temp_file = write_config("[defaults]\ntimeout = \"999999999999999999m\"\n");
        let result = ConfigManager::new(false).load_file(temp_file.path());
        assert!(matches!(result, Err(TaCheckError::ConfigError { .. })));
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[defaults]
department = "182"
cohort = "21"
concurrency = 4
timeout = "10s"
fail_fast = false

[sources]
cache_path = "/tmp/roster.json"
status_url = "https://portal.test/go/{id}"
"#,
        );

        let manager = ConfigManager::new(false);
        let config = manager.load_file(temp_file.path()).unwrap();

        let defaults = config.defaults.unwrap();
        assert_eq!(defaults.department.as_deref(), Some("182"));
        assert_eq!(defaults.cohort.as_deref(), Some("21"));
        assert_eq!(defaults.concurrency, Some(4));
        assert_eq!(defaults.fail_fast, Some(false));

        let sources = config.sources.unwrap();
        assert_eq!(sources.cache_path.as_deref(), Some("/tmp/roster.json"));
        assert!(sources.roster_url.is_none());
    }

    #[test]
    fn test_invalid_concurrency() {
        let temp_file = write_config("[defaults]\nconcurrency = 0\n");
        let result = ConfigManager::new(false).load_file(temp_file.path());
        assert!(matches!(result, Err(TaCheckError::ConfigError { .. })));
    }

    #[test]
    fn test_status_url_requires_placeholder() {
        let temp_file = write_config("[sources]\nstatus_url = \"https://portal.test/go/\"\n");
        let result = ConfigManager::new(false).load_file(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigManager::new(false).load_file("/definitely/not/here.toml");
        assert!(matches!(result, Err(TaCheckError::FileError { .. })));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(10),
                department: Some("135".to_string()),
                ..Default::default()
            }),
            sources: Some(SourcesConfig {
                cache_path: Some("lower.json".to_string()),
                ..Default::default()
            }),
        };

        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(25),
                ..Default::default()
            }),
            sources: None,
        };

        let merged = manager.merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();

        assert_eq!(defaults.concurrency, Some(25)); // Higher wins
        assert_eq!(defaults.department, Some("135".to_string())); // Lower preserved
        assert_eq!(
            merged.sources.unwrap().cache_path,
            Some("lower.json".to_string())
        );
    }
}
