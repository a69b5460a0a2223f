use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use cycle_tracker::models::{TrackerData, DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_LENGTH};

const CONFIG_DIR: &str = "cycle-tracker";
const CONFIG_FILE: &str = "config.toml";

/// Top-level tracker configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TrackerConfig {
    /// Where and how the record is stored.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Values used before anything has been saved.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default = "default_passphrase_env")]
    pub passphrase_env: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            encrypted: false,
            passphrase_env: default_passphrase_env(),
        }
    }
}

fn default_passphrase_env() -> String {
    "CYCLE_TRACKER_PASSPHRASE".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    #[serde(default = "default_cycle_length")]
    pub cycle_length: u32,
    #[serde(default = "default_period_length")]
    pub period_length: u32,
    #[serde(default)]
    pub pregnancy_mode: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            cycle_length: default_cycle_length(),
            period_length: default_period_length(),
            pregnancy_mode: false,
        }
    }
}

fn default_cycle_length() -> u32 {
    DEFAULT_CYCLE_LENGTH
}
fn default_period_length() -> u32 {
    DEFAULT_PERIOD_LENGTH
}

impl DefaultsConfig {
    pub fn tracker_data(&self) -> TrackerData {
        TrackerData {
            last_period: None,
            cycle_length: self.cycle_length,
            period_length: self.period_length,
            pregnancy_mode: self.pregnancy_mode,
        }
    }
}

/// Load the config file. An explicit path must exist; the default location
/// is optional and falls back to built-in defaults.
pub fn load(explicit: Option<&Path>) -> Result<TrackerConfig> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match dirs::config_dir().map(|d| d.join(CONFIG_DIR).join(CONFIG_FILE)) {
            Some(p) if p.exists() => p,
            _ => {
                debug!("no config file, using defaults");
                return Ok(TrackerConfig::default());
            }
        },
    };

    let toml_str = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = parse(&toml_str)
        .with_context(|| format!("failed to parse TOML config {}", path.display()))?;
    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

pub fn parse(toml_str: &str) -> Result<TrackerConfig> {
    Ok(toml::from_str(toml_str)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse("").unwrap();
        assert!(config.storage.path.is_none());
        assert!(!config.storage.encrypted);
        assert_eq!(config.storage.passphrase_env, "CYCLE_TRACKER_PASSPHRASE");
        assert_eq!(config.defaults.cycle_length, 28);
        assert_eq!(config.defaults.period_length, 5);
    }

    #[test]
    fn full_config_parses() {
        let config = parse(
            r#"
            [storage]
            path = "/tmp/tracker.sealed"
            encrypted = true
            passphrase_env = "MY_PASS"

            [defaults]
            cycle_length = 31
            period_length = 6
            pregnancy_mode = true
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/tracker.sealed")));
        assert!(config.storage.encrypted);
        assert_eq!(config.storage.passphrase_env, "MY_PASS");

        let data = config.defaults.tracker_data();
        assert_eq!(data.cycle_length, 31);
        assert_eq!(data.period_length, 6);
        assert!(data.pregnancy_mode);
        assert!(data.last_period.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse("[defaults]\ncycle = 30\n").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn explicit_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[defaults]\nperiod_length = 3\n").unwrap();
        assert_eq!(load(Some(&path)).unwrap().defaults.period_length, 3);
    }
}
