//! Configuration loading and management
//!
//! Handles parsing of the `config.toml` file in the platform config
//! directory (or the path given with `--config`).

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::TaskFilter;
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::persist::CorruptDataPolicy;

/// Config file name inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Fallback data directory when no platform directory is available
pub const FALLBACK_DATA_DIR: &str = ".taskman";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// What to do with a stored task list that fails to parse
    #[serde(default)]
    pub on_corrupt: CorruptDataPolicy,

    /// How long a writer waits for the store lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            on_corrupt: CorruptDataPolicy::default(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Terminal UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Filter selected when the task view opens
    #[serde(default)]
    pub default_filter: TaskFilter,

    /// How long a notification stays on screen
    #[serde(default = "default_notification_ms")]
    pub notification_ms: u64,
}

fn default_notification_ms() -> u64 {
    3000
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_filter: TaskFilter::default(),
            notification_ms: default_notification_ms(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "taskman")
}

/// Platform path of the config file, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or return defaults when the file does not exist
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Data directory: explicit override, then config, then platform default
    pub fn data_dir(&self, cli_dir: Option<&Path>) -> PathBuf {
        if let Some(dir) = cli_dir {
            return dir.to_path_buf();
        }
        if let Some(dir) = &self.storage.dir {
            return dir.clone();
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
    }

    fn validate(&self) -> Result<()> {
        if self.storage.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "storage.lock_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.ui.notification_ms == 0 {
            return Err(Error::InvalidConfig(
                "ui.notification_ms must be greater than zero".to_string(),
            ));
        }
        if let Some(dir) = &self.storage.dir {
            if dir.as_os_str().is_empty() {
                return Err(Error::InvalidConfig(
                    "storage.dir cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert!(cfg.storage.dir.is_none());
        assert_eq!(cfg.storage.on_corrupt, CorruptDataPolicy::Reset);
        assert_eq!(cfg.storage.lock_timeout_ms, DEFAULT_LOCK_TIMEOUT_MS);
        assert_eq!(cfg.ui.default_filter, TaskFilter::All);
        assert_eq!(cfg.ui.notification_ms, 3000);
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        let content = r#"
[storage]
dir = "/tmp/taskman-data"
on_corrupt = "fail"
lock_timeout_ms = 250

[ui]
default_filter = "incomplete"
notification_ms = 1500
"#;
        std::fs::write(&path, content).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.storage.dir, Some(PathBuf::from("/tmp/taskman-data")));
        assert_eq!(cfg.storage.on_corrupt, CorruptDataPolicy::Fail);
        assert_eq!(cfg.storage.lock_timeout_ms, 250);
        assert_eq!(cfg.ui.default_filter, TaskFilter::Incomplete);
        assert_eq!(cfg.ui.notification_ms, 1500);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[ui]\ndefault_filter = \"completed\"\n").expect("write");

        let cfg = Config::load(&path).expect("load");
        assert_eq!(cfg.ui.default_filter, TaskFilter::Completed);
        assert_eq!(cfg.ui.notification_ms, 3000);
        assert_eq!(cfg.storage.on_corrupt, CorruptDataPolicy::Reset);
    }

    #[test]
    fn validate_rejects_zero_timeouts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[storage]\nlock_timeout_ms = 0\n").expect("write");
        assert!(matches!(Config::load(&path), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn unknown_filter_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[ui]\ndefault_filter = \"done\"\n").expect("write");
        assert!(matches!(Config::load(&path), Err(Error::TomlParse(_))));
    }

    #[test]
    fn load_or_default_handles_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_or_default(Some(&dir.path().join(CONFIG_FILE))).expect("defaults");
        assert_eq!(cfg.ui.notification_ms, 3000);
    }

    #[test]
    fn data_dir_prefers_cli_then_config() {
        let mut cfg = Config::default();
        cfg.storage.dir = Some(PathBuf::from("/from/config"));
        assert_eq!(
            cfg.data_dir(Some(Path::new("/from/cli"))),
            PathBuf::from("/from/cli")
        );
        assert_eq!(cfg.data_dir(None), PathBuf::from("/from/config"));
    }
}
