use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::event::{DEFAULT_END_TIME, DEFAULT_START_TIME, EventFields};
use crate::storage::FileStorage;

const APP_DIR: &str = "monthcal";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join(APP_DIR)
}

fn default_start_time() -> String {
    DEFAULT_START_TIME.to_string()
}

fn default_end_time() -> String {
    DEFAULT_END_TIME.to_string()
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct MonthCalConfig {
    /// Where `calendarEvents.json` lives.
    pub data_directory: PathBuf,
    pub debug_logging: bool,
    /// Prefilled start time of a new event.
    #[serde(default = "default_start_time")]
    pub default_start_time: String,
    #[serde(default = "default_end_time")]
    pub default_end_time: String,
}

impl Default for MonthCalConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_dir(),
            debug_logging: false,
            default_start_time: default_start_time(),
            default_end_time: default_end_time(),
        }
    }
}

impl MonthCalConfig {
    /// Load from `path`, or defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let mut config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.data_directory = expand_path(&config.data_directory);
        Ok(config)
    }

    pub fn storage(&self) -> FileStorage {
        FileStorage::new(&self.data_directory)
    }

    pub fn form_defaults(&self) -> EventFields {
        EventFields::new("", &self.default_start_time, &self.default_end_time)
    }
}

/// `~/.config/monthcal/config.toml`, if a config directory is known.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

/// Expand a leading `~/` to the home directory.
pub fn expand_path(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = MonthCalConfig::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, MonthCalConfig::default());
        assert!(config.data_directory.ends_with("monthcal"));
        assert_eq!(config.form_defaults(), EventFields::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "debug_logging = true\ndefault_start_time = \"08:30\"\n").unwrap();

        let config = MonthCalConfig::load(&path).unwrap();
        assert!(config.debug_logging);
        assert_eq!(config.form_defaults().start_time, "08:30");
        assert_eq!(config.default_end_time, "10:00");
    }

    #[test]
    fn data_directory_is_used_for_storage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let data = dir.path().join("data");
        std::fs::write(&path, format!("data_directory = {:?}\n", data.display().to_string()))
            .unwrap();

        let config = MonthCalConfig::load(&path).unwrap();
        assert_eq!(config.storage().dir(), data.as_path());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "debug_logging = \"sometimes\"").unwrap();

        assert!(matches!(
            MonthCalConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn tilde_expands_to_home() {
        let expanded = expand_path(Path::new("~/cal"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("cal"));
        }
        assert_eq!(expand_path(Path::new("/tmp/cal")), PathBuf::from("/tmp/cal"));
    }
}
