//! TOML configuration for the pad bank and the monitor binary.
//!
//! A missing file at the default location is not an error: the bank runs on
//! defaults. A file that exists but does not parse or validate is.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use crate::controller::{AxisHistory, DEFAULT_SLOT_COUNT};

const APP_DIR: &str = "padsync";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Which snapshot source the binary drives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Gilrs,
    Virtual,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BankConfig {
    pub slot_count: usize,
    pub tick_interval_ms: u64,
    pub axis_history: AxisHistory,
    pub log_level: String,
    pub backend: Backend,
    pub rumble_on_connect: bool,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            slot_count: DEFAULT_SLOT_COUNT,
            tick_interval_ms: 16,
            axis_history: AxisHistory::Latched,
            log_level: "info".to_string(),
            backend: Backend::Gilrs,
            rumble_on_connect: false,
        }
    }
}

impl BankConfig {
    /// `<config dir>/padsync/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {}", path.display());
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Loads `path` if given, else the default location, falling back to
    /// defaults only when the default file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            Some(path) => {
                info!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => {
                info!("No config directory on this platform, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_count == 0 {
            return Err(ConfigError::Invalid("slot_count must be at least 1".into()));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_ms must be greater than 0".into(),
            ));
        }
        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> Result<tracing::Level, ConfigError> {
        tracing::Level::from_str(&self.log_level)
            .map_err(|e| ConfigError::Invalid(format!("log_level {:?}: {}", self.log_level, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = BankConfig::from_toml("");
        assert!(matches!(config, Ok(ref c) if *c == BankConfig::default()));
    }

    #[test]
    fn parses_every_key() {
        let text = r#"
            slot_count = 2
            tick_interval_ms = 33
            axis_history = "rolling"
            log_level = "debug"
            backend = "virtual"
            rumble_on_connect = true
        "#;
        let config = BankConfig::from_toml(text).unwrap_or_default();
        assert_eq!(config.slot_count, 2);
        assert_eq!(config.tick_interval_ms, 33);
        assert_eq!(config.axis_history, AxisHistory::Rolling);
        assert_eq!(config.backend, Backend::Virtual);
        assert!(config.rumble_on_connect);
        assert_eq!(config.level().ok(), Some(tracing::Level::DEBUG));
    }

    #[test]
    fn rejects_zero_slots_and_bad_level() {
        assert!(matches!(
            BankConfig::from_toml("slot_count = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            BankConfig::from_toml("tick_interval_ms = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            BankConfig::from_toml("log_level = \"loud\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            BankConfig::from_toml("slot_count = \"four\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn round_trips_through_a_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        let config = BankConfig {
            slot_count: 3,
            axis_history: AxisHistory::Rolling,
            ..BankConfig::default()
        };
        file.write_all(config.to_toml()?.as_bytes())?;

        let loaded = BankConfig::load_or_default(Some(file.path()))?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let result = BankConfig::load_or_default(Some(Path::new("/nonexistent/padsync.toml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
