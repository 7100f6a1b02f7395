//! Application settings

use crate::core::logger::{generate_log_filename, LogFormat};
use crate::core::probe::ProbeConfig;
use crate::core::protocol::pmtk::{self, CommandError, MAX_OUTPUT_MASKS};
use crate::core::protocol::{SentenceKind, ValidityMask};
use crate::core::session::ReceiverSession;
use crate::core::transport::SerialConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No platform config directory
    #[error("Could not determine config directory")]
    NoConfigDir,

    /// Reading or writing the file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid TOML for [`AppConfig`]
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be written as TOML
    #[error("Could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is outside what the receiver accepts
    #[error("Invalid setting: {0}")]
    Invalid(#[from] CommandError),
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Receiver link settings
    pub receiver: ReceiverSettings,
    /// Baud-rate probe timing
    pub probe: ProbeConfig,
    /// Output-rate masks
    pub output: OutputSettings,
    /// Capture log settings
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load config from the platform config file, defaults if it is absent
    pub fn load() -> Result<Self, ConfigError> {
        let path = super::config_file().ok_or(ConfigError::NoConfigDir)?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the platform config file
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = super::config_file().ok_or(ConfigError::NoConfigDir)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the receiver would not accept
    pub fn validate(&self) -> Result<(), CommandError> {
        pmtk::check_baud(self.receiver.baud_rate)?;
        for &rate in &self.probe.candidates {
            pmtk::check_baud(rate)?;
        }
        if self.output.masks.len() > MAX_OUTPUT_MASKS {
            return Err(CommandError::TooManyMasks(self.output.masks.len()));
        }
        Ok(())
    }
}

/// Receiver link settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverSettings {
    /// Link speed
    pub baud_rate: u32,
    /// Offset from UTC applied to fix times
    pub timezone_minutes: i32,
    /// Pause after each command, in milliseconds
    pub write_delay_ms: u64,
    /// Serial line settings
    pub serial: SerialConfig,
}

impl Default for ReceiverSettings {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            timezone_minutes: 0,
            write_delay_ms: 10,
            serial: SerialConfig::default(),
        }
    }
}

impl ReceiverSettings {
    /// Session configured with these settings
    pub fn session(&self) -> ReceiverSession {
        ReceiverSession::new()
            .with_timezone(self.timezone_minutes)
            .with_write_delay(Duration::from_millis(self.write_delay_ms))
    }
}

/// Output-rate configuration for `PMTK314`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// `masks[0]` every fix, `masks[4]` every fifth fix
    pub masks: Vec<Vec<SentenceKind>>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            masks: vec![
                vec![SentenceKind::Rmc, SentenceKind::Gga],
                vec![],
                vec![],
                vec![],
                vec![SentenceKind::Gsa, SentenceKind::Gsv],
            ],
        }
    }
}

impl OutputSettings {
    /// Masks in encoder form
    pub fn to_masks(&self) -> Vec<ValidityMask> {
        self.masks
            .iter()
            .map(|kinds| kinds.iter().copied().collect())
            .collect()
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Capture traffic by default
    pub enabled: bool,
    /// Capture directory, the data directory if unset
    pub directory: Option<PathBuf>,
    /// Capture format
    pub format: LogFormat,
    /// Add timestamps
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: None,
            format: LogFormat::Text,
            timestamps: true,
        }
    }
}

impl LoggingConfig {
    /// Fresh capture file path, `None` without any usable directory
    pub fn capture_path(&self) -> Option<PathBuf> {
        let dir = self.directory.clone().or_else(super::log_dir)?;
        Some(dir.join(generate_log_filename("mtkgps", self.format)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.receiver.baud_rate, 9600);
        assert_eq!(config.probe.window, Duration::from_millis(500));
        assert_eq!(config.probe.candidates.len(), 6);
        assert!(config.validate().is_ok());
        let masks = config.output.to_masks();
        assert!(masks[0].contains(SentenceKind::Rmc));
        assert!(masks[4].contains(SentenceKind::Gsv));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.receiver.serial.port = "/dev/ttyAMA0".into();
        config.receiver.baud_rate = 38400;
        config.receiver.timezone_minutes = -300;
        config.logging.format = LogFormat::Csv;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[receiver]\nbaud_rate = 115200\n\n[probe]\nwindow = 250\n\n[output]\nmasks = [[\"RMC\"], [\"GSV\", \"PMTKCHN\"]]\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.receiver.baud_rate, 115200);
        assert_eq!(config.receiver.write_delay_ms, 10);
        assert_eq!(config.probe.window, Duration::from_millis(250));
        assert_eq!(config.probe.settle, Duration::from_millis(10));
        assert_eq!(
            config.output.masks[1],
            vec![SentenceKind::Gsv, SentenceKind::MtkChannels]
        );
    }

    #[test]
    fn test_load_rejects_unsupported_baud() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[receiver]\nbaud_rate = 14400\n").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::Invalid(CommandError::UnsupportedBaudRate(14400)))
        ));
    }

    #[test]
    fn test_capture_path_uses_directory() {
        let logging = LoggingConfig {
            directory: Some(PathBuf::from("/tmp/captures")),
            format: LogFormat::JsonLines,
            ..LoggingConfig::default()
        };
        let path = logging.capture_path().unwrap();
        assert!(path.starts_with("/tmp/captures"));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("jsonl"));
    }
}
