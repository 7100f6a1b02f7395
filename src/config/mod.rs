//! Configuration module
//!
//! Handles application settings and their on-disk location

mod settings;

pub use settings::{AppConfig, ConfigError, LoggingConfig, OutputSettings, ReceiverSettings};

use directories::ProjectDirs;
use std::path::PathBuf;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "mtkgps", "MtkGps")
}

/// Get the application configuration directory
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the application data directory
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Get the capture log directory
pub fn log_dir() -> Option<PathBuf> {
    data_dir().map(|d| d.join("logs"))
}

/// Path of `config.toml`
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Initialize application directories
pub fn init_directories() -> std::io::Result<()> {
    for dir in [config_dir(), log_dir()].into_iter().flatten() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(())
}
