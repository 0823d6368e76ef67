//! Configuration management for Lumen.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a partial file is fine.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Lumen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Thumbnail generation settings
    pub thumbnails: ThumbnailConfig,

    /// Processing settings
    pub processing: ProcessingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/org.lumen.lumen/config.toml
    /// - Linux: ~/.config/lumen/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\lumen\config\config.toml
    ///
    /// Falls back to ~/.lumen/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("org", "lumen", "lumen")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".lumen").join("config.toml")
            })
    }

    /// Get the resolved cache directory (with ~ expansion).
    pub fn cache_dir(&self) -> PathBuf {
        let path_str = self.general.cache_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.processing.parallel_workers, 4);
        assert_eq!(config.thumbnails.size_precached, 2048);
        assert_eq!(config.thumbnails.size_uncached, 7680);
        assert_eq!(config.thumbnails.jpeg_quality, 85);
        assert_eq!(config.thumbnails.filter, ResampleFilter::Lanczos);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[thumbnails]"));
        assert!(toml.contains("filter = \"lanczos\""));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [thumbnails]
            jpeg_quality = 70
            filter = "cubic"
            "#,
        )
        .unwrap();
        assert_eq!(config.thumbnails.jpeg_quality, 70);
        assert_eq!(config.thumbnails.filter, ResampleFilter::Cubic);
        assert_eq!(config.thumbnails.size_precached, 2048);
        assert_eq!(config.processing.parallel_workers, 4);
    }

    #[test]
    fn test_unknown_filter_is_parse_error() {
        let err = Config::from_toml("[thumbnails]\nfilter = \"blurry\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_from_file_roundtrips_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, Config::default().to_toml().unwrap()).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.limits.max_file_size_mb, 200);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_cache_dir_expands_tilde() {
        let mut config = Config::default();
        config.general.cache_dir = PathBuf::from("/srv/thumbs");
        assert_eq!(config.cache_dir(), PathBuf::from("/srv/thumbs"));

        config.general.cache_dir = PathBuf::from("~/thumbs");
        assert!(!config.cache_dir().to_string_lossy().starts_with('~'));
    }
}
