//! Configuration loading.
//!
//! Files are TOML (`.toml`) or JSON (`.json`), chosen by extension.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::ConfigError;
use crate::types::ConfigFormat;

impl ConfigFormat {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Reads and parses a configuration file.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    let config = load_str(&content, format)?;
    tracing::debug!(path = %path.display(), ?format, "configuration loaded");
    Ok(config)
}

/// Parses configuration text in the given format.
pub fn load_str<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> Result<T, ConfigError> {
    match format {
        ConfigFormat::Toml => Ok(toml::from_str(content)?),
        ConfigFormat::Json => Ok(serde_json::from_str(content)?),
    }
}
