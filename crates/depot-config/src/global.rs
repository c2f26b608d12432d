//! Global Configuration (~/.depot/config.toml)
//!
//! Handles user-level configuration stored in `~/.depot/config.toml`.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Global user configuration from ~/.depot/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Build versioning defaults
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildConfig>,

    /// Properties inherited by every library
    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

/// Versioning policy shared by the global and project files
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Build signature appended to (or standing in for) computed versions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// Compute versions from the major/minor/micro properties
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimal: Option<bool>,
}

impl BuildConfig {
    /// Validate the build section
    pub fn validate(&self, section: &str) -> ConfigResult<()> {
        if let Some(signature) = &self.signature {
            if signature.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.signature", section),
                    reason: "signature cannot be empty".to_string(),
                });
            }
            if signature.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.signature", section),
                    reason: format!("signature '{}' contains whitespace", signature),
                });
            }
        }
        Ok(())
    }

    /// Merge another build section into this one
    /// Other config takes precedence for non-None values
    pub fn merge(&mut self, other: &BuildConfig) {
        if other.signature.is_some() {
            self.signature = other.signature.clone();
        }
        if other.decimal.is_some() {
            self.decimal = other.decimal;
        }
    }
}

impl GlobalConfig {
    /// Load global configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the global configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(build) = &self.build {
            build.validate("build")?;
        }
        validate_property_keys(&self.properties)
    }

    /// Get the global config file path (~/.depot/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".depot").join("config.toml"))
    }

    /// Get the default build signature
    pub fn signature(&self) -> Option<&str> {
        self.build.as_ref().and_then(|b| b.signature.as_deref())
    }

    /// Merge another global config into this one
    /// Other config takes precedence for non-None values
    pub fn merge(&mut self, other: &GlobalConfig) {
        match (&mut self.build, &other.build) {
            (Some(build), Some(other)) => build.merge(other),
            (None, Some(other)) => self.build = Some(other.clone()),
            _ => {}
        }
        self.properties.extend(other.properties.clone());
    }
}

/// Property keys must be non-empty and free of the substitution delimiters
pub(crate) fn validate_property_keys(properties: &BTreeMap<String, String>) -> ConfigResult<()> {
    for key in properties.keys() {
        if key.is_empty() || key.contains("${") || key.contains('}') {
            return Err(ConfigError::InvalidValue {
                field: "properties".to_string(),
                reason: format!("invalid property key '{}'", key),
            });
        }
    }
    Ok(())
}
