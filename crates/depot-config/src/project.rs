//! Project Configuration (depot.toml)
//!
//! Handles library-level configuration stored in `depot.toml` at the library root.

use crate::global::{validate_property_keys, BuildConfig};
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Project configuration from depot.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Library index location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<LibraryConfig>,

    /// Versioning policy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildConfig>,

    /// Properties inherited by every resource in the library
    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

/// Library index configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LibraryConfig {
    /// Index file, relative to the library root (default: "library.toml")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<PathBuf>,
}

impl ProjectConfig {
    /// Load project configuration from a file
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

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(index) = self.index() {
            validate_index(index)?;
        }
        if let Some(build) = &self.build {
            build.validate("build")?;
        }
        validate_property_keys(&self.properties)
    }

    /// Get the declared index file, if present
    pub fn index(&self) -> Option<&Path> {
        self.library.as_ref().and_then(|l| l.index.as_deref())
    }

    /// Merge another project config into this one
    /// Other config takes precedence for non-None values
    pub fn merge(&mut self, other: &ProjectConfig) {
        if other.library.is_some() {
            self.library = other.library.clone();
        }
        match (&mut self.build, &other.build) {
            (Some(build), Some(other)) => build.merge(other),
            (None, Some(other)) => self.build = Some(other.clone()),
            _ => {}
        }
        self.properties.extend(other.properties.clone());
    }
}

/// The index must be a relative path that stays inside the library root
pub(crate) fn validate_index(index: &Path) -> ConfigResult<()> {
    if index.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "library.index".to_string(),
            reason: "index cannot be empty".to_string(),
        });
    }
    let escapes = index
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(ConfigError::InvalidPath(index.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_project_config() {
        let toml = r#"
[library]
index = "index.toml"

[build]
signature = "BOOTSTRAP"

[properties]
"project.major.version" = "2"
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.index(), Some(Path::new("index.toml")));
        assert_eq!(config.properties.len(), 1);
    }

    #[test]
    fn test_empty_project_config() {
        let config: ProjectConfig = toml::from_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.index(), None);
    }

    #[test]
    fn test_index_outside_root_rejected() {
        let config = ProjectConfig {
            library: Some(LibraryConfig {
                index: Some(PathBuf::from("../elsewhere.toml")),
            }),
            ..Default::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut base = ProjectConfig {
            library: Some(LibraryConfig {
                index: Some(PathBuf::from("index.toml")),
            }),
            ..Default::default()
        };
        let other = ProjectConfig {
            build: Some(BuildConfig {
                signature: Some("RELEASE".to_string()),
                decimal: None,
            }),
            ..Default::default()
        };

        base.merge(&other);
        assert_eq!(base.index(), Some(Path::new("index.toml")));
        assert_eq!(
            base.build.unwrap().signature,
            Some("RELEASE".to_string())
        );
    }
}
