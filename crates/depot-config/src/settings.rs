//! Library Settings
//!
//! The resolved settings a library is built with, independent of where they
//! were loaded from.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default index file name, relative to the library root
pub const DEFAULT_INDEX: &str = "library.toml";

/// Settings consumed by library construction
#[derive(Debug, Clone, PartialEq)]
pub struct LibrarySettings {
    /// Library root directory; relative basedirs of top-level resources resolve here
    pub root_dir: PathBuf,

    /// Index file relative to `root_dir`
    pub index: PathBuf,

    /// Build signature used when a resource declares no `build.signature`
    pub build_signature: Option<String>,

    /// Compute versions as `major.minor.micro`
    pub decimal_versioning: bool,

    /// Properties every resource inherits
    pub properties: BTreeMap<String, String>,
}

impl LibrarySettings {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            index: PathBuf::from(DEFAULT_INDEX),
            build_signature: None,
            decimal_versioning: false,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_index(mut self, index: impl Into<PathBuf>) -> Self {
        self.index = index.into();
        self
    }

    pub fn with_build_signature(mut self, signature: impl Into<String>) -> Self {
        self.build_signature = Some(signature.into());
        self
    }

    pub fn with_decimal_versioning(mut self, enabled: bool) -> Self {
        self.decimal_versioning = enabled;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Absolute location of the index file
    pub fn index_path(&self) -> PathBuf {
        if self.index.is_absolute() {
            self.index.clone()
        } else {
            self.root_dir.join(&self.index)
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_index_path() {
        let settings = LibrarySettings::new("/work/lib");
        assert_eq!(settings.index_path(), PathBuf::from("/work/lib/library.toml"));
    }

    #[test]
    fn test_builder_setters() {
        let settings = LibrarySettings::new("/work")
            .with_index("index/main.toml")
            .with_build_signature("RELEASE")
            .with_decimal_versioning(true)
            .with_property("project.major.version", "3");

        assert_eq!(settings.index_path(), PathBuf::from("/work/index/main.toml"));
        assert_eq!(settings.build_signature.as_deref(), Some("RELEASE"));
        assert!(settings.decimal_versioning);
        assert_eq!(
            settings.properties.get("project.major.version"),
            Some(&"3".to_string())
        );
    }
}
