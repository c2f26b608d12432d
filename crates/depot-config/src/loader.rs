//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::global::{BuildConfig, GlobalConfig};
use crate::project::{validate_index, LibraryConfig, ProjectConfig};
use crate::settings::{LibrarySettings, DEFAULT_INDEX};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Project configuration file name
pub const PROJECT_CONFIG: &str = "depot.toml";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.depot/config.toml) - lowest priority
/// 2. Project config (./depot.toml) - overrides global
/// 3. Environment variables (DEPOT_*) - overrides project
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Global configuration
    pub global: GlobalConfig,

    /// Library root directory
    pub root_dir: PathBuf,

    /// Whether a depot.toml was found
    pub has_project_file: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use an explicit global config file instead of ~/.depot/config.toml
    pub fn with_global_config_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find depot.toml. Without one, the
    /// nearest directory holding a library.toml is the root, else `start_dir`.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (root_dir, project_config, has_project_file) =
            match self.find_project_config(start_dir)? {
                Some((root, config)) => (root, config, true),
                None => {
                    let root = find_index_dir(start_dir).unwrap_or_else(|| start_dir.to_path_buf());
                    (root, ProjectConfig::default(), false)
                }
            };

        let global_config = self.load_global_config()?;
        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            global: global_config,
            root_dir,
            has_project_file,
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let global_config = self.load_global_config()?;
        let project_config = self.apply_env_overrides(project_config)?;

        let root_dir = config_path
            .parent()
            .map(|p| p.to_path_buf())
            .ok_or_else(|| ConfigError::InvalidPath(config_path.to_path_buf()))?;

        Ok(Config {
            project: project_config,
            global: global_config,
            root_dir,
            has_project_file: true,
        })
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<Option<(PathBuf, ProjectConfig)>> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_CONFIG);

            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok(Some((current, project_config)));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok(None),
            }
        }
    }

    /// Load global configuration from ~/.depot/config.toml
    fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => match GlobalConfig::global_config_path() {
                Ok(path) => {
                    self.global_config_path = Some(path.clone());
                    path
                }
                // No home directory means no global config
                Err(ConfigError::HomeNotFound) => return Ok(GlobalConfig::default()),
                Err(e) => return Err(e),
            },
        };

        // Global config is optional - if it doesn't exist, return default
        if !path.exists() {
            return Ok(GlobalConfig::default());
        }

        GlobalConfig::load_from_file(&path)
    }

    /// Apply environment variable overrides to project config
    ///
    /// DEPOT_BUILD_SIGNATURE, DEPOT_DECIMAL_VERSIONING and DEPOT_INDEX
    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if let Ok(signature) = env::var("DEPOT_BUILD_SIGNATURE") {
            let build = config.build.get_or_insert_with(BuildConfig::default);
            build.signature = Some(signature);
            build.validate("DEPOT_BUILD_SIGNATURE")?;
        }

        if let Ok(decimal) = env::var("DEPOT_DECIMAL_VERSIONING") {
            let decimal = parse_bool("DEPOT_DECIMAL_VERSIONING", &decimal)?;
            config.build.get_or_insert_with(BuildConfig::default).decimal = Some(decimal);
        }

        if let Ok(index) = env::var("DEPOT_INDEX") {
            let index = PathBuf::from(index);
            validate_index(&index)?;
            config.library = Some(LibraryConfig { index: Some(index) });
        }

        Ok(config)
    }

    /// Get the global configuration directory (~/.depot)
    pub fn global_config_dir() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".depot"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Effective build signature (project > global)
    pub fn build_signature(&self) -> Option<&str> {
        self.project
            .build
            .as_ref()
            .and_then(|b| b.signature.as_deref())
            .or_else(|| self.global.signature())
    }

    /// Effective decimal versioning flag (project > global > false)
    pub fn decimal_versioning(&self) -> bool {
        self.project
            .build
            .as_ref()
            .and_then(|b| b.decimal)
            .or_else(|| self.global.build.as_ref().and_then(|b| b.decimal))
            .unwrap_or(false)
    }

    /// Get the library root directory
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Resolve the settings a library is constructed with
    pub fn settings(&self) -> LibrarySettings {
        let mut properties = self.global.properties.clone();
        properties.extend(self.project.properties.clone());

        LibrarySettings {
            root_dir: self.root_dir.clone(),
            index: self
                .project
                .index()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INDEX)),
            build_signature: self.build_signature().map(str::to_string),
            decimal_versioning: self.decimal_versioning(),
            properties,
        }
    }
}

fn find_index_dir(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .find(|dir| dir.join(DEFAULT_INDEX).exists())
        .map(Path::to_path_buf)
}

fn parse_bool(field: &str, value: &str) -> ConfigResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a boolean, found '{}'", value),
        }),
    }
}
