//! Depot Configuration System
//!
//! Provides the settings a resource library is constructed with:
//! - Library root and index file (depot.toml)
//! - Global user configuration (~/.depot/config.toml)
//! - Build signature and decimal versioning policy
//! - Inherited library properties
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Global config (~/.depot/config.toml)
//! 2. Project config (./depot.toml)
//! 3. Environment variables (DEPOT_*)
//!
//! # Example
//!
//! ```no_run
//! use depot_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! let settings = config.settings();
//! ```

pub mod global;
pub mod loader;
pub mod project;
pub mod settings;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use global::{BuildConfig, GlobalConfig};
pub use loader::{Config, ConfigLoader};
pub use project::{LibraryConfig, ProjectConfig};
pub use settings::{LibrarySettings, DEFAULT_INDEX};
