/// Library error types
use crate::scope::{Category, Scope};
use std::path::PathBuf;
use thiserror::Error;

pub type LibraryResult<T> = Result<T, LibraryError>;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Resource reference [{reference}] is undefined")]
    ResourceNotFound { reference: String },

    #[error("Cannot locate module [{reference}] within module [{within}]")]
    ModuleNotFound { reference: String, within: String },

    #[error("A reference to module [{reference}] within the module [{within}] returned a reference to a non-module resource")]
    NotAModule { reference: String, within: String },

    #[error(
        "dependency include within [{resource}] referencing [{reference}] under the scope [{scope}]{} is unknown",
        category_clause(.category)
    )]
    UnknownReference {
        resource: String,
        reference: String,
        scope: Scope,
        category: Option<Category>,
    },

    #[error("Invalid resource path [{path}]: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Invalid artifact [{urn}]: {reason}")]
    InvalidArtifact { urn: String, reason: String },

    #[error("An anonymous dependency include [{urn}] within the resource [{resource}] could not be resolved")]
    AnonymousResource {
        urn: String,
        resource: String,
        #[source]
        source: Box<LibraryError>,
    },

    #[error("Cannot merge module [{module}]: {reason}")]
    StructuralConflict { module: String, reason: String },

    #[error("Duplicate key [{key}] within module [{module}]")]
    DuplicateKey { key: String, module: String },

    #[error("Invalid resource [{resource}]: {reason}")]
    Validation { resource: String, reason: String },

    #[error("Type name [{id}] not recognized with the scope of resource [{resource}]")]
    TypeNotFound { id: String, resource: String },

    #[error("Unsupported import [{value}]: {reason}")]
    UnsupportedImport { value: String, reason: String },

    #[error("Import [{value}] did not resolve to a module directive")]
    InvalidImport { value: String },

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Failed to parse directive: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to render directive: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("I/O error at {path}: {error}")]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] depot_config::ConfigError),
}

fn category_clause(category: &Option<Category>) -> String {
    match category {
        Some(category) => format!(" and category [{}]", category),
        None => String::new(),
    }
}

impl LibraryError {
    /// Create a resource-not-found error
    pub fn not_found(reference: impl ToString) -> Self {
        Self::ResourceNotFound {
            reference: reference.to_string(),
        }
    }

    /// Create a module-not-found error
    pub fn module_not_found(reference: impl ToString, within: impl ToString) -> Self {
        Self::ModuleNotFound {
            reference: reference.to_string(),
            within: within.to_string(),
        }
    }

    /// Create an invalid path error
    pub fn invalid_path(path: impl ToString, reason: impl ToString) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid artifact error
    pub fn invalid_artifact(urn: impl ToString, reason: impl ToString) -> Self {
        Self::InvalidArtifact {
            urn: urn.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a merge conflict error
    pub fn conflict(module: impl ToString, reason: impl ToString) -> Self {
        Self::StructuralConflict {
            module: module.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a validation error
    pub fn validation(resource: impl ToString, reason: impl ToString) -> Self {
        Self::Validation {
            resource: resource.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            error,
        }
    }

    /// Whether this error signals a missing resource or module
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ResourceNotFound { .. }
                | Self::ModuleNotFound { .. }
                | Self::UnknownReference { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_reference_without_category() {
        let error = LibraryError::UnknownReference {
            resource: "resource:acme/core#1.0".to_string(),
            reference: "acme/missing".to_string(),
            scope: Scope::Runtime,
            category: None,
        };

        assert_eq!(
            error.to_string(),
            concat!(
                "dependency include within [resource:acme/core#1.0] referencing [acme/missing] ",
                "under the scope [runtime] is unknown"
            )
        );
    }

    #[test]
    fn test_render_error_converts() {
        let error: LibraryError =
            <toml::ser::Error as serde::ser::Error>::custom("unsupported value").into();
        assert!(matches!(error, LibraryError::Render(_)));
        assert!(error.to_string().starts_with("Failed to render directive"));
    }

    #[test]
    fn test_unknown_reference_with_category() {
        let error = LibraryError::UnknownReference {
            resource: "acme/core".to_string(),
            reference: "acme/api".to_string(),
            scope: Scope::Runtime,
            category: Some(Category::Public),
        };

        assert!(error
            .to_string()
            .ends_with("under the scope [runtime] and category [public] is unknown"));
        assert!(error.is_not_found());
    }

    #[test]
    fn test_anonymous_wraps_source() {
        let error = LibraryError::AnonymousResource {
            urn: "artifact:jar:acme".to_string(),
            resource: "acme/core".to_string(),
            source: Box::new(LibraryError::invalid_artifact("artifact:jar:acme", "missing group")),
        };

        let source = std::error::Error::source(&error).map(|e| e.to_string());
        assert_eq!(
            source.as_deref(),
            Some("Invalid artifact [artifact:jar:acme]: missing group")
        );
    }
}
