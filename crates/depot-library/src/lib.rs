//! Depot Resource Library
//!
//! Dependency graph of modules and resources built from a library
//! directive (library.toml), with scoped and categorized provider queries,
//! glob selection, dependency sorting, anonymous artifact resources and
//! module export.
//!
//! # Example
//!
//! ```no_run
//! use depot_config::LibrarySettings;
//! use depot_library::{Library, Scope};
//!
//! let library = Library::load(LibrarySettings::new(".")).unwrap();
//! for resource in library.select("**/*", true).unwrap() {
//!     let classpath = resource.classpath_providers(Scope::Runtime).unwrap();
//!     println!("{} ({} entries)", resource, classpath.len());
//! }
//! ```

pub mod artifact;
pub mod directive;
pub mod error;
mod export;
pub mod graph;
pub mod library;
pub mod module;
pub mod path;
pub mod properties;
pub mod resource;
pub mod scope;
mod selection;
mod sort;
mod traversal;
pub mod types;

pub use artifact::Artifact;
pub use directive::{
    DependencyDirective, DirectiveKind, FilterDirective, ImportDirective, ImportMode,
    IncludeDirective, IncludeMode, InfoDirective, LibraryDirective, ResourceDirective,
    TypeDirective,
};
pub use error::{LibraryError, LibraryResult};
pub use graph::ResourceId;
pub use library::{FileImports, ImportLoader, Library, StaticImports};
pub use module::Module;
pub use path::ResourcePath;
pub use properties::Properties;
pub use resource::Resource;
pub use scope::{Category, Classifier, Scope};
pub use types::Type;
