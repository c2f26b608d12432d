//! Library facade
//!
//! A [`Library`] owns the frozen resource arena built from a
//! [`LibraryDirective`] and the registry of anonymous resources synthesized
//! from bare artifact coordinates after construction.

use crate::artifact::Artifact;
use crate::directive::{ImportMode, LibraryDirective, ResourceDirective};
use crate::error::{LibraryError, LibraryResult};
use crate::graph::{normalize, BuildContext, GraphBuilder, Node, ResourceId};
use crate::module::Module;
use crate::path::ResourcePath;
use crate::properties::Properties;
use crate::resource::Resource;
use crate::scope::{Classifier, Scope};
use depot_config::{ConfigLoader, LibrarySettings};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Resolves an import URI to the module directive it names
pub trait ImportLoader {
    fn load(&self, uri: &str) -> LibraryResult<ResourceDirective>;
}

impl<F> ImportLoader for F
where
    F: Fn(&str) -> LibraryResult<ResourceDirective>,
{
    fn load(&self, uri: &str) -> LibraryResult<ResourceDirective> {
        self(uri)
    }
}

/// In-memory import table
#[derive(Debug, Clone, Default)]
pub struct StaticImports {
    directives: HashMap<String, ResourceDirective>,
}

impl StaticImports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, uri: impl Into<String>, directive: ResourceDirective) -> Self {
        self.directives.insert(uri.into(), directive);
        self
    }
}

impl ImportLoader for StaticImports {
    fn load(&self, uri: &str) -> LibraryResult<ResourceDirective> {
        self.directives
            .get(uri)
            .cloned()
            .ok_or_else(|| LibraryError::not_found(uri))
    }
}

/// Loads imported module directives from TOML files.
///
/// Accepts `file:` URIs and plain paths; relative paths resolve against the
/// library root directory.
#[derive(Debug, Clone)]
pub struct FileImports {
    root_dir: PathBuf,
}

impl FileImports {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }
}

impl ImportLoader for FileImports {
    fn load(&self, uri: &str) -> LibraryResult<ResourceDirective> {
        let location = uri.strip_prefix("file:").unwrap_or(uri);
        let location = location.strip_prefix("//").unwrap_or(location);
        if location.contains("://") {
            return Err(LibraryError::UnsupportedImport {
                value: uri.to_string(),
                reason: "only file imports can be loaded from disk".to_string(),
            });
        }
        let path = Path::new(location);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_dir.join(path)
        };
        ResourceDirective::from_file(&path)
    }
}

struct NoImports;

impl ImportLoader for NoImports {
    fn load(&self, uri: &str) -> LibraryResult<ResourceDirective> {
        Err(LibraryError::UnsupportedImport {
            value: uri.to_string(),
            reason: "no import loader configured".to_string(),
        })
    }
}

#[derive(Default)]
struct AnonymousRegistry {
    by_urn: HashMap<String, ResourceId>,
    nodes: Vec<Arc<Node>>,
}

/// Root container of modules and resources
pub struct Library {
    nodes: Vec<Arc<Node>>,
    anonymous: Mutex<AnonymousRegistry>,
    context: BuildContext,
    settings: LibrarySettings,
}

impl Library {
    /// Build a library from a directive that declares no imports
    pub fn new(directive: &LibraryDirective, settings: LibrarySettings) -> LibraryResult<Self> {
        Self::with_imports(directive, settings, &NoImports)
    }

    /// Build a library, resolving URI imports through `loader`
    pub fn with_imports(
        directive: &LibraryDirective,
        settings: LibrarySettings,
        loader: &dyn ImportLoader,
    ) -> LibraryResult<Self> {
        let context = BuildContext::new(&settings, &directive.properties);
        debug!(
            root = %context.root_dir.display(),
            imports = directive.imports.len(),
            resources = directive.resources.len(),
            "constructing library"
        );

        let mut imported = Vec::with_capacity(directive.imports.len());
        for import in &directive.imports {
            if import.mode == ImportMode::File {
                return Err(LibraryError::UnsupportedImport {
                    value: import.value.clone(),
                    reason: "file-mode imports are not supported".to_string(),
                });
            }
            debug!(uri = %import.value, "loading external import");
            let resource = loader.load(&import.value)?;
            if !resource.is_module() {
                return Err(LibraryError::InvalidImport {
                    value: import.value.clone(),
                });
            }
            imported.push(resource);
        }

        let nodes = {
            let mut builder = GraphBuilder::new(0, &context);
            let root = builder.root();
            for module in &imported {
                builder.add_resource(root, module)?;
            }
            for resource in &directive.resources {
                builder.add_resource(root, resource)?;
            }
            builder.finish().into_iter().map(Arc::new).collect()
        };

        Ok(Self {
            nodes,
            anonymous: Mutex::new(AnonymousRegistry::default()),
            context,
            settings,
        })
    }

    /// Read the index named by `settings` and build the library
    pub fn load(settings: LibrarySettings) -> LibraryResult<Self> {
        let index = settings.index_path();
        debug!(index = %index.display(), "loading library index");
        let directive = LibraryDirective::from_file(&index)?;
        let loader = FileImports::new(settings.root_dir.clone());
        Self::with_imports(&directive, settings, &loader)
    }

    /// Discover configuration from `start` upwards and load the library
    pub fn discover(start: &Path) -> LibraryResult<Self> {
        let config = ConfigLoader::new().load_from_directory(start)?;
        Self::load(config.settings())
    }

    pub(crate) fn root_id(&self) -> ResourceId {
        ResourceId(0)
    }

    pub(crate) fn node(&self, id: ResourceId) -> Arc<Node> {
        match self.nodes.get(id.0) {
            Some(node) => Arc::clone(node),
            None => Arc::clone(&self.anonymous.lock().nodes[id.0 - self.nodes.len()]),
        }
    }

    pub(crate) fn handle(&self, id: ResourceId) -> Resource<'_> {
        Resource::new(self, self.node(id))
    }

    pub(crate) fn handles(&self, ids: Vec<ResourceId>) -> Vec<Resource<'_>> {
        ids.into_iter().map(|id| self.handle(id)).collect()
    }

    /// The virtual root module
    pub(crate) fn root(&self) -> Module<'_> {
        Module::new(self.handle(self.root_id()))
    }

    pub fn settings(&self) -> &LibrarySettings {
        &self.settings
    }

    /// Canonical library root directory
    pub fn root_dir(&self) -> &Path {
        &self.context.root_dir
    }

    /// Timestamp used for `project.timestamp` signatures
    pub fn timestamp(&self) -> &str {
        &self.context.timestamp
    }

    /// Library-level property
    pub fn property(&self, key: &str) -> Option<&str> {
        self.nodes[0].properties.get(key)
    }

    pub fn properties(&self) -> &Properties {
        &self.nodes[0].properties
    }

    /// Top-level modules
    pub fn modules(&self) -> Vec<Module<'_>> {
        self.root().modules()
    }

    /// Every module in the library, dependency sorted
    pub fn all_modules(&self) -> LibraryResult<Vec<Module<'_>>> {
        self.root().all_modules()
    }

    pub fn module(&self, reference: &str) -> LibraryResult<Module<'_>> {
        self.root().module(reference)
    }

    pub fn resource(&self, reference: &str) -> LibraryResult<Resource<'_>> {
        self.root().resource(reference)
    }

    pub fn select(&self, criteria: &str, sort: bool) -> LibraryResult<Vec<Resource<'_>>> {
        self.root().select(criteria, false, sort)
    }

    pub fn select_local(
        &self,
        criteria: &str,
        local: bool,
        sort: bool,
    ) -> LibraryResult<Vec<Resource<'_>>> {
        self.root().select(criteria, local, sort)
    }

    /// Local resources whose basedir is `base` or lies below it, sorted.
    /// `base` itself is included only when `include_self` is set.
    pub fn select_basedir(
        &self,
        base: &Path,
        include_self: bool,
    ) -> LibraryResult<Vec<Resource<'_>>> {
        let base = normalize(base);
        let root = self.root_id();
        let mut selection = Vec::new();
        for id in self.select_ids(root, "**/*", true)? {
            let node = self.node(id);
            let Some(basedir) = &node.basedir else {
                continue;
            };
            if basedir == &base {
                if include_self {
                    selection.push(id);
                }
            } else if basedir.starts_with(&base) {
                selection.push(id);
            }
        }
        let sorted = self.sort_ids(&selection, Scope::Test, false)?;
        Ok(self.handles(sorted))
    }

    /// The local resource whose basedir is `base`
    pub fn locate(&self, base: &Path) -> LibraryResult<Resource<'_>> {
        self.root().locate(base)
    }

    /// Sort `resources` so providers precede consumers at TEST scope.
    /// Cycles are broken at first discovery and logged.
    pub fn sort<'a>(&'a self, resources: &[Resource<'a>]) -> LibraryResult<Vec<Resource<'a>>> {
        let ids: Vec<ResourceId> = resources.iter().map(Resource::id).collect();
        Ok(self.handles(self.sort_ids(&ids, Scope::Test, false)?))
    }

    /// As [`Library::sort`], failing on a dependency cycle
    pub fn sort_strict<'a>(
        &'a self,
        resources: &[Resource<'a>],
    ) -> LibraryResult<Vec<Resource<'a>>> {
        let ids: Vec<ResourceId> = resources.iter().map(Resource::id).collect();
        Ok(self.handles(self.sort_ids(&ids, Scope::Test, true)?))
    }

    /// Resource synthesized for a bare artifact coordinate, memoized by URN
    pub fn anonymous_resource(
        &self,
        urn: &str,
        properties: &Properties,
    ) -> LibraryResult<Resource<'_>> {
        let id = self.anonymous_id(urn, properties)?;
        Ok(self.handle(id))
    }

    pub(crate) fn anonymous_id(
        &self,
        urn: &str,
        properties: &Properties,
    ) -> LibraryResult<ResourceId> {
        let mut registry = self.anonymous.lock();
        if let Some(id) = registry.by_urn.get(urn) {
            return Ok(*id);
        }

        let artifact = Artifact::parse(urn)?;
        let version = artifact.version().map(str::to_string);
        let mut directive = ResourceDirective::anonymous(
            artifact.scheme(),
            artifact.name(),
            version.clone(),
            artifact.type_id(),
            properties.clone(),
        );
        for segment in artifact.group().split('/').rev().filter(|s| !s.is_empty()) {
            let mut enclosing = ResourceDirective::module(segment)
                .with_classifier(Classifier::Anonymous)
                .with_resource(directive);
            enclosing.version = version.clone();
            directive = enclosing;
        }

        let path = ResourcePath::parse(&artifact.path())?;
        let base = self.nodes.len() + registry.nodes.len();
        let mut builder = GraphBuilder::new(base, &self.context);
        let root = builder.root();
        builder.add_resource(root, &directive)?;
        let id = builder
            .find(root, &path)
            .ok_or_else(|| LibraryError::not_found(&path))?;

        registry
            .nodes
            .extend(builder.finish().into_iter().map(Arc::new));
        registry.by_urn.insert(urn.to_string(), id);
        debug!(urn, resource = %path, "synthesized anonymous resource");
        Ok(id)
    }

    /// Resolve an absolute path reference from the library root
    pub(crate) fn lookup(&self, reference: &str) -> LibraryResult<ResourceId> {
        self.resolve_from(self.root_id(), reference)
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("root_dir", &self.context.root_dir)
            .field("resources", &(self.nodes.len() - 1))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::{ImportDirective, TypeDirective};

    fn settings() -> LibrarySettings {
        LibrarySettings::new("/virtual/lib")
    }

    #[test]
    fn test_imports_require_loader() {
        let directive = LibraryDirective::new().with_import(ImportDirective::uri("mem:common"));
        assert!(matches!(
            Library::new(&directive, settings()),
            Err(LibraryError::UnsupportedImport { .. })
        ));
    }

    #[test]
    fn test_closure_loader() {
        let directive = LibraryDirective::new().with_import(ImportDirective::uri("mem:common"));
        let loader = |uri: &str| -> LibraryResult<ResourceDirective> {
            assert_eq!(uri, "mem:common");
            Ok(ResourceDirective::module("common")
                .with_resource(ResourceDirective::resource("util")))
        };

        let library = Library::with_imports(&directive, settings(), &loader).unwrap();
        assert!(library.resource("common/util").is_ok());
    }

    #[test]
    fn test_anonymous_ids_follow_frozen_arena() {
        let library = Library::new(&LibraryDirective::new(), settings()).unwrap();
        let id = library
            .anonymous_id("artifact:jar:org/acme/util#1.0", &Properties::new())
            .unwrap();
        // throwaway root, org, acme, util
        assert_eq!(id.0, 1 + 3);
        let node = library.node(id);
        assert_eq!(node.path.to_string(), "org/acme/util");
        assert!(node.is_anonymous());
        assert!(node.has_type("jar"));
        assert_eq!(node.version.as_deref(), Some("1.0"));
    }

    #[test]
    fn test_library_properties() {
        let directive = LibraryDirective::new()
            .with_property("project.publisher", "Acme")
            .with_resource(
                ResourceDirective::resource("core").with_type(TypeDirective::new("jar")),
            );
        let library = Library::new(
            &directive,
            settings().with_property("project.publisher", "Nobody").with_property("x", "y"),
        )
        .unwrap();

        assert_eq!(library.property("project.publisher"), Some("Acme"));
        assert_eq!(library.property("x"), Some("y"));
        assert_eq!(
            library.resource("core").unwrap().property("project.publisher"),
            Some("Acme")
        );
    }
}
