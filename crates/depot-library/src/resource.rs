//! Resource handles and provider resolution
//!
//! Provider lists are computed on demand from the frozen graph. Anonymous
//! providers are synthesized the first time an include references them.

use crate::artifact::Artifact;
use crate::directive::{IncludeDirective, IncludeMode, ResourceDirective};
use crate::error::{LibraryError, LibraryResult};
use crate::graph::{decimal_version, Node, ResourceId};
use crate::library::Library;
use crate::module::Module;
use crate::path::ResourcePath;
use crate::properties::Properties;
use crate::scope::{Category, Classifier, Scope};
use crate::traversal::Traversal;
use crate::types::Type;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

/// A named node in the library graph.
///
/// Handles are cheap to clone and compare by identity.
#[derive(Clone)]
pub struct Resource<'a> {
    pub(crate) library: &'a Library,
    pub(crate) node: Arc<Node>,
}

impl<'a> Resource<'a> {
    pub(crate) fn new(library: &'a Library, node: Arc<Node>) -> Self {
        Self { library, node }
    }

    pub fn id(&self) -> ResourceId {
        self.node.id
    }

    pub fn library(&self) -> &'a Library {
        self.library
    }

    pub fn name(&self) -> &str {
        self.node.name()
    }

    /// Path from the library root
    pub fn path(&self) -> &ResourcePath {
        &self.node.path
    }

    /// Resolved version; `None` only for unversioned anonymous resources
    pub fn version(&self) -> Option<&str> {
        self.node.version.as_deref()
    }

    /// Declared or inherited version, without build-signature fallback
    pub fn statutory_version(&self) -> Option<&str> {
        self.node.statutory_version.as_deref()
    }

    pub fn classifier(&self) -> Classifier {
        self.node
            .directive
            .as_ref()
            .map(|d| d.classifier)
            .unwrap_or_default()
    }

    pub fn is_local(&self) -> bool {
        self.node.is_local()
    }

    pub fn is_anonymous(&self) -> bool {
        self.node.is_anonymous()
    }

    pub fn is_module(&self) -> bool {
        self.node.is_module()
    }

    pub fn as_module(&self) -> Option<Module<'a>> {
        self.is_module().then(|| Module::new(self.clone()))
    }

    /// Enclosing module, `None` for top-level resources
    pub fn parent(&self) -> Option<Module<'a>> {
        let parent = self.library.node(self.node.parent?);
        if parent.is_root() {
            return None;
        }
        Some(Module::new(Resource::new(self.library, parent)))
    }

    pub fn basedir(&self) -> Option<&Path> {
        self.node.basedir.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.directive().and_then(|d| d.info.title.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        self.directive().and_then(|d| d.info.description.as_deref())
    }

    pub fn is_exported(&self) -> bool {
        self.directive().is_some_and(|d| d.export)
    }

    /// Declaring directive, without nested resources
    pub fn directive(&self) -> Option<&ResourceDirective> {
        self.node.directive.as_ref()
    }

    /// Inherited properties overlaid by the resource's own
    pub fn properties(&self) -> &Properties {
        &self.node.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.node.properties.get(key)
    }

    pub fn types(&self) -> &[Type] {
        &self.node.types
    }

    /// `major.minor.micro` from the inherited `project.*.version` properties
    pub fn decimal_version(&self) -> semver::Version {
        decimal_version(&self.node.properties)
    }

    /// Type by id or compound `id#name`
    pub fn type_named(&self, id: &str) -> LibraryResult<&Type> {
        self.node
            .types
            .iter()
            .find(|t| t.id() == id || t.compound_name() == id)
            .ok_or_else(|| LibraryError::TypeNotFound {
                id: id.to_string(),
                resource: self.to_string(),
            })
    }

    /// Whether the resource produces a type with this id
    pub fn isa(&self, id: &str) -> bool {
        self.node.has_type(id)
    }

    pub fn local_filters(&self) -> &BTreeMap<String, String> {
        &self.node.filters
    }

    /// Token filters inherited from enclosing modules, overridden locally
    pub fn filters(&self) -> BTreeMap<String, String> {
        let mut filters = match self.parent() {
            Some(parent) => parent.filters(),
            None => BTreeMap::new(),
        };
        filters.extend(
            self.node
                .filters
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        filters
    }

    /// Providers declared at `scope` (plus the implicit module ones).
    /// Without `sort` the result is in path order.
    pub fn providers(
        &self,
        scope: Scope,
        expand: bool,
        sort: bool,
    ) -> LibraryResult<Vec<Resource<'a>>> {
        let ids = self.library.default_providers(self.id(), scope, expand, None)?;
        self.finish(ids, scope, sort)
    }

    /// Providers across BUILD and every tier up to `scope`
    pub fn aggregated_providers(
        &self,
        scope: Scope,
        expand: bool,
        sort: bool,
    ) -> LibraryResult<Vec<Resource<'a>>> {
        let ids = self.library.aggregated(self.id(), scope, expand, false)?;
        self.finish(ids, scope, sort)
    }

    /// Sorted jar providers forming the classpath at `scope`
    pub fn classpath_providers(&self, scope: Scope) -> LibraryResult<Vec<Resource<'a>>> {
        let library = self.library;
        let ids = library.aggregated(self.id(), scope, true, true)?;
        let sorted = library.sort_ids(&ids, scope, false)?;
        Ok(library
            .handles(sorted)
            .into_iter()
            .filter(|r| r.isa("jar"))
            .collect())
    }

    /// Jar providers introduced at `category`, excluding those already
    /// reachable through lower tiers
    pub fn category_classpath(&self, category: Category) -> LibraryResult<Vec<Resource<'a>>> {
        let library = self.library;
        let mut excluded = HashSet::new();
        for lower in category.lower_tiers() {
            excluded.extend(library.default_providers(
                self.id(),
                Scope::Runtime,
                true,
                Some(*lower),
            )?);
        }

        let selection: Vec<ResourceId> = library
            .default_providers(self.id(), Scope::Runtime, true, Some(category))?
            .into_iter()
            .filter(|id| !excluded.contains(id) && library.node(*id).has_type("jar"))
            .collect();
        Ok(library.handles(library.sort_ids(&selection, Scope::Runtime, false)?))
    }

    /// Resources whose aggregated TEST providers include this one
    pub fn consumers(&self, expand: bool, sort: bool) -> LibraryResult<Vec<Resource<'a>>> {
        let library = self.library;
        let ids = if expand {
            let mut traversal = Traversal::new();
            for consumer in library.direct_consumers(self.id())? {
                traversal.pre_order(consumer, &mut |id| library.direct_consumers(id))?;
            }
            traversal.into_order()
        } else {
            library.direct_consumers(self.id())?
        };

        self.finish(ids, Scope::Test, sort)
    }

    /// Rewrite `resource:`/`alias:` references to artifact URIs.
    ///
    /// Recognized artifact URIs are validated and returned as given; any
    /// other value passes through unchanged.
    pub fn to_uri(&self, reference: &str) -> LibraryResult<String> {
        let scheme = reference.split(':').next().unwrap_or_default();
        if Artifact::is_recognized_scheme(scheme) {
            Artifact::parse(reference)?;
            return Ok(reference.to_string());
        }
        if scheme != "resource" && scheme != "alias" {
            return Ok(reference.to_string());
        }

        let coordinate = Artifact::parse_coordinate(reference)?;
        let target = self.library.resource(&coordinate.path())?;
        let t = target.type_named(coordinate.type_id())?;
        let artifact = if scheme == "resource" {
            t.artifact()
        } else {
            t.link_artifact()
        };
        Ok(artifact.to_string())
    }

    fn finish(
        &self,
        ids: Vec<ResourceId>,
        scope: Scope,
        sort: bool,
    ) -> LibraryResult<Vec<Resource<'a>>> {
        if sort {
            return Ok(self.library.handles(self.library.sort_ids(&ids, scope, false)?));
        }
        let mut resources = self.library.handles(ids);
        resources.sort();
        Ok(resources)
    }
}

impl PartialEq for Resource<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.node.id == other.node.id
    }
}

impl Eq for Resource<'_> {}

impl Hash for Resource<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.id.hash(state);
    }
}

impl PartialOrd for Resource<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Resource<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.node
            .path
            .cmp(&other.node.path)
            .then(self.node.id.cmp(&other.node.id))
    }
}

impl fmt::Display for Resource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", describe(&self.node))
    }
}

impl fmt::Debug for Resource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("id", &self.node.id)
            .field("path", &self.node.path.to_string())
            .field("version", &self.node.version)
            .finish()
    }
}

/// `module:`, `project:` or `resource:` prefixed path with optional `#version`
pub(crate) fn describe(node: &Node) -> String {
    let prefix = if node.is_module() {
        "module"
    } else if node.is_local() {
        "project"
    } else {
        "resource"
    };
    match &node.version {
        Some(version) => format!("{}:{}#{}", prefix, node.path, version),
        None => format!("{}:{}", prefix, node.path),
    }
}

pub(crate) fn push_unique(list: &mut Vec<ResourceId>, id: ResourceId) {
    if !list.contains(&id) {
        list.push(id);
    }
}

/// Implicit providers contributed by modules apply to uncategorized queries
fn implicit(category: Option<Category>) -> bool {
    matches!(category, None | Some(Category::Undefined))
}

impl Library {
    /// Providers declared directly by `id` at `scope`.
    ///
    /// Modules additionally provide their children at RUNTIME and, at BUILD,
    /// the external modules their children depend on.
    pub(crate) fn local_providers(
        &self,
        id: ResourceId,
        scope: Scope,
        category: Option<Category>,
    ) -> LibraryResult<Vec<ResourceId>> {
        let node = self.node(id);
        let Some(directive) = &node.directive else {
            return Ok(Vec::new());
        };

        let mut providers = Vec::new();
        for include in directive.includes(scope, category) {
            let provider = self.resolve_include(&node, include, scope, category)?;
            push_unique(&mut providers, provider);
        }

        if node.is_module() && implicit(category) {
            match scope {
                Scope::Build => self.module_build_providers(&node, &mut providers)?,
                Scope::Runtime => {
                    for child in node.children() {
                        push_unique(&mut providers, child);
                    }
                }
                Scope::Test => {}
            }
        }
        Ok(providers)
    }

    fn module_build_providers(
        &self,
        module: &Node,
        providers: &mut Vec<ResourceId>,
    ) -> LibraryResult<()> {
        for child in module.children() {
            if self.node(child).is_module() {
                continue;
            }
            for provider in self.aggregated(child, Scope::Test, true, false)? {
                let provider = self.node(provider);
                if provider.is_anonymous() {
                    continue;
                }
                let Some(parent) = provider.parent.map(|p| self.node(p)) else {
                    continue;
                };
                if parent.is_root()
                    || parent.path.starts_with(&module.path)
                    || module.path.starts_with(&parent.path)
                {
                    continue;
                }
                push_unique(providers, parent.id);
            }
        }
        Ok(())
    }

    fn resolve_include(
        &self,
        node: &Node,
        include: &IncludeDirective,
        scope: Scope,
        category: Option<Category>,
    ) -> LibraryResult<ResourceId> {
        match include.mode {
            IncludeMode::Uri => {
                let urn = node.properties.resolve(&include.value);
                self.anonymous_id(&urn, &include.properties)
                    .map_err(|error| LibraryError::AnonymousResource {
                        urn,
                        resource: node.path.to_string(),
                        source: Box::new(error),
                    })
            }
            IncludeMode::Key | IncludeMode::Ref => {
                let reference = self.include_reference(node, include);
                self.lookup(&reference)
                    .map_err(|_| LibraryError::UnknownReference {
                        resource: describe(node),
                        reference,
                        scope,
                        category,
                    })
            }
        }
    }

    /// Keys are siblings of the declaring resource; refs are absolute
    fn include_reference(&self, node: &Node, include: &IncludeDirective) -> String {
        if include.mode == IncludeMode::Ref {
            return include.value.clone();
        }
        match node.parent.map(|p| self.node(p)) {
            Some(parent) if !parent.is_root() => format!("{}/{}", parent.path, include.value),
            _ => include.value.clone(),
        }
    }

    /// Local providers of `id`, optionally expanded to every transitive
    /// provider in post-order
    pub(crate) fn default_providers(
        &self,
        id: ResourceId,
        scope: Scope,
        expand: bool,
        category: Option<Category>,
    ) -> LibraryResult<Vec<ResourceId>> {
        let local = self.local_providers(id, scope, category)?;
        if expand {
            self.expand(local, scope)
        } else {
            Ok(local)
        }
    }

    /// Providers over BUILD (unless `skip_build`), RUNTIME when `scope` is
    /// above BUILD and TEST when `scope` is TEST
    pub(crate) fn aggregated(
        &self,
        id: ResourceId,
        scope: Scope,
        expand: bool,
        skip_build: bool,
    ) -> LibraryResult<Vec<ResourceId>> {
        let mut providers = Vec::new();
        let mut tiers = Vec::with_capacity(3);
        if !skip_build {
            tiers.push(Scope::Build);
        }
        if scope > Scope::Build {
            tiers.push(Scope::Runtime);
        }
        if scope > Scope::Runtime {
            tiers.push(Scope::Test);
        }
        for tier in tiers {
            for provider in self.default_providers(id, tier, false, None)? {
                push_unique(&mut providers, provider);
            }
        }

        if expand {
            self.expand(providers, scope)
        } else {
            Ok(providers)
        }
    }

    fn expand(&self, providers: Vec<ResourceId>, scope: Scope) -> LibraryResult<Vec<ResourceId>> {
        let skip_build = scope != Scope::Build;
        let mut traversal = Traversal::new();
        for provider in providers {
            traversal.post_order(provider, &mut |id| {
                self.aggregated(id, scope, false, skip_build)
            })?;
        }
        Ok(traversal.into_order())
    }

    /// Every resource in the library that aggregates `id` as a TEST provider
    pub(crate) fn direct_consumers(&self, id: ResourceId) -> LibraryResult<Vec<ResourceId>> {
        let mut consumers = Vec::new();
        for candidate in self.select_ids(self.root_id(), "**/*", false)? {
            if self.aggregated(candidate, Scope::Test, false, false)?.contains(&id) {
                consumers.push(candidate);
            }
        }
        Ok(consumers)
    }
}
