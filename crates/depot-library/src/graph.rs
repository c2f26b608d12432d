//! Graph arena and construction
//!
//! Construction happens in a [`GraphBuilder`] that owns its nodes mutably.
//! Once finished, nodes are frozen behind `Arc` and only read.

use crate::directive::ResourceDirective;
use crate::error::{LibraryError, LibraryResult};
use crate::path::ResourcePath;
use crate::properties::Properties;
use crate::types::{Type, TypeOwner};
use depot_config::LibrarySettings;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

pub const SNAPSHOT: &str = "SNAPSHOT";
pub const BOOTSTRAP: &str = "BOOTSTRAP";
pub const TIMESTAMP_SIGNATURE: &str = "project.timestamp";

pub const BUILD_SIGNATURE_KEY: &str = "build.signature";
pub const DECIMAL_VERSIONING_KEY: &str = "project.decimal.enabled";
pub const LEGACY_DECIMAL_PREFIX_KEY: &str = "project.version-prefix.enabled";

/// Arena index of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub(crate) usize);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeKind {
    Resource,
    Module {
        root: bool,
        children: BTreeMap<String, ResourceId>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub id: ResourceId,
    pub path: ResourcePath,
    pub parent: Option<ResourceId>,
    /// Declaring directive without nested resources; `None` for a root
    pub directive: Option<ResourceDirective>,
    pub basedir: Option<PathBuf>,
    pub properties: Properties,
    pub statutory_version: Option<String>,
    pub version: Option<String>,
    pub types: Vec<Type>,
    pub filters: BTreeMap<String, String>,
    pub kind: NodeKind,
}

impl Node {
    pub fn name(&self) -> &str {
        self.path.name()
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Module { root: true, .. })
    }

    pub fn is_module(&self) -> bool {
        matches!(self.kind, NodeKind::Module { .. })
    }

    pub fn is_anonymous(&self) -> bool {
        self.directive.as_ref().is_some_and(|d| d.is_anonymous())
    }

    pub fn is_local(&self) -> bool {
        self.directive.as_ref().is_some_and(|d| d.is_local())
    }

    /// Children in name order; empty for plain resources
    pub fn children(&self) -> impl Iterator<Item = ResourceId> + '_ {
        let children = match &self.kind {
            NodeKind::Module { children, .. } => Some(children.values().copied()),
            NodeKind::Resource => None,
        };
        children.into_iter().flatten()
    }

    pub fn child(&self, name: &str) -> Option<ResourceId> {
        match &self.kind {
            NodeKind::Module { children, .. } => children.get(name).copied(),
            NodeKind::Resource => None,
        }
    }

    pub fn has_type(&self, id: &str) -> bool {
        self.types.iter().any(|t| t.id() == id)
    }
}

/// Library-wide values fixed at construction
#[derive(Debug, Clone)]
pub(crate) struct BuildContext {
    pub root_dir: PathBuf,
    pub build_signature: Option<String>,
    pub decimal_versioning: bool,
    pub timestamp: String,
    pub root_properties: Properties,
}

impl BuildContext {
    pub fn new(settings: &LibrarySettings, library_properties: &Properties) -> Self {
        let mut root_properties: Properties = settings
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        root_properties.extend(library_properties);

        Self {
            root_dir: normalize(&settings.root_dir),
            build_signature: settings.build_signature.clone(),
            decimal_versioning: settings.decimal_versioning,
            timestamp: timestamp(),
            root_properties,
        }
    }
}

/// UTC `yyyyMMdd.HHmmss`
pub(crate) fn timestamp() -> String {
    chrono::Utc::now().format("%Y%m%d.%H%M%S").to_string()
}

/// Canonical form if the path exists, else a lexical normalization
pub(crate) fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return canonical;
    }
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Mutable construction phase over a slice of the id space starting at `base`
pub(crate) struct GraphBuilder<'c> {
    base: usize,
    nodes: Vec<Node>,
    context: &'c BuildContext,
}

impl<'c> GraphBuilder<'c> {
    /// Builder whose first node (a root module) receives id `base`
    pub fn new(base: usize, context: &'c BuildContext) -> Self {
        let root = Node {
            id: ResourceId(base),
            path: ResourcePath::root(),
            parent: None,
            directive: None,
            basedir: None,
            properties: context.root_properties.clone(),
            statutory_version: None,
            version: None,
            types: Vec::new(),
            filters: BTreeMap::new(),
            kind: NodeKind::Module {
                root: true,
                children: BTreeMap::new(),
            },
        };
        Self {
            base,
            nodes: vec![root],
            context,
        }
    }

    pub fn root(&self) -> ResourceId {
        ResourceId(self.base)
    }

    pub fn node(&self, id: ResourceId) -> &Node {
        &self.nodes[id.0 - self.base]
    }

    fn node_mut(&mut self, id: ResourceId) -> &mut Node {
        &mut self.nodes[id.0 - self.base]
    }

    /// Look up a descendant of `from` by path
    pub fn find(&self, from: ResourceId, path: &ResourcePath) -> Option<ResourceId> {
        path.segments()
            .iter()
            .try_fold(from, |id, segment| self.node(id).child(segment))
    }

    pub fn finish(self) -> Vec<Node> {
        self.nodes
    }

    /// Add `directive` as a child of `parent`, merging into an existing
    /// module of the same name
    pub fn add_resource(
        &mut self,
        parent: ResourceId,
        directive: &ResourceDirective,
    ) -> LibraryResult<ResourceId> {
        let parent_node = self.node(parent);
        if !parent_node.is_module() {
            return Err(LibraryError::validation(
                &parent_node.path,
                "only modules may contain resources",
            ));
        }
        if !directive.is_module() && !directive.resources.is_empty() {
            return Err(LibraryError::validation(
                parent_node.path.join(&directive.name),
                "a resource directive cannot declare nested resources",
            ));
        }
        if directive.name.is_empty() || directive.name.contains('/') {
            return Err(LibraryError::invalid_path(
                &directive.name,
                "resource names must be a single non-empty segment",
            ));
        }

        match parent_node.child(&directive.name) {
            Some(existing) if self.node(existing).is_module() && directive.is_module() => {
                self.merge(parent, existing, directive)
            }
            Some(_) => Err(LibraryError::DuplicateKey {
                key: directive.name.clone(),
                module: parent_node.path.to_string(),
            }),
            None => self.create(parent, directive),
        }
    }

    fn merge(
        &mut self,
        parent: ResourceId,
        existing: ResourceId,
        directive: &ResourceDirective,
    ) -> LibraryResult<ResourceId> {
        let module = self.node(existing);
        let path = module.path.to_string();
        debug!(module = %path, "merging module directive");

        if let (Some(incoming), Some(current)) = (&directive.basedir, &module.basedir) {
            let anchor = self.anchor(parent);
            let resolved = resolve_basedir(&anchor, &module.properties.resolve(incoming));
            if &resolved != current {
                return Err(LibraryError::conflict(
                    &path,
                    format!(
                        "different base directories (primary {}, secondary {})",
                        current.display(),
                        resolved.display()
                    ),
                ));
            }
        }

        let declared = module.directive.as_ref().and_then(|d| d.version.as_deref());
        if let (Some(incoming), Some(current)) = (directive.version.as_deref(), declared) {
            if incoming != current {
                return Err(LibraryError::conflict(
                    &path,
                    format!(
                        "different versions (primary {}, secondary {})",
                        current, incoming
                    ),
                ));
            }
        }

        if !directive.types.is_empty() {
            return Err(LibraryError::conflict(
                &path,
                "a merged module cannot declare produced types",
            ));
        }
        if !directive.dependencies.is_empty() {
            return Err(LibraryError::conflict(
                &path,
                "a merged module cannot declare dependencies",
            ));
        }

        for nested in &directive.resources {
            self.add_resource(existing, nested)?;
        }
        Ok(existing)
    }

    fn create(
        &mut self,
        parent: ResourceId,
        directive: &ResourceDirective,
    ) -> LibraryResult<ResourceId> {
        let id = ResourceId(self.base + self.nodes.len());
        let anchor = self.anchor(parent);
        let parent_node = self.node(parent);
        let path = parent_node.path.join(&directive.name);

        let mut properties = parent_node.properties.clone();
        properties.extend(&directive.properties);

        let basedir = match &directive.basedir {
            Some(basedir) => Some(resolve_basedir(&anchor, &properties.resolve(basedir))),
            None if directive.is_local() => {
                return Err(LibraryError::validation(
                    &path,
                    "missing base directory declaration",
                ))
            }
            None => None,
        };

        let statutory_version = match &directive.version {
            Some(version) => Some(version.clone()),
            None if directive.is_anonymous() => None,
            None => parent_node.statutory_version.clone(),
        };
        let version = match &statutory_version {
            Some(version) => Some(version.clone()),
            None if directive.is_anonymous() => None,
            None => Some(standard_version(&properties, self.context)),
        };

        let group = parent_node.path.to_string();
        properties.set("project.name", directive.name.clone());
        properties.set("project.group", group.clone());
        if let Some(version) = &version {
            properties.set("project.version", version.clone());
        }
        if let Some(basedir) = &basedir {
            properties.set("basedir", basedir.display().to_string());
        }

        let owner = TypeOwner {
            name: &directive.name,
            group,
            version: version.as_deref(),
            scheme: &directive.scheme,
            basedir: basedir.as_deref(),
        };
        let types = directive
            .types
            .iter()
            .map(|t| Type::resolve(t, &owner))
            .collect();

        let filters = directive
            .filters
            .iter()
            .map(|f| (f.token.clone(), f.value.clone()))
            .collect();

        let kind = if directive.is_module() {
            NodeKind::Module {
                root: false,
                children: BTreeMap::new(),
            }
        } else {
            NodeKind::Resource
        };

        self.nodes.push(Node {
            id,
            path,
            parent: Some(parent),
            directive: Some(directive.header()),
            basedir,
            properties,
            statutory_version,
            version,
            types,
            filters,
            kind,
        });
        if let NodeKind::Module { children, .. } = &mut self.node_mut(parent).kind {
            children.insert(directive.name.clone(), id);
        }

        for nested in &directive.resources {
            self.add_resource(id, nested)?;
        }
        Ok(id)
    }

    /// Directory relative basedirs of `parent`'s children resolve against
    fn anchor(&self, parent: ResourceId) -> PathBuf {
        self.node(parent)
            .basedir
            .clone()
            .unwrap_or_else(|| self.context.root_dir.clone())
    }
}

fn resolve_basedir(anchor: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&anchor.join(path))
    }
}

/// Version of a resource that neither declares nor inherits one
fn standard_version(properties: &Properties, context: &BuildContext) -> String {
    let signature = properties
        .get(BUILD_SIGNATURE_KEY)
        .map(str::to_string)
        .or_else(|| context.build_signature.clone())
        .map(|s| {
            if s == TIMESTAMP_SIGNATURE {
                context.timestamp.clone()
            } else {
                s
            }
        });

    if signature.as_deref() == Some(BOOTSTRAP) {
        return BOOTSTRAP.to_string();
    }

    if is_decimal(properties, context) {
        let decimal = decimal_version(properties);
        match signature {
            Some(signature) => format!("{}-{}", decimal, signature),
            None => decimal.to_string(),
        }
    } else {
        signature.unwrap_or_else(|| SNAPSHOT.to_string())
    }
}

fn is_decimal(properties: &Properties, context: &BuildContext) -> bool {
    let decimal = properties
        .get_bool(DECIMAL_VERSIONING_KEY)
        .unwrap_or(context.decimal_versioning);
    properties
        .get_bool(LEGACY_DECIMAL_PREFIX_KEY)
        .unwrap_or(decimal)
}

/// `major.minor.micro` from the `project.*.version` properties
pub(crate) fn decimal_version(properties: &Properties) -> semver::Version {
    semver::Version::new(
        properties.get_u64("project.major.version", 0),
        properties.get_u64("project.minor.version", 0),
        properties.get_u64("project.micro.version", 0),
    )
}
