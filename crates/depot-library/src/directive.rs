//! Directive tree
//!
//! Immutable declarative description of a library handed to [`crate::Library`]
//! construction. Directives are plain serde values; TOML helpers are provided
//! for loading an index from disk.

use crate::error::{LibraryError, LibraryResult};
use crate::properties::Properties;
use crate::scope::{Category, Classifier, Scope};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

fn default_scheme() -> String {
    "artifact".to_string()
}

fn is_default_scheme(scheme: &str) -> bool {
    scheme == "artifact"
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Root of a library index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryDirective {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<ImportDirective>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceDirective>,
}

impl LibraryDirective {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_import(mut self, import: ImportDirective) -> Self {
        self.imports.push(import);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.set(key, value);
        self
    }

    pub fn with_resource(mut self, resource: ResourceDirective) -> Self {
        self.resources.push(resource);
        self
    }

    /// Parse a library directive from TOML
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load a library directive from a TOML file
    pub fn from_file(path: &Path) -> LibraryResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LibraryError::io(path, e))?;
        Ok(Self::from_str(&content)?)
    }

    /// Serialize to TOML string
    pub fn to_string(&self) -> LibraryResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    File,
    #[default]
    Uri,
}

/// External module import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportDirective {
    #[serde(default)]
    pub mode: ImportMode,
    pub value: String,
}

impl ImportDirective {
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            mode: ImportMode::Uri,
            value: value.into(),
        }
    }

    pub fn file(value: impl Into<String>) -> Self {
        Self {
            mode: ImportMode::File,
            value: value.into(),
        }
    }
}

/// Whether a resource directive describes a plain resource or a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveKind {
    #[default]
    Resource,
    Module,
}

/// Descriptive info
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InfoDirective {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl InfoDirective {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// Resource or module declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceDirective {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub classifier: Classifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basedir: Option<String>,
    #[serde(default, skip_serializing_if = "InfoDirective::is_empty")]
    pub info: InfoDirective,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub export: bool,
    #[serde(default = "default_scheme", skip_serializing_if = "is_default_scheme")]
    pub scheme: String,
    #[serde(default)]
    pub kind: DirectiveKind,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TypeDirective>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyDirective>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterDirective>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceDirective>,
}

impl ResourceDirective {
    fn with_kind(name: impl Into<String>, kind: DirectiveKind) -> Self {
        Self {
            name: name.into(),
            version: None,
            classifier: Classifier::External,
            basedir: None,
            info: InfoDirective::default(),
            export: true,
            scheme: default_scheme(),
            kind,
            properties: Properties::new(),
            types: Vec::new(),
            dependencies: Vec::new(),
            filters: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// External plain resource
    pub fn resource(name: impl Into<String>) -> Self {
        Self::with_kind(name, DirectiveKind::Resource)
    }

    /// External module
    pub fn module(name: impl Into<String>) -> Self {
        Self::with_kind(name, DirectiveKind::Module)
    }

    /// Local plain resource rooted at `basedir`
    pub fn project(name: impl Into<String>, basedir: impl Into<String>) -> Self {
        Self::resource(name)
            .with_classifier(Classifier::Local)
            .with_basedir(basedir)
    }

    /// Directive synthesized for a bare artifact coordinate
    pub fn anonymous(
        scheme: impl Into<String>,
        name: impl Into<String>,
        version: Option<String>,
        type_id: impl Into<String>,
        properties: Properties,
    ) -> Self {
        let mut directive = Self::resource(name);
        directive.scheme = scheme.into();
        directive.version = version;
        directive.classifier = Classifier::Anonymous;
        directive.properties = properties;
        directive.types.push(TypeDirective::new(type_id));
        directive
    }

    /// Wrap `directive` in enclosing module directives so it lands at `path`
    pub fn nested(path: &str, mut directive: ResourceDirective) -> LibraryResult<Self> {
        let path = crate::path::ResourcePath::parse(path)?;
        let mut segments = path.segments().iter().rev();
        if let Some(leaf) = segments.next() {
            directive.name = leaf.clone();
        }
        for segment in segments {
            directive = Self::module(segment.clone()).with_resource(directive);
        }
        Ok(directive)
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_basedir(mut self, basedir: impl Into<String>) -> Self {
        self.basedir = Some(basedir.into());
        self
    }

    pub fn with_info(mut self, title: impl Into<String>, description: Option<String>) -> Self {
        self.info = InfoDirective {
            title: Some(title.into()),
            description,
        };
        self
    }

    pub fn with_export(mut self, export: bool) -> Self {
        self.export = export;
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.set(key, value);
        self
    }

    pub fn with_type(mut self, type_directive: TypeDirective) -> Self {
        self.types.push(type_directive);
        self
    }

    /// Add an include under `scope`, creating the dependency directive if needed
    pub fn with_include(mut self, scope: Scope, include: IncludeDirective) -> Self {
        match self.dependencies.iter_mut().find(|d| d.scope == scope) {
            Some(dependency) => dependency.includes.push(include),
            None => self.dependencies.push(DependencyDirective {
                scope,
                includes: vec![include],
            }),
        }
        self
    }

    pub fn with_filter(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(FilterDirective {
            token: token.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_resource(mut self, resource: ResourceDirective) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn is_module(&self) -> bool {
        self.kind == DirectiveKind::Module
    }

    pub fn is_local(&self) -> bool {
        self.classifier == Classifier::Local
    }

    pub fn is_anonymous(&self) -> bool {
        self.classifier == Classifier::Anonymous
    }

    /// The dependency directive declared for `scope`
    pub fn dependency(&self, scope: Scope) -> Option<&DependencyDirective> {
        self.dependencies.iter().find(|d| d.scope == scope)
    }

    /// Includes declared for `scope`, optionally restricted to one category
    pub fn includes(&self, scope: Scope, category: Option<Category>) -> Vec<&IncludeDirective> {
        self.dependencies
            .iter()
            .filter(|d| d.scope == scope)
            .flat_map(|d| d.includes.iter())
            .filter(|include| category.map_or(true, |c| include.category == c))
            .collect()
    }

    pub fn type_directive(&self, id: &str) -> LibraryResult<&TypeDirective> {
        self.types
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| LibraryError::TypeNotFound {
                id: id.to_string(),
                resource: self.name.clone(),
            })
    }

    /// This directive without its nested resources
    pub fn header(&self) -> Self {
        Self {
            resources: Vec::new(),
            ..self.clone()
        }
    }

    /// Parse a resource directive from TOML
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load a resource directive from a TOML file
    pub fn from_file(path: &Path) -> LibraryResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LibraryError::io(path, e))?;
        Ok(Self::from_str(&content)?)
    }

    /// Serialize to TOML string
    pub fn to_string(&self) -> LibraryResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Produced artifact type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDirective {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub test: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub alias: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub export: bool,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

impl TypeDirective {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            version: None,
            source: None,
            test: false,
            alias: false,
            export: true,
            properties: Properties::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn test(mut self) -> Self {
        self.test = true;
        self
    }

    pub fn alias(mut self) -> Self {
        self.alias = true;
        self
    }

    pub fn with_export(mut self, export: bool) -> Self {
        self.export = export;
        self
    }
}

/// Includes declared under one scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyDirective {
    pub scope: Scope,
    #[serde(default)]
    pub includes: Vec<IncludeDirective>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IncludeMode {
    /// Relative to the enclosing module
    #[default]
    Key,
    /// Absolute resource path
    Ref,
    /// Artifact coordinate
    Uri,
}

/// A single dependency edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncludeDirective {
    #[serde(default)]
    pub mode: IncludeMode,
    #[serde(default)]
    pub category: Category,
    pub value: String,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

impl IncludeDirective {
    fn with_mode(mode: IncludeMode, value: impl Into<String>) -> Self {
        Self {
            mode,
            category: Category::Undefined,
            value: value.into(),
            properties: Properties::new(),
        }
    }

    pub fn key(value: impl Into<String>) -> Self {
        Self::with_mode(IncludeMode::Key, value)
    }

    pub fn reference(value: impl Into<String>) -> Self {
        Self::with_mode(IncludeMode::Ref, value)
    }

    pub fn uri(value: impl Into<String>) -> Self {
        Self::with_mode(IncludeMode::Uri, value)
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.set(key, value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterDirective {
    pub token: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_library_toml() {
        let toml = r#"
[properties]
"project.major.version" = "1"

[[imports]]
value = "file:common.toml"

[[resources]]
name = "acme"
kind = "module"
basedir = "acme"
classifier = "local"

[[resources.resources]]
name = "core"
classifier = "local"
basedir = "core"

[[resources.resources.types]]
id = "jar"

[[resources.resources.dependencies]]
scope = "runtime"

[[resources.resources.dependencies.includes]]
mode = "ref"
category = "public"
value = "acme/api"
"#;

        let library = LibraryDirective::from_str(toml).unwrap();
        assert_eq!(library.imports, vec![ImportDirective::uri("file:common.toml")]);
        let acme = &library.resources[0];
        assert!(acme.is_module());
        assert!(acme.is_local());
        let core = &acme.resources[0];
        assert_eq!(core.kind, DirectiveKind::Resource);
        assert!(core.export);
        assert_eq!(core.scheme, "artifact");
        assert_eq!(
            core.includes(Scope::Runtime, Some(Category::Public)),
            vec![&IncludeDirective::reference("acme/api").with_category(Category::Public)]
        );
        assert!(core.includes(Scope::Runtime, Some(Category::Private)).is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = r#"
[[resources]]
name = "acme"
flavour = "sweet"
"#;
        assert!(LibraryDirective::from_str(toml).is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let library = LibraryDirective::new().with_resource(
            ResourceDirective::module("acme")
                .with_version("1.0")
                .with_resource(
                    ResourceDirective::resource("core")
                        .with_type(TypeDirective::new("jar"))
                        .with_include(Scope::Build, IncludeDirective::key("api")),
                ),
        );

        let rendered = library.to_string().unwrap();
        assert_eq!(LibraryDirective::from_str(&rendered).unwrap(), library);
    }

    #[test]
    fn test_resource_directive_round_trip() -> LibraryResult<()> {
        let directive = ResourceDirective::module("acme")
            .with_version("2.0")
            .with_resource(ResourceDirective::resource("api").with_type(TypeDirective::new("jar")));

        let rendered = directive.to_string()?;
        assert_eq!(ResourceDirective::from_str(&rendered)?, directive);
        Ok(())
    }

    #[test]
    fn test_with_include_groups_by_scope() {
        let directive = ResourceDirective::resource("core")
            .with_include(Scope::Runtime, IncludeDirective::key("a"))
            .with_include(Scope::Test, IncludeDirective::key("b"))
            .with_include(Scope::Runtime, IncludeDirective::key("c"));

        assert_eq!(directive.dependencies.len(), 2);
        let runtime: Vec<&str> = directive
            .includes(Scope::Runtime, None)
            .iter()
            .map(|i| i.value.as_str())
            .collect();
        assert_eq!(runtime, vec!["a", "c"]);
        assert!(directive.dependency(Scope::Build).is_none());
    }

    #[test]
    fn test_nested_wraps_in_modules() {
        let leaf = ResourceDirective::resource("ignored").with_version("2.0");
        let nested = ResourceDirective::nested("org/acme/core", leaf).unwrap();

        assert_eq!(nested.name, "org");
        assert!(nested.is_module());
        let acme = &nested.resources[0];
        assert_eq!(acme.name, "acme");
        let core = &acme.resources[0];
        assert_eq!(core.name, "core");
        assert_eq!(core.version.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_type_directive_lookup() {
        let directive = ResourceDirective::resource("core").with_type(TypeDirective::new("jar"));
        assert!(directive.type_directive("jar").is_ok());
        assert!(matches!(
            directive.type_directive("plugin"),
            Err(LibraryError::TypeNotFound { .. })
        ));
    }

    #[test]
    fn test_header_drops_nested_resources() {
        let module =
            ResourceDirective::module("acme").with_resource(ResourceDirective::resource("a"));
        assert!(module.header().resources.is_empty());
        assert_eq!(module.header().name, "acme");
    }
}
