//! Export of modules as self-contained directives
//!
//! An exported module is external and carries no basedir. Dependencies on
//! resources inside the exported module become path references; anything
//! outside it is pinned to artifact URIs.

use crate::directive::{DependencyDirective, IncludeDirective, ResourceDirective, TypeDirective};
use crate::error::{LibraryError, LibraryResult};
use crate::graph::{Node, ResourceId};
use crate::library::Library;
use crate::module::Module;
use crate::scope::{Category, Classifier, Scope};
use tracing::debug;

/// Category passes in export order
const EXPORT_CATEGORIES: [Category; 5] = [
    Category::System,
    Category::Public,
    Category::Protected,
    Category::Private,
    Category::Undefined,
];

impl Module<'_> {
    /// Directive describing this module and everything below it.
    ///
    /// A nested module is wrapped in its enclosing modules so the exported
    /// directive reproduces the same paths when loaded.
    pub fn export_directive(&self) -> LibraryResult<ResourceDirective> {
        if self.node.is_root() {
            return Err(LibraryError::Unsupported(
                "cannot export the library root".to_string(),
            ));
        }
        debug!(module = %self.path(), "exporting module");
        let exported = self.library.export_node(self.id(), self.id())?;
        if self.parent().is_none() {
            return Ok(exported);
        }
        ResourceDirective::nested(&self.path().to_string(), exported)
    }
}

impl Library {
    fn export_node(
        &self,
        id: ResourceId,
        boundary: ResourceId,
    ) -> LibraryResult<ResourceDirective> {
        let node = self.node(id);
        let mut exported = header(&node);

        if node.is_module() {
            for child in node.children() {
                exported.resources.push(self.export_node(child, boundary)?);
            }
        } else {
            exported.dependencies = self.export_dependencies(id, boundary)?;
        }
        Ok(exported)
    }

    fn export_dependencies(
        &self,
        id: ResourceId,
        boundary: ResourceId,
    ) -> LibraryResult<Vec<DependencyDirective>> {
        let mut includes: Vec<IncludeDirective> = Vec::new();
        for category in EXPORT_CATEGORIES {
            for provider in self.default_providers(id, Scope::Runtime, true, Some(category))? {
                let provider = self.node(provider);
                let candidates = if self.is_within(&provider, boundary) {
                    vec![IncludeDirective::reference(provider.path.to_string())]
                } else {
                    provider
                        .types
                        .iter()
                        .map(|t| IncludeDirective::uri(t.artifact().to_string()))
                        .collect()
                };
                for include in candidates {
                    let include = include.with_category(category);
                    if !includes
                        .iter()
                        .any(|i| i.mode == include.mode && i.value == include.value)
                    {
                        includes.push(include);
                    }
                }
            }
        }

        if includes.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![DependencyDirective {
            scope: Scope::Runtime,
            includes,
        }])
    }

    fn is_within(&self, node: &Node, boundary: ResourceId) -> bool {
        let mut current = Some(node.id);
        while let Some(id) = current {
            if id == boundary {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }
}

/// Exported form of a node's own declaration
fn header(node: &Node) -> ResourceDirective {
    let mut exported = if node.is_module() {
        ResourceDirective::module(node.name())
    } else {
        ResourceDirective::resource(node.name())
    };
    exported.version = node.version.clone();
    exported.classifier = Classifier::External;
    if let Some(directive) = &node.directive {
        exported.info = directive.info.clone();
        exported.export = directive.export;
        exported.scheme = directive.scheme.clone();
        exported.properties = directive.properties.clone();
        exported.types = directive
            .types
            .iter()
            .filter(|t| t.export && !t.test)
            .cloned()
            .collect::<Vec<TypeDirective>>();
    }
    exported
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::LibraryDirective;
    use depot_config::LibrarySettings;

    #[test]
    fn test_root_cannot_be_exported() {
        let directive =
            LibraryDirective::new().with_resource(ResourceDirective::module("acme"));
        let library = Library::new(&directive, LibrarySettings::new("/virtual/lib")).unwrap();
        assert!(matches!(
            library.root().export_directive(),
            Err(LibraryError::Unsupported(_))
        ));
    }

    #[test]
    fn test_descendant_check() {
        let directive = LibraryDirective::new().with_resource(
            ResourceDirective::module("acme").with_resource(
                ResourceDirective::module("tools")
                    .with_resource(ResourceDirective::resource("cli")),
            ),
        );
        let library = Library::new(&directive, LibrarySettings::new("/virtual/lib")).unwrap();
        let acme = library.lookup("acme").unwrap();
        let cli = library.node(library.lookup("acme/tools/cli").unwrap());
        assert!(library.is_within(&cli, acme));
        assert!(!library.is_within(&library.node(acme), cli.id));
    }
}
