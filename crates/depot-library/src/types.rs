//! Produced artifact types

use crate::artifact::Artifact;
use crate::directive::TypeDirective;
use crate::properties::Properties;
use std::path::{Path, PathBuf};

/// An artifact type produced by a resource, resolved against its owner
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    id: String,
    name: String,
    declared_name: Option<String>,
    version: Option<String>,
    source: Option<String>,
    test: bool,
    alias: bool,
    export: bool,
    group: String,
    scheme: String,
    basedir: Option<PathBuf>,
    properties: Properties,
}

/// Owner details a type resolves its defaults from
pub(crate) struct TypeOwner<'a> {
    pub name: &'a str,
    pub group: String,
    pub version: Option<&'a str>,
    pub scheme: &'a str,
    pub basedir: Option<&'a Path>,
}

impl Type {
    pub(crate) fn resolve(directive: &TypeDirective, owner: &TypeOwner<'_>) -> Self {
        Self {
            id: directive.id.clone(),
            name: directive
                .name
                .clone()
                .unwrap_or_else(|| owner.name.to_string()),
            declared_name: directive.name.clone(),
            version: directive
                .version
                .clone()
                .or_else(|| owner.version.map(str::to_string)),
            source: directive.source.clone(),
            test: directive.test,
            alias: directive.alias,
            export: directive.export,
            group: owner.group.clone(),
            scheme: owner.scheme.to_string(),
            basedir: owner.basedir.map(Path::to_path_buf),
            properties: directive.properties.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Declared name, else the owning resource's name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_name(&self) -> Option<&str> {
        self.declared_name.as_deref()
    }

    /// Declared version, else the owning resource's version
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// `id`, or `id#name` when a name is declared
    pub fn compound_name(&self) -> String {
        match &self.declared_name {
            Some(name) => format!("{}#{}", self.id, name),
            None => self.id.clone(),
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_test(&self) -> bool {
        self.test
    }

    pub fn is_alias(&self) -> bool {
        self.alias
    }

    pub fn is_exported(&self) -> bool {
        self.export
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// `scheme:id:group/name#version`
    pub fn artifact(&self) -> Artifact {
        Artifact::new(
            self.scheme.clone(),
            self.id.clone(),
            self.group.clone(),
            self.name.clone(),
            self.version.clone(),
        )
    }

    /// `link:id:group/name`
    pub fn link_artifact(&self) -> Artifact {
        Artifact::new("link", self.id.clone(), self.group.clone(), self.name.clone(), None)
    }

    /// Local build output location, if the owner has a basedir
    pub fn deliverable_path(&self) -> Option<PathBuf> {
        let basedir = self.basedir.as_ref()?;
        if self.test {
            return Some(
                basedir
                    .join("target")
                    .join("test")
                    .join(format!("{}.{}", self.name, self.id)),
            );
        }
        let file = match &self.version {
            Some(version) => format!("{}-{}.{}", self.name, version, self.id),
            None => format!("{}.{}", self.name, self.id),
        };
        Some(
            basedir
                .join("target")
                .join("deliverables")
                .join(format!("{}s", self.id))
                .join(file),
        )
    }
}
