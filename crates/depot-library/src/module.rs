//! Module handles and path lookup

use crate::error::{LibraryError, LibraryResult};
use crate::graph::{normalize, ResourceId};
use crate::library::Library;
use crate::path::ResourcePath;
use crate::resource::Resource;
use crate::scope::Scope;
use std::fmt;
use std::ops::Deref;
use std::path::Path;

/// A resource that contains other resources
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Module<'a> {
    resource: Resource<'a>,
}

impl<'a> Module<'a> {
    pub(crate) fn new(resource: Resource<'a>) -> Self {
        Self { resource }
    }

    pub fn as_resource(&self) -> &Resource<'a> {
        &self.resource
    }

    pub fn into_resource(self) -> Resource<'a> {
        self.resource
    }

    fn is_root(&self) -> bool {
        self.resource.node.is_root()
    }

    /// Direct children in name order
    pub fn resources(&self) -> Vec<Resource<'a>> {
        self.library.handles(self.node.children().collect())
    }

    /// Direct child modules in name order
    pub fn modules(&self) -> Vec<Module<'a>> {
        self.resources()
            .into_iter()
            .filter_map(|r| r.as_module())
            .collect()
    }

    /// Every module below this one, dependency sorted
    pub fn all_modules(&self) -> LibraryResult<Vec<Module<'a>>> {
        let ids = self.library.all_module_ids(self.id(), true, false)?;
        Ok(self
            .library
            .handles(ids)
            .into_iter()
            .filter_map(|r| r.as_module())
            .collect())
    }

    /// Resource at `reference` relative to this module
    pub fn resource(&self, reference: &str) -> LibraryResult<Resource<'a>> {
        let id = self.library.resolve_from(self.id(), reference)?;
        Ok(self.library.handle(id))
    }

    /// Module at `reference` relative to this module
    pub fn module(&self, reference: &str) -> LibraryResult<Module<'a>> {
        let resource = self.resource(reference).map_err(|error| match error {
            LibraryError::ResourceNotFound { .. } => {
                LibraryError::module_not_found(reference, self.path())
            }
            other => other,
        })?;
        resource.as_module().ok_or_else(|| LibraryError::NotAModule {
            reference: reference.to_string(),
            within: self.path().to_string(),
        })
    }

    /// Resources matching a glob `criteria`; see [`Library::select`]
    pub fn select(
        &self,
        criteria: &str,
        local: bool,
        sort: bool,
    ) -> LibraryResult<Vec<Resource<'a>>> {
        let library = self.library;
        let ids = library.select_ids(self.id(), criteria, local)?;
        if sort {
            return Ok(library.handles(library.sort_ids(&ids, Scope::Test, false)?));
        }
        let mut resources = library.handles(ids);
        resources.sort();
        Ok(resources)
    }

    /// The local resource below this module whose basedir is `base`
    pub fn locate(&self, base: &Path) -> LibraryResult<Resource<'a>> {
        let base = normalize(base);
        for id in self.library.select_ids(self.id(), "**/*", true)? {
            if self.library.node(id).basedir.as_deref() == Some(base.as_path()) {
                return Ok(self.library.handle(id));
            }
        }
        Err(LibraryError::not_found(base.display()))
    }
}

impl<'a> Deref for Module<'a> {
    type Target = Resource<'a>;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}

impl fmt::Display for Module<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "module:<root>");
        }
        fmt::Display::fmt(&self.resource, f)
    }
}

impl fmt::Debug for Module<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Module").field(&self.resource).finish()
    }
}

impl Library {
    /// Walk `reference` down from the module `from`
    pub(crate) fn resolve_from(
        &self,
        from: ResourceId,
        reference: &str,
    ) -> LibraryResult<ResourceId> {
        let path = ResourcePath::parse(reference)?;
        let segments = path.segments();
        let mut current = self.node(from);
        for (index, segment) in segments.iter().enumerate() {
            if !current.is_module() {
                return Err(LibraryError::NotAModule {
                    reference: segments[..index].join("/"),
                    within: self.node(from).path.to_string(),
                });
            }
            let child = current
                .child(segment)
                .ok_or_else(|| LibraryError::not_found(reference))?;
            current = self.node(child);
        }
        Ok(current.id)
    }
}
