//! Dependency ordering
//!
//! Sorting is a post-order walk restricted to the candidate set: a
//! candidate is emitted after every candidate it depends on, where modules
//! also depend on the modules containing their providers.

use crate::error::{LibraryError, LibraryResult};
use crate::graph::ResourceId;
use crate::library::Library;
use crate::resource::push_unique;
use crate::scope::Scope;
use crate::traversal::Traversal;
use std::collections::HashSet;
use tracing::warn;

impl Library {
    /// Order `candidates` so providers precede consumers at `scope`.
    ///
    /// A cycle is an error when `strict`; otherwise the cycle is broken at
    /// the first back edge found and logged.
    pub(crate) fn sort_ids(
        &self,
        candidates: &[ResourceId],
        scope: Scope,
        strict: bool,
    ) -> LibraryResult<Vec<ResourceId>> {
        let members: HashSet<ResourceId> = candidates.iter().copied().collect();
        let mut traversal = Traversal::new();
        for candidate in candidates {
            traversal.post_order(*candidate, &mut |id| self.sort_edges(id, scope, &members))?;
        }

        let (order, cycles) = traversal.into_parts();
        if let Some(cycle) = cycles.first() {
            let rendered = cycle
                .iter()
                .map(|id| self.node(*id).path.to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            if strict {
                return Err(LibraryError::CircularDependency(rendered));
            }
            warn!(cycle = %rendered, scope = %scope, "breaking circular dependency");
        }
        Ok(order)
    }

    fn sort_edges(
        &self,
        id: ResourceId,
        scope: Scope,
        members: &HashSet<ResourceId>,
    ) -> LibraryResult<Vec<ResourceId>> {
        let mut edges: Vec<ResourceId> = self
            .aggregated(id, scope, false, false)?
            .into_iter()
            .filter(|provider| members.contains(provider))
            .collect();
        if self.node(id).is_module() {
            for module in self.provider_modules(id, scope)? {
                if members.contains(&module) {
                    push_unique(&mut edges, module);
                }
            }
        }
        Ok(edges)
    }

    /// Modules `id` transitively relies on, through provider edges, child
    /// modules and the modules enclosing plain-resource providers.
    /// Anonymous resources and modules enclosing `id` are not followed.
    pub(crate) fn provider_modules(
        &self,
        id: ResourceId,
        scope: Scope,
    ) -> LibraryResult<Vec<ResourceId>> {
        let origin = self.node(id);
        let encloses_origin =
            |module: ResourceId| origin.path.starts_with(&self.node(module).path);
        let mut traversal = Traversal::new();
        traversal.post_order(id, &mut |current| -> LibraryResult<Vec<ResourceId>> {
            let node = self.node(current);
            if node.is_anonymous() || (current != id && encloses_origin(current)) {
                return Ok(Vec::new());
            }
            let providers = self.aggregated(current, scope, false, false)?;
            if node.is_module() {
                let mut next = providers;
                for child in node.children() {
                    if self.node(child).is_module() {
                        push_unique(&mut next, child);
                    }
                }
                return Ok(next);
            }
            let mut next = Vec::new();
            for provider in providers {
                if let Some(parent) = self.node(provider).parent {
                    if !self.node(parent).is_root() && !encloses_origin(parent) {
                        push_unique(&mut next, parent);
                    }
                }
            }
            Ok(next)
        })?;

        Ok(traversal
            .into_order()
            .into_iter()
            .filter(|m| {
                let node = self.node(*m);
                node.is_module() && !node.is_anonymous() && !encloses_origin(*m)
            })
            .collect())
    }

    /// Modules below `module` with children before parents, optionally
    /// including `module` itself and dependency sorted
    pub(crate) fn all_module_ids(
        &self,
        module: ResourceId,
        sort: bool,
        include_self: bool,
    ) -> LibraryResult<Vec<ResourceId>> {
        let mut modules = Vec::new();
        for child in self.node(module).children() {
            self.collect_modules(child, &mut modules);
        }
        if include_self {
            push_unique(&mut modules, module);
        }
        if sort {
            return self.sort_ids(&modules, Scope::Test, false);
        }
        Ok(modules)
    }

    fn collect_modules(&self, id: ResourceId, modules: &mut Vec<ResourceId>) {
        let node = self.node(id);
        if !node.is_module() {
            return;
        }
        for child in node.children() {
            self.collect_modules(child, modules);
        }
        push_unique(modules, id);
    }
}
