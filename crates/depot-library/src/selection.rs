//! Glob selection over the module tree
//!
//! Criteria are `/`-delimited tokens. `**` matches any depth of modules,
//! `*` matches any child, and other tokens match child names with `*`
//! standing for any run of characters.

use crate::error::{LibraryError, LibraryResult};
use crate::graph::ResourceId;
use crate::library::Library;
use crate::resource::push_unique;
use regex::Regex;
use tracing::trace;

/// Split like a `/` tokenizer that drops trailing empty tokens
fn tokens(criteria: &str) -> Vec<&str> {
    if criteria.is_empty() {
        return vec![""];
    }
    let mut tokens: Vec<&str> = criteria.split('/').collect();
    while tokens.last() == Some(&"") {
        tokens.pop();
    }
    tokens
}

/// Anchored regex for a name token
fn name_pattern(token: &str) -> LibraryResult<Regex> {
    let body = token
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^(?:{})$", body))
        .map_err(|error| LibraryError::invalid_path(token, error))
}

impl Library {
    /// Resources below `module` matching `criteria`, optionally restricted
    /// to those with a basedir
    pub(crate) fn select_ids(
        &self,
        module: ResourceId,
        criteria: &str,
        local: bool,
    ) -> LibraryResult<Vec<ResourceId>> {
        trace!(module = %self.node(module).path, criteria, local, "selecting resources");
        let mut selection = self.select_within(module, false, criteria)?;
        if local {
            selection.retain(|id| self.node(*id).basedir.is_some());
        }
        Ok(selection)
    }

    fn select_within(
        &self,
        module: ResourceId,
        wild: bool,
        criteria: &str,
    ) -> LibraryResult<Vec<ResourceId>> {
        let node = self.node(module);
        let tokens = tokens(criteria);

        match tokens.as_slice() {
            [] => Ok(Vec::new()),
            [token] => {
                if *token == "**" {
                    return self.all_module_ids(module, true, !node.is_root());
                }
                if *token == "*" {
                    let mut selection: Vec<ResourceId> = node.children().collect();
                    if wild && !node.is_root() {
                        selection.push(module);
                    }
                    return Ok(selection);
                }
                let pattern = name_pattern(token)?;
                Ok(node
                    .children()
                    .filter(|child| pattern.is_match(self.node(*child).name()))
                    .collect())
            }
            [token, ..] => {
                let wildcard = token.contains("**");
                let remainder = &criteria[token.len() + 1..];
                let mut selection = Vec::new();
                for candidate in self.select_modules(module, token)? {
                    for id in self.select_within(candidate, wildcard, remainder)? {
                        push_unique(&mut selection, id);
                    }
                }
                if wildcard {
                    for id in self.select_within(module, wildcard, remainder)? {
                        push_unique(&mut selection, id);
                    }
                }
                Ok(selection)
            }
        }
    }

    /// Modules below `module` named by a single leading token
    fn select_modules(&self, module: ResourceId, token: &str) -> LibraryResult<Vec<ResourceId>> {
        let node = self.node(module);
        if token == "**" {
            return self.all_module_ids(module, true, !node.is_root());
        }
        let children = node.children().filter(|id| self.node(*id).is_module());
        if token == "*" {
            return Ok(children.collect());
        }
        let pattern = name_pattern(token)?;
        Ok(children
            .filter(|id| pattern.is_match(self.node(*id).name()))
            .collect())
    }
}
