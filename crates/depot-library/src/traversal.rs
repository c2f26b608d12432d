//! Depth-first graph traversal shared by expansion, consumer lookup,
//! module collection and sorting.

use std::collections::HashSet;
use std::hash::Hash;

/// Visited set plus emitted order for one logical walk.
///
/// A single `Traversal` may be driven from several start nodes; nodes are
/// emitted at most once across all of them.
#[derive(Debug)]
pub(crate) struct Traversal<T> {
    visited: HashSet<T>,
    order: Vec<T>,
    path: Vec<T>,
    cycles: Vec<Vec<T>>,
}

impl<T: Copy + Eq + Hash> Traversal<T> {
    pub fn new() -> Self {
        Self {
            visited: HashSet::new(),
            order: Vec::new(),
            path: Vec::new(),
            cycles: Vec::new(),
        }
    }

    /// Emit every node after its neighbors
    pub fn post_order<E, F>(&mut self, start: T, neighbors: &mut F) -> Result<(), E>
    where
        F: FnMut(T) -> Result<Vec<T>, E>,
    {
        if self.path.contains(&start) {
            self.record_cycle(start);
            return Ok(());
        }
        if !self.visited.insert(start) {
            return Ok(());
        }

        self.path.push(start);
        for next in neighbors(start)? {
            self.post_order(next, neighbors)?;
        }
        self.path.pop();

        if !self.order.contains(&start) {
            self.order.push(start);
        }
        Ok(())
    }

    /// Emit every node before its neighbors
    pub fn pre_order<E, F>(&mut self, start: T, neighbors: &mut F) -> Result<(), E>
    where
        F: FnMut(T) -> Result<Vec<T>, E>,
    {
        if !self.visited.insert(start) {
            return Ok(());
        }

        self.order.push(start);
        for next in neighbors(start)? {
            self.pre_order(next, neighbors)?;
        }
        Ok(())
    }

    fn record_cycle(&mut self, back_edge: T) {
        if let Some(start) = self.path.iter().position(|n| *n == back_edge) {
            let mut cycle = self.path[start..].to_vec();
            cycle.push(back_edge);
            self.cycles.push(cycle);
        }
    }

    #[cfg(test)]
    pub fn is_visited(&self, node: &T) -> bool {
        self.visited.contains(node)
    }

    /// Back edges found so far, each as the path from the repeated node back to itself
    #[cfg(test)]
    pub fn cycles(&self) -> &[Vec<T>] {
        &self.cycles
    }

    pub fn into_order(self) -> Vec<T> {
        self.order
    }

    pub fn into_parts(self) -> (Vec<T>, Vec<Vec<T>>) {
        (self.order, self.cycles)
    }
}

impl<T: Copy + Eq + Hash> Default for Traversal<T> {
    fn default() -> Self {
        Self::new()
    }
}
