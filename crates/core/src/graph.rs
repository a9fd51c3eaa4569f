//! Composition edges between units and the ancestor traversal built on them.

use crate::unit::UnitId;
use fxhash::{FxHashMap, FxHashSet};

/// Result of recording a composition edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeInsert {
    Added,
    Existing,
    Cycle,
}

/// Ordered direct composition edges, `unit -> [ancestor, ...]`.
#[derive(Debug, Default)]
pub(crate) struct CompositionGraph {
    edges: FxHashMap<UnitId, Vec<UnitId>>,
}

impl CompositionGraph {
    pub(crate) fn direct(&self, unit: UnitId) -> &[UnitId] {
        self.edges.get(&unit).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every transitive ancestor of `unit`, each exactly once, `unit` itself excluded.
    ///
    /// Depth-first pre-order; direct edges are followed in the order they were added and
    /// an ancestor reachable through several paths keeps its first position. Each call
    /// starts a fresh walk.
    pub(crate) fn ancestors(&self, unit: UnitId) -> Ancestors<'_> {
        let mut visited = FxHashSet::default();
        visited.insert(unit);
        Ancestors { graph: self, stack: self.direct(unit).iter().rev().copied().collect(), visited }
    }

    /// Whether `ancestor` is reachable from `unit`.
    pub(crate) fn composes(&self, unit: UnitId, ancestor: UnitId) -> bool {
        self.ancestors(unit).any(|a| a == ancestor)
    }

    pub(crate) fn add_edge(&mut self, unit: UnitId, ancestor: UnitId) -> EdgeInsert {
        if unit == ancestor || self.composes(ancestor, unit) {
            return EdgeInsert::Cycle;
        }
        let direct = self.edges.entry(unit).or_default();
        if direct.contains(&ancestor) {
            return EdgeInsert::Existing;
        }
        direct.push(ancestor);
        EdgeInsert::Added
    }

    /// Drops `unit` and every edge touching it.
    ///
    /// Returns the units that lost a direct ancestor, in no particular order.
    pub(crate) fn remove_unit(&mut self, unit: UnitId) -> Vec<UnitId> {
        self.edges.remove(&unit);
        let mut orphaned = Vec::new();
        for (composer, direct) in &mut self.edges {
            let before = direct.len();
            direct.retain(|a| *a != unit);
            if direct.len() != before {
                orphaned.push(*composer);
            }
        }
        self.edges.retain(|_, direct| !direct.is_empty());
        orphaned
    }
}

/// Lazy ancestor walk returned by [`CompositionGraph::ancestors`].
#[derive(Debug, Clone)]
pub(crate) struct Ancestors<'g> {
    graph: &'g CompositionGraph,
    stack: Vec<UnitId>,
    visited: FxHashSet<UnitId>,
}

impl Iterator for Ancestors<'_> {
    type Item = UnitId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if !self.visited.insert(current) {
                continue;
            }
            let visited = &self.visited;
            self.stack
                .extend(self.graph.direct(current).iter().rev().filter(|a| !visited.contains(*a)));
            return Some(current);
        }
        None
    }
}
