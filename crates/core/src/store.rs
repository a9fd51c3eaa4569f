//! Per-unit local declarations, inherited caches and the dependent registry.

use crate::config::AncestorOrder;
use crate::graph::CompositionGraph;
use crate::unit::{UnitId, UnitRecord};
use fxhash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Debug)]
pub(crate) struct DeclarationStore<V> {
    units: FxHashMap<UnitId, UnitRecord<V>>,
}

impl<V> Default for DeclarationStore<V> {
    fn default() -> Self {
        Self { units: FxHashMap::default() }
    }
}

impl<V: Clone> DeclarationStore<V> {
    pub(crate) fn insert(&mut self, unit: UnitId, name: Arc<str>) {
        self.units.insert(unit, UnitRecord::new(name));
    }

    pub(crate) fn get(&self, unit: UnitId) -> Option<&UnitRecord<V>> {
        self.units.get(&unit)
    }

    pub(crate) fn get_mut(&mut self, unit: UnitId) -> Option<&mut UnitRecord<V>> {
        self.units.get_mut(&unit)
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.units.keys().copied()
    }

    /// Tears a unit down and forgets it in every registry it was listed in.
    pub(crate) fn remove(&mut self, unit: UnitId) -> Option<UnitRecord<V>> {
        let record = self.units.remove(&unit)?;
        for other in self.units.values_mut() {
            other.dependents.remove(&unit);
        }
        Some(record)
    }

    pub(crate) fn local(&self, unit: UnitId, name: &str) -> Option<V> {
        self.units.get(&unit).and_then(|record| record.locals.get(name)).cloned()
    }

    pub(crate) fn set_local(&mut self, unit: UnitId, name: &str, value: V) {
        if let Some(record) = self.units.get_mut(&unit) {
            record.locals.insert(name.into(), value);
        }
        self.invalidate_dependents(unit);
    }

    pub(crate) fn remove_local(&mut self, unit: UnitId, name: &str) -> Option<V> {
        let removed = self.units.get_mut(&unit).and_then(|record| record.locals.remove(name));
        self.invalidate_dependents(unit);
        removed
    }

    /// Initializes `name` with `default` when unset, applies `update` in place and
    /// publishes the change to dependents.
    pub(crate) fn update_local(
        &mut self,
        unit: UnitId,
        name: &str,
        default: impl FnOnce() -> V,
        update: impl FnOnce(&mut V),
    ) -> Option<V> {
        let value = {
            let record = self.units.get_mut(&unit)?;
            let slot = record.locals.entry(name.into()).or_insert_with(default);
            update(slot);
            slot.clone()
        };
        self.invalidate_dependents(unit);
        Some(value)
    }

    /// Collects `name` across the ancestors of `unit` and caches the sequence.
    ///
    /// `unit` is registered as a dependent of every ancestor visited, including those that
    /// never declared `name`, so a later declaration there still reaches this cache.
    pub(crate) fn fill(
        &mut self,
        graph: &CompositionGraph,
        order: AncestorOrder,
        unit: UnitId,
        name: &str,
    ) -> Arc<[V]> {
        let mut contributions = Vec::new();
        let mut visited = 0_usize;
        for ancestor in graph.ancestors(unit) {
            let Some(record) = self.units.get_mut(&ancestor) else { continue };
            visited += 1;
            record.dependents.insert(unit);
            if let Some(value) = record.locals.get(name) {
                contributions.push(value.clone());
            }
        }

        let sequence: Arc<[V]> = order.arrange(contributions).into();
        if let Some(record) = self.units.get_mut(&unit) {
            record.cache.store_sequence(name, Arc::clone(&sequence));
        }
        trace!(%unit, name, visited, found = sequence.len(), "Inherited declarations cached");
        sequence
    }

    /// Clears the inherited cache of every unit that depends on `unit`, transitively.
    ///
    /// Returns the number of caches that held something.
    pub(crate) fn invalidate_dependents(&mut self, unit: UnitId) -> usize {
        let pending: Vec<UnitId> = self
            .units
            .get(&unit)
            .map(|record| record.dependents.iter().copied().collect())
            .unwrap_or_default();
        self.sweep(unit, pending)
    }

    /// Clears `unit`'s own cache and then everything depending on it.
    pub(crate) fn invalidate_from(&mut self, unit: UnitId) -> usize {
        self.sweep(unit, vec![unit])
    }

    fn sweep(&mut self, origin: UnitId, mut pending: Vec<UnitId>) -> usize {
        let mut seen = FxHashSet::default();
        let mut cleared = 0;
        while let Some(next) = pending.pop() {
            if !seen.insert(next) {
                continue;
            }
            let Some(record) = self.units.get_mut(&next) else { continue };
            if record.cache.clear() {
                cleared += 1;
            }
            pending.extend(record.dependents.iter().copied());
        }
        if cleared > 0 {
            debug!(%origin, reached = seen.len(), cleared, "Inherited caches invalidated");
        }
        cleared
    }
}
