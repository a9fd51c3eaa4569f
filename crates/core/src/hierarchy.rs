use crate::capability::CapabilityRegistry;
use crate::config::{AncestorOrder, HierarchyConfig};
use crate::dispatch::ExtensionSignal;
use crate::error::LineageError;
use crate::graph::{CompositionGraph, EdgeInsert};
use crate::store::DeclarationStore;
use crate::unit::{UnitId, UnitRecord};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Marker trait for values that can be stored as declarations.
///
/// Any type that is `Clone + Debug + Send + Sync + 'static` automatically implements it.
pub trait Declaration: Clone + fmt::Debug + Send + Sync + 'static {}
impl<T: Clone + fmt::Debug + Send + Sync + 'static> Declaration for T {}

pub(crate) struct HierarchyState<V> {
    pub(crate) graph: CompositionGraph,
    pub(crate) store: DeclarationStore<V>,
    pub(crate) capabilities: CapabilityRegistry<V>,
    pub(crate) config: HierarchyConfig,
    names: FxHashMap<Arc<str>, UnitId>,
    next_id: u64,
}

impl<V: Declaration> HierarchyState<V> {
    fn new(config: HierarchyConfig) -> Self {
        Self {
            graph: CompositionGraph::default(),
            store: DeclarationStore::default(),
            capabilities: CapabilityRegistry::default(),
            config,
            names: FxHashMap::default(),
            next_id: 0,
        }
    }

    pub(crate) fn record(&self, unit: UnitId) -> Result<&UnitRecord<V>, LineageError> {
        self.store.get(unit).ok_or_else(|| unknown_unit(unit))
    }

    pub(crate) fn record_mut(&mut self, unit: UnitId) -> Result<&mut UnitRecord<V>, LineageError> {
        self.store.get_mut(unit).ok_or_else(|| unknown_unit(unit))
    }

    pub(crate) fn name(&self, unit: UnitId) -> Result<Arc<str>, LineageError> {
        self.record(unit).map(|record| Arc::clone(&record.name))
    }
}

pub(crate) fn unknown_unit(unit: UnitId) -> LineageError {
    LineageError::UnknownUnit { message: unit.to_string().into(), context: None }
}

/// Shared handle to a graph of units, their local declarations and inherited views.
///
/// Cloning is cheap; clones observe the same hierarchy. Every write clears the affected
/// inherited caches before it returns, so any later read on any thread sees fresh data.
pub struct Hierarchy<V> {
    pub(crate) state: Arc<RwLock<HierarchyState<V>>>,
    pub(crate) extended: Arc<ExtensionSignal>,
}

impl<V> Clone for Hierarchy<V> {
    fn clone(&self) -> Self {
        Self { state: Arc::clone(&self.state), extended: Arc::clone(&self.extended) }
    }
}

impl<V> fmt::Debug for Hierarchy<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Hierarchy")
            .field("units", &state.names.len())
            .field("order", &state.config.order)
            .finish_non_exhaustive()
    }
}

impl<V: Declaration> Default for Hierarchy<V> {
    fn default() -> Self {
        Self::with_config(HierarchyConfig::default())
    }
}

impl<V: Declaration> Hierarchy<V> {
    /// Creates an empty hierarchy with [`AncestorOrder::NearestFirst`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "The builder does nothing until `build` is called"]
    pub fn builder() -> HierarchyBuilder<V> {
        HierarchyBuilder { config: HierarchyConfig::default(), _marker: PhantomData }
    }

    #[must_use]
    pub fn with_config(config: HierarchyConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(HierarchyState::new(config))),
            extended: Arc::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> HierarchyConfig {
        self.state.read().config
    }

    // ---- Units ----

    /// Registers a new unit under a unique name.
    ///
    /// # Errors
    /// [`LineageError::DuplicateUnit`] when the name is taken.
    pub fn create_unit(&self, name: impl Into<Arc<str>>) -> Result<UnitId, LineageError> {
        let name = name.into();
        let mut state = self.state.write();
        if state.names.contains_key(&name) {
            return Err(LineageError::DuplicateUnit {
                message: name.to_string().into(),
                context: None,
            });
        }
        let unit = UnitId::new(state.next_id);
        state.next_id += 1;
        state.names.insert(Arc::clone(&name), unit);
        state.store.insert(unit, Arc::clone(&name));
        trace!(%unit, name = %name, "Unit created");
        Ok(unit)
    }

    #[must_use]
    pub fn unit(&self, name: &str) -> Option<UnitId> {
        self.state.read().names.get(name).copied()
    }

    /// # Errors
    /// [`LineageError::UnknownUnit`] for a removed or foreign handle.
    pub fn name_of(&self, unit: UnitId) -> Result<Arc<str>, LineageError> {
        self.state.read().name(unit)
    }

    /// Every live unit, in creation order.
    #[must_use]
    pub fn units(&self) -> Vec<UnitId> {
        let mut units: Vec<_> = self.state.read().store.ids().collect();
        units.sort_unstable();
        units
    }

    /// Destroys a unit together with its declarations, cache and capabilities.
    ///
    /// Every unit that read through it has its cache cleared, edges to and from it are
    /// dropped and it disappears from every dependent registry.
    ///
    /// # Errors
    /// [`LineageError::UnknownUnit`] when the unit does not exist.
    pub fn remove_unit(&self, unit: UnitId) -> Result<(), LineageError> {
        let mut state = self.state.write();
        state.record(unit)?;

        let cleared = state.store.invalidate_from(unit);
        let composers = state.graph.remove_unit(unit);
        for composer in &composers {
            state.store.invalidate_from(*composer);
        }
        if let Some(record) = state.store.remove(unit) {
            state.names.remove(&record.name);
            debug!(
                %unit,
                name = %record.name,
                composers = composers.len(),
                cleared,
                "Unit removed"
            );
        }
        Ok(())
    }

    // ---- Composition ----

    /// Records that `unit` composes `ancestor`, appended after its existing direct edges.
    ///
    /// Returns `false` when the edge already existed, in which case nothing changes.
    /// A new edge clears the inherited cache of `unit` and of everything that depends on it.
    ///
    /// # Errors
    /// - [`LineageError::Cycle`] when `ancestor` already composes `unit`, or they are the
    ///   same unit. The graph is left untouched.
    /// - [`LineageError::UnknownUnit`] when either unit does not exist.
    pub fn compose(&self, unit: UnitId, ancestor: UnitId) -> Result<bool, LineageError> {
        let mut state = self.state.write();
        let unit_name = state.name(unit)?;
        let ancestor_name = state.name(ancestor)?;

        match state.graph.add_edge(unit, ancestor) {
            EdgeInsert::Added => {
                let cleared = state.store.invalidate_from(unit);
                debug!(
                    unit = %unit_name,
                    ancestor = %ancestor_name,
                    cleared,
                    "Composition edge added"
                );
                Ok(true)
            },
            EdgeInsert::Existing => Ok(false),
            EdgeInsert::Cycle => {
                warn!(
                    unit = %unit_name,
                    ancestor = %ancestor_name,
                    "Composition edge refused: cycle"
                );
                Err(LineageError::Cycle {
                    unit: unit_name.as_ref().into(),
                    ancestor: ancestor_name.as_ref().into(),
                    context: None,
                })
            },
        }
    }

    /// Direct ancestors of `unit` in the order they were composed.
    ///
    /// # Errors
    /// [`LineageError::UnknownUnit`] when the unit does not exist.
    pub fn direct_ancestors(&self, unit: UnitId) -> Result<Vec<UnitId>, LineageError> {
        let state = self.state.read();
        state.record(unit)?;
        Ok(state.graph.direct(unit).to_vec())
    }

    /// Every transitive ancestor of `unit`, each once, `unit` itself excluded.
    ///
    /// Depth-first, direct edges in the order they were added, first occurrence kept. The
    /// order does not depend on [`AncestorOrder`] and is identical across calls while the
    /// graph is unchanged.
    ///
    /// # Errors
    /// [`LineageError::UnknownUnit`] when the unit does not exist.
    pub fn ancestors(&self, unit: UnitId) -> Result<Vec<UnitId>, LineageError> {
        let state = self.state.read();
        state.record(unit)?;
        Ok(state.graph.ancestors(unit).collect())
    }

    /// Whether `ancestor` is a transitive ancestor of `unit`.
    ///
    /// # Errors
    /// [`LineageError::UnknownUnit`] when either unit does not exist.
    pub fn composes(&self, unit: UnitId, ancestor: UnitId) -> Result<bool, LineageError> {
        let state = self.state.read();
        state.record(unit)?;
        state.record(ancestor)?;
        Ok(state.graph.composes(unit, ancestor))
    }

    // ---- Local declarations ----

    /// The unit's own value for `name`. Never consults ancestors and never caches.
    ///
    /// # Errors
    /// [`LineageError::UnknownUnit`] when the unit does not exist.
    pub fn local_get(&self, unit: UnitId, name: &str) -> Result<Option<V>, LineageError> {
        let state = self.state.read();
        state.record(unit)?;
        Ok(state.store.local(unit, name))
    }

    /// Like [`Hierarchy::local_get`], falling back to `default` when unset.
    ///
    /// # Errors
    /// [`LineageError::UnknownUnit`] when the unit does not exist.
    pub fn local_get_or(&self, unit: UnitId, name: &str, default: V) -> Result<V, LineageError> {
        self.local_get(unit, name).map(|value| value.unwrap_or(default))
    }

    /// Stores `default()` when `name` is unset, applies `update` in place, and publishes
    /// the change to every dependent. Returns the updated value.
    ///
    /// Both closures run while the hierarchy is locked and must not call back into it.
    ///
    /// # Errors
    /// [`LineageError::UnknownUnit`] when the unit does not exist.
    pub fn local_get_or_init(
        &self,
        unit: UnitId,
        name: &str,
        default: impl FnOnce() -> V,
        update: impl FnOnce(&mut V),
    ) -> Result<V, LineageError> {
        self.state
            .write()
            .store
            .update_local(unit, name, default, update)
            .ok_or_else(|| unknown_unit(unit))
    }

    /// Overwrites `name` and clears the caches of every dependent. Returns `value`.
    ///
    /// # Errors
    /// [`LineageError::UnknownUnit`] when the unit does not exist.
    pub fn local_set(&self, unit: UnitId, name: &str, value: V) -> Result<V, LineageError> {
        let mut state = self.state.write();
        state.record(unit)?;
        state.store.set_local(unit, name, value.clone());
        Ok(value)
    }

    /// Deletes `name` if present and clears the caches of every dependent.
    ///
    /// # Errors
    /// [`LineageError::UnknownUnit`] when the unit does not exist.
    pub fn local_remove(&self, unit: UnitId, name: &str) -> Result<Option<V>, LineageError> {
        let mut state = self.state.write();
        state.record(unit)?;
        Ok(state.store.remove_local(unit, name))
    }

    /// Names the unit declares locally, sorted.
    ///
    /// # Errors
    /// [`LineageError::UnknownUnit`] when the unit does not exist.
    pub fn local_names(&self, unit: UnitId) -> Result<Vec<Box<str>>, LineageError> {
        let state = self.state.read();
        let mut names: Vec<_> = state.record(unit)?.locals.keys().cloned().collect();
        names.sort_unstable();
        Ok(names)
    }

    // ---- Inherited declarations ----

    /// Values of `name` declared by the ancestors of `unit`, ordered by the configured
    /// [`AncestorOrder`]. Ancestors without a value are skipped; no ancestor declaring it
    /// yields an empty sequence.
    ///
    /// The sequence is cached until a contributing ancestor changes. Building it registers
    /// `unit` as a dependent of every ancestor visited.
    ///
    /// # Errors
    /// [`LineageError::UnknownUnit`] when the unit does not exist.
    pub fn inherited(&self, unit: UnitId, name: &str) -> Result<Arc<[V]>, LineageError> {
        {
            let state = self.state.read();
            if let Some(sequence) = state.record(unit)?.cache.sequence(name) {
                trace!(%unit, name, "Inherited declarations cache hit");
                return Ok(sequence);
            }
        }

        let mut state = self.state.write();
        if let Some(sequence) = state.record(unit)?.cache.sequence(name) {
            return Ok(sequence);
        }
        Ok(Self::fill(&mut state, unit, name))
    }

    /// Aggregates the inherited sequence of `name` with `aggregator` and caches the result
    /// under `key`.
    ///
    /// The key names the aggregation: calls sharing a key on the same unit and name share
    /// one slot, so an aggregator that captures parameters must fold them into its key.
    /// A slot holding a different result type is recomputed and replaced. The aggregator
    /// runs without holding the lock.
    ///
    /// # Errors
    /// [`LineageError::UnknownUnit`] when the unit does not exist.
    pub fn inherited_with<T, F>(
        &self,
        unit: UnitId,
        name: &str,
        key: &str,
        aggregator: F,
    ) -> Result<Arc<T>, LineageError>
    where
        T: Send + Sync + 'static,
        F: FnOnce(&[V]) -> T,
    {
        let sequence = {
            let state = self.state.read();
            let record = state.record(unit)?;
            if let Some(cached) = record.cache.aggregate(name, key)
                && let Ok(cached) = cached.downcast::<T>()
            {
                trace!(%unit, name, key, "Inherited aggregation cache hit");
                return Ok(cached);
            }
            record.cache.sequence(name)
        };
        let sequence = match sequence {
            Some(sequence) => sequence,
            None => self.inherited(unit, name)?,
        };

        let value = Arc::new(aggregator(&sequence));
        let mut state = self.state.write();
        let record = state.record_mut(unit)?;
        let current = record.cache.sequence(name);
        if current.is_some_and(|current| Arc::ptr_eq(&current, &sequence)) {
            let erased: Arc<dyn Any + Send + Sync> = Arc::clone(&value) as _;
            record.cache.store_aggregate(name, key, erased);
        }
        Ok(value)
    }

    /// The unit's own value for `name` together with the inherited ones, the unit counting
    /// as its own nearest ancestor. Not cached.
    ///
    /// # Errors
    /// [`LineageError::UnknownUnit`] when the unit does not exist.
    pub fn effective(&self, unit: UnitId, name: &str) -> Result<Vec<V>, LineageError> {
        let inherited = self.inherited(unit, name)?;
        let local = self.local_get(unit, name)?;
        let mut values = Vec::with_capacity(inherited.len() + 1);
        match self.config().order {
            AncestorOrder::NearestFirst => {
                values.extend(local);
                values.extend_from_slice(&inherited);
            },
            AncestorOrder::FarthestFirst => {
                values.extend_from_slice(&inherited);
                values.extend(local);
            },
        }
        Ok(values)
    }

    /// Whether an inherited view of `name` is currently cached on `unit`.
    ///
    /// # Errors
    /// [`LineageError::UnknownUnit`] when the unit does not exist.
    pub fn is_cached(&self, unit: UnitId, name: &str) -> Result<bool, LineageError> {
        Ok(self.state.read().record(unit)?.cache.contains(name))
    }

    /// Units registered as dependents of `unit`, sorted.
    ///
    /// # Errors
    /// [`LineageError::UnknownUnit`] when the unit does not exist.
    pub fn dependents_of(&self, unit: UnitId) -> Result<Vec<UnitId>, LineageError> {
        let state = self.state.read();
        let mut dependents: Vec<_> = state.record(unit)?.dependents.iter().copied().collect();
        dependents.sort_unstable();
        Ok(dependents)
    }

    /// Clears the inherited caches of every unit depending on `unit`, transitively.
    ///
    /// Writes through the hierarchy do this already; call it after mutating a declaration
    /// through interior mutability. Returns the number of caches that held something.
    ///
    /// # Errors
    /// [`LineageError::UnknownUnit`] when the unit does not exist.
    pub fn invalidate_dependents(&self, unit: UnitId) -> Result<usize, LineageError> {
        let mut state = self.state.write();
        state.record(unit)?;
        Ok(state.store.invalidate_dependents(unit))
    }

    fn fill(state: &mut HierarchyState<V>, unit: UnitId, name: &str) -> Arc<[V]> {
        let HierarchyState { graph, store, config, .. } = state;
        store.fill(graph, config.order, unit, name)
    }
}

/// Configures a [`Hierarchy`] before creation.
#[derive(Debug)]
pub struct HierarchyBuilder<V> {
    config: HierarchyConfig,
    _marker: PhantomData<fn() -> V>,
}

impl<V: Declaration> HierarchyBuilder<V> {
    #[must_use = "Sets the order of inherited sequences"]
    pub const fn order(mut self, order: AncestorOrder) -> Self {
        self.config.order = order;
        self
    }

    #[must_use = "Replaces the whole configuration"]
    pub const fn config(mut self, config: HierarchyConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn build(self) -> Hierarchy<V> {
        debug!(order = ?self.config.order, "Hierarchy created");
        Hierarchy::with_config(self.config)
    }
}
