//! Capability attachment and method dispatch with on-demand extension of dependents.

use crate::capability::{Accessor, Capability};
use crate::error::LineageError;
use crate::hierarchy::{Declaration, Hierarchy, HierarchyState};
use crate::unit::UnitId;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread;
use tracing::{debug, trace, warn};

/// Wakes callers that found a unit being extended by another thread.
#[derive(Debug, Default)]
pub(crate) struct ExtensionSignal {
    rounds: Mutex<u64>,
    finished: Condvar,
}

impl ExtensionSignal {
    fn round(&self) -> u64 {
        *self.rounds.lock()
    }

    fn wait_past(&self, round: u64) {
        let mut rounds = self.rounds.lock();
        while *rounds == round {
            self.finished.wait(&mut rounds);
        }
    }

    fn finish(&self) {
        *self.rounds.lock() += 1;
        self.finished.notify_all();
    }
}

/// Releases the unit's "currently extending" claim when the attachment round ends,
/// including when a hook fails, and wakes waiting callers.
struct ExtendingFlag<'h, V: Declaration> {
    hierarchy: &'h Hierarchy<V>,
    unit: UnitId,
}

impl<V: Declaration> Drop for ExtendingFlag<'_, V> {
    fn drop(&mut self) {
        if let Some(record) = self.hierarchy.state.write().store.get_mut(self.unit) {
            record.extending = None;
        }
        self.hierarchy.extended.finish();
    }
}

impl<V: Declaration> Hierarchy<V> {
    /// Makes a capability available for attachment.
    ///
    /// # Errors
    /// [`LineageError::DuplicateCapability`] when a capability with that name exists.
    pub fn define_capability(&self, capability: Capability<V>) -> Result<(), LineageError> {
        let name = Arc::<str>::from(capability.name());
        self.state.write().capabilities.define(capability)?;
        trace!(capability = %name, "Capability defined");
        Ok(())
    }

    /// Attaches `capability`, preceded by everything it requires, to `unit`.
    ///
    /// Capabilities the unit already carries are skipped. `on_attach` hooks run after the
    /// lock is released, in attachment order, and may call back into the hierarchy.
    /// Returns whether anything new was attached.
    ///
    /// # Errors
    /// - [`LineageError::UnknownUnit`] / [`LineageError::UnknownCapability`] for unknown names.
    /// - Whatever an `on_attach` hook returns. Attachments made before the failure stay.
    pub fn attach(&self, unit: UnitId, capability: &str) -> Result<bool, LineageError> {
        Ok(self.attach_all(unit, capability)? > 0)
    }

    /// Capability names carried by `unit`, oldest first.
    ///
    /// # Errors
    /// [`LineageError::UnknownUnit`] when the unit does not exist.
    pub fn capabilities_of(&self, unit: UnitId) -> Result<Vec<Arc<str>>, LineageError> {
        Ok(self.state.read().record(unit)?.capabilities.clone())
    }

    /// Whether `method` resolves on `unit` without attaching anything.
    ///
    /// # Errors
    /// [`LineageError::UnknownUnit`] when the unit does not exist.
    pub fn responds_to(&self, unit: UnitId, method: &str) -> Result<bool, LineageError> {
        lookup(&self.state.read(), unit, method).map(|accessor| accessor.is_some())
    }

    /// Calls `method` on `unit`.
    ///
    /// Resolution looks at the unit's own capabilities (most recently attached first) and
    /// then at the base capabilities of its ancestors. When that fails, the nearest ancestor
    /// providing `method` lends its extensions: every one the unit does not carry yet is
    /// attached and the call is retried. The accessor itself runs without the lock held.
    ///
    /// # Errors
    /// - [`LineageError::MethodNotFound`] when no ancestor provides `method`, when every
    ///   extension is already attached, or when the call re-enters from a hook while the
    ///   same thread is extending the unit. Callers on other threads wait for that round to
    ///   finish and retry.
    /// - [`LineageError::UnknownUnit`] when the unit does not exist.
    /// - Whatever the accessor or an `on_attach` hook returns.
    pub fn invoke(&self, unit: UnitId, method: &str, args: &[V]) -> Result<V, LineageError> {
        loop {
            let missing = {
                let mut state = self.state.write();
                if let Some(accessor) = lookup(&state, unit, method)? {
                    drop(state);
                    trace!(%unit, method, "Dispatching");
                    return accessor(self, unit, args);
                }

                let unit_name = state.name(unit)?;
                let current = thread::current().id();
                let owner = state.record(unit)?.extending;
                match owner {
                    Some(owner) if owner == current => {
                        warn!(unit = %unit_name, method, "Reentrant call while extending");
                        return Err(method_not_found(&unit_name, method));
                    },
                    Some(_) => {
                        let round = self.extended.round();
                        drop(state);
                        trace!(unit = %unit_name, method, "Waiting for another thread to extend");
                        self.extended.wait_past(round);
                        continue;
                    },
                    None => {},
                }

                let missing = nearest_provider_extensions(&state, unit, method)?;
                if missing.is_empty() {
                    trace!(unit = %unit_name, method, "No ancestor can extend the unit");
                    return Err(method_not_found(&unit_name, method));
                }
                state.record_mut(unit)?.extending = Some(current);
                missing
            };

            let guard = ExtendingFlag { hierarchy: self, unit };
            let mut attached = 0;
            for capability in &missing {
                attached += self.attach_all(unit, capability)?;
            }
            drop(guard);

            if attached == 0 {
                return Err(method_not_found(&self.name_of(unit)?, method));
            }
            debug!(%unit, method, attached, "Unit extended on demand");
        }
    }

    /// Attaches to every unit each extension carried by any of its ancestors, so that
    /// dispatch never has to extend on demand. Returns the number of attachments made.
    ///
    /// # Errors
    /// Whatever an `on_attach` hook returns.
    pub fn propagate_capabilities(&self) -> Result<usize, LineageError> {
        let plan: Vec<(UnitId, Vec<Arc<str>>)> = {
            let state = self.state.read();
            let mut units: Vec<_> = state.store.ids().collect();
            units.sort_unstable();
            units
                .into_iter()
                .filter_map(|unit| {
                    let target = state.store.get(unit)?;
                    let mut missing: Vec<Arc<str>> = Vec::new();
                    for ancestor in state.graph.ancestors(unit) {
                        let Some(record) = state.store.get(ancestor) else { continue };
                        for name in state.capabilities.missing_extensions(record, target) {
                            if !missing.contains(&name) {
                                missing.push(name);
                            }
                        }
                    }
                    (!missing.is_empty()).then_some((unit, missing))
                })
                .collect()
        };

        let mut attached = 0;
        for (unit, missing) in plan {
            for capability in &missing {
                attached += self.attach_all(unit, capability)?;
            }
        }
        debug!(attached, "Capabilities propagated");
        Ok(attached)
    }

    fn attach_all(&self, unit: UnitId, capability: &str) -> Result<usize, LineageError> {
        let attached = {
            let mut state = self.state.write();
            let closure = state.capabilities.closure(capability)?;
            let record = state.record_mut(unit)?;
            let mut attached = Vec::new();
            for candidate in closure {
                if !record.carries(candidate.name()) {
                    record.capabilities.push(Arc::from(candidate.name()));
                    attached.push(candidate);
                }
            }
            attached
        };

        for candidate in &attached {
            debug!(%unit, capability = candidate.name(), "Capability attached");
            if let Some(hook) = candidate.on_attach() {
                hook(self, unit)?;
            }
        }
        Ok(attached.len())
    }
}

fn lookup<V: Declaration>(
    state: &HierarchyState<V>,
    unit: UnitId,
    method: &str,
) -> Result<Option<Accessor<V>>, LineageError> {
    let record = state.record(unit)?;
    if let Some(accessor) = state.capabilities.resolve(record, method) {
        return Ok(Some(accessor));
    }
    Ok(state
        .graph
        .ancestors(unit)
        .filter_map(|ancestor| state.store.get(ancestor))
        .find_map(|ancestor| state.capabilities.resolve_base(ancestor, method)))
}

/// Extensions of the nearest ancestor providing `method` that `unit` does not carry.
fn nearest_provider_extensions<V: Declaration>(
    state: &HierarchyState<V>,
    unit: UnitId,
    method: &str,
) -> Result<Vec<Arc<str>>, LineageError> {
    let target = state.record(unit)?;
    let provider = state
        .graph
        .ancestors(unit)
        .filter_map(|ancestor| state.store.get(ancestor))
        .find(|ancestor| state.capabilities.resolve(ancestor, method).is_some());
    Ok(provider
        .map(|provider| state.capabilities.missing_extensions(provider, target))
        .unwrap_or_default())
}

fn method_not_found(unit: &str, method: &str) -> LineageError {
    LineageError::MethodNotFound { unit: unit.into(), method: method.into(), context: None }
}
