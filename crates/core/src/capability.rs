//! Named bundles of accessor behaviour that can be attached to units at runtime.

use crate::error::LineageError;
use crate::hierarchy::Hierarchy;
use crate::unit::{UnitId, UnitRecord};
use fxhash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Accessor bound to a capability: receives the hierarchy, the unit it was invoked on and
/// the call arguments.
pub type Accessor<V> =
    Arc<dyn Fn(&Hierarchy<V>, UnitId, &[V]) -> Result<V, LineageError> + Send + Sync>;

/// Hook run right after a capability has been attached to a unit.
pub type AttachHook<V> =
    Arc<dyn Fn(&Hierarchy<V>, UnitId) -> Result<(), LineageError> + Send + Sync>;

/// How a capability travels along composition edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    /// Mixin behaviour; copied onto dependents that need it.
    #[default]
    Extension,
    /// Behaviour of a concrete base. It already reaches dependents through normal
    /// inheritance and is never copied.
    Base,
}

pub struct Capability<V> {
    name: Arc<str>,
    kind: CapabilityKind,
    accessors: FxHashMap<Box<str>, Accessor<V>>,
    requires: Vec<Arc<str>>,
    on_attach: Option<AttachHook<V>>,
}

impl<V> fmt::Debug for Capability<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut accessors: Vec<_> = self.accessors.keys().collect();
        accessors.sort();
        f.debug_struct("Capability")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("accessors", &accessors)
            .field("requires", &self.requires)
            .field("on_attach", &self.on_attach.is_some())
            .finish()
    }
}

impl<V> Capability<V> {
    #[must_use = "The capability is not defined until the builder is built and registered"]
    pub fn builder(name: impl Into<Arc<str>>) -> CapabilityBuilder<V> {
        CapabilityBuilder {
            capability: Self {
                name: name.into(),
                kind: CapabilityKind::Extension,
                accessors: FxHashMap::default(),
                requires: Vec::new(),
                on_attach: None,
            },
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> CapabilityKind {
        self.kind
    }

    #[must_use]
    pub fn provides(&self, method: &str) -> bool {
        self.accessors.contains_key(method)
    }

    /// Capabilities attached together with this one.
    #[must_use]
    pub fn requires(&self) -> &[Arc<str>] {
        &self.requires
    }

    pub(crate) fn accessor(&self, method: &str) -> Option<Accessor<V>> {
        self.accessors.get(method).cloned()
    }

    pub(crate) fn on_attach(&self) -> Option<AttachHook<V>> {
        self.on_attach.clone()
    }
}

#[derive(Debug)]
pub struct CapabilityBuilder<V> {
    capability: Capability<V>,
}

impl<V> CapabilityBuilder<V> {
    #[must_use]
    pub const fn kind(mut self, kind: CapabilityKind) -> Self {
        self.capability.kind = kind;
        self
    }

    /// Registers an accessor. A later accessor with the same method name replaces the
    /// earlier one.
    #[must_use]
    pub fn accessor<F>(mut self, method: impl Into<Box<str>>, accessor: F) -> Self
    where
        F: Fn(&Hierarchy<V>, UnitId, &[V]) -> Result<V, LineageError> + Send + Sync + 'static,
    {
        self.capability.accessors.insert(method.into(), Arc::new(accessor));
        self
    }

    #[must_use]
    pub fn requires(mut self, capability: impl Into<Arc<str>>) -> Self {
        let capability = capability.into();
        if !self.capability.requires.contains(&capability) {
            self.capability.requires.push(capability);
        }
        self
    }

    #[must_use]
    pub fn on_attach<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Hierarchy<V>, UnitId) -> Result<(), LineageError> + Send + Sync + 'static,
    {
        self.capability.on_attach = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn build(self) -> Capability<V> {
        self.capability
    }
}

/// All capabilities known to a hierarchy.
#[derive(Debug)]
pub(crate) struct CapabilityRegistry<V> {
    defined: FxHashMap<Arc<str>, Arc<Capability<V>>>,
}

impl<V> Default for CapabilityRegistry<V> {
    fn default() -> Self {
        Self { defined: FxHashMap::default() }
    }
}

impl<V> CapabilityRegistry<V> {
    pub(crate) fn define(&mut self, capability: Capability<V>) -> Result<(), LineageError> {
        if self.defined.contains_key(&capability.name) {
            return Err(LineageError::DuplicateCapability {
                message: capability.name.to_string().into(),
                context: None,
            });
        }
        self.defined.insert(Arc::clone(&capability.name), Arc::new(capability));
        Ok(())
    }

    pub(crate) fn get(&self, name: &str) -> Result<&Arc<Capability<V>>, LineageError> {
        self.defined.get(name).ok_or_else(|| LineageError::UnknownCapability {
            message: name.to_owned().into(),
            context: None,
        })
    }

    /// Finds `method` on the unit itself. The most recently attached capability wins.
    pub(crate) fn resolve(&self, record: &UnitRecord<V>, method: &str) -> Option<Accessor<V>> {
        record
            .capabilities
            .iter()
            .rev()
            .filter_map(|name| self.defined.get(name))
            .find_map(|capability| capability.accessor(method))
    }

    /// Finds `method` among the [`CapabilityKind::Base`] capabilities of an ancestor.
    pub(crate) fn resolve_base(&self, record: &UnitRecord<V>, method: &str) -> Option<Accessor<V>> {
        record
            .capabilities
            .iter()
            .rev()
            .filter_map(|name| self.defined.get(name))
            .filter(|capability| capability.kind == CapabilityKind::Base)
            .find_map(|capability| capability.accessor(method))
    }

    /// Extensions carried by `record` that `target` lacks, oldest first.
    pub(crate) fn missing_extensions(
        &self,
        record: &UnitRecord<V>,
        target: &UnitRecord<V>,
    ) -> Vec<Arc<str>> {
        record
            .capabilities
            .iter()
            .filter(|name| !target.carries(name))
            .filter(|name| {
                self.defined.get(*name).is_some_and(|c| c.kind == CapabilityKind::Extension)
            })
            .cloned()
            .collect()
    }

    /// `name` followed by everything it requires, transitively, requirements first.
    pub(crate) fn closure(&self, name: &str) -> Result<Vec<Arc<Capability<V>>>, LineageError> {
        let mut ordered = Vec::new();
        let mut entered = FxHashSet::default();
        let mut stack = vec![(Arc::clone(self.get(name)?), false)];
        while let Some((capability, expanded)) = stack.pop() {
            if expanded {
                ordered.push(capability);
                continue;
            }
            if !entered.insert(Arc::clone(&capability.name)) {
                continue;
            }
            stack.push((Arc::clone(&capability), true));
            for required in capability.requires.iter().rev() {
                stack.push((Arc::clone(self.get(required)?), false));
            }
        }
        Ok(ordered)
    }
}
