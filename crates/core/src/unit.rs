use crate::cache::InheritedCache;
use fxhash::{FxHashMap, FxHashSet};
use std::fmt;
use std::sync::Arc;
use std::thread::ThreadId;

/// Handle to a unit registered in a [`Hierarchy`](crate::Hierarchy).
///
/// Handles are never reused, so a handle to a removed unit stays invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u64);

impl UnitId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// Everything a single unit owns.
#[derive(Debug)]
pub(crate) struct UnitRecord<V> {
    pub(crate) name: Arc<str>,
    pub(crate) locals: FxHashMap<Box<str>, V>,
    pub(crate) cache: InheritedCache<V>,
    /// Units whose inherited cache was built by reading through this one.
    pub(crate) dependents: FxHashSet<UnitId>,
    /// Attached capabilities, oldest first.
    pub(crate) capabilities: Vec<Arc<str>>,
    /// Thread currently attaching extensions to this unit.
    pub(crate) extending: Option<ThreadId>,
}

impl<V> UnitRecord<V> {
    pub(crate) fn new(name: Arc<str>) -> Self {
        Self {
            name,
            locals: FxHashMap::default(),
            cache: InheritedCache::default(),
            dependents: FxHashSet::default(),
            capabilities: Vec::new(),
            extending: None,
        }
    }

    pub(crate) fn carries(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| &**c == capability)
    }
}
