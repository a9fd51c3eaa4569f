use fxhash::FxHashMap;
use std::any::Any;
use std::sync::Arc;

/// Memoized inherited views of one unit, keyed by declaration name.
///
/// Each name caches the ordered contribution sequence and, next to it, any aggregations
/// computed from that sequence, each under a caller-chosen key. The cache is only ever
/// cleared as a whole.
#[derive(Debug)]
pub(crate) struct InheritedCache<V> {
    entries: FxHashMap<Box<str>, CacheEntry<V>>,
}

#[derive(Debug)]
struct CacheEntry<V> {
    sequence: Arc<[V]>,
    aggregates: FxHashMap<Box<str>, Arc<dyn Any + Send + Sync>>,
}

impl<V> Default for InheritedCache<V> {
    fn default() -> Self {
        Self { entries: FxHashMap::default() }
    }
}

impl<V> InheritedCache<V> {
    pub(crate) fn sequence(&self, name: &str) -> Option<Arc<[V]>> {
        self.entries.get(name).map(|entry| Arc::clone(&entry.sequence))
    }

    pub(crate) fn aggregate(&self, name: &str, key: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.entries.get(name).and_then(|entry| entry.aggregates.get(key)).cloned()
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub(crate) fn store_sequence(&mut self, name: &str, sequence: Arc<[V]>) {
        self.entries
            .insert(name.into(), CacheEntry { sequence, aggregates: FxHashMap::default() });
    }

    /// Stores an aggregation next to an already cached sequence.
    ///
    /// Returns `false` when the sequence is gone, in which case nothing is stored.
    pub(crate) fn store_aggregate(
        &mut self,
        name: &str,
        key: &str,
        value: Arc<dyn Any + Send + Sync>,
    ) -> bool {
        self.entries.get_mut(name).map(|entry| entry.aggregates.insert(key.into(), value)).is_some()
    }

    /// Drops every cached name. Returns whether anything was cached.
    pub(crate) fn clear(&mut self) -> bool {
        let populated = !self.entries.is_empty();
        self.entries.clear();
        populated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_live_and_die_with_their_sequence() {
        let mut cache = InheritedCache::<i64>::default();
        let key = "total";

        assert!(!cache.store_aggregate("x", key, Arc::new(3_i64)));

        cache.store_sequence("x", Arc::from(vec![1, 2]));
        assert!(cache.store_aggregate("x", key, Arc::new(3_i64)));
        assert_eq!(cache.sequence("x").as_deref(), Some(&[1, 2][..]));
        assert!(cache.aggregate("x", key).is_some());
        assert!(cache.aggregate("x", "count").is_none());

        assert!(cache.clear());
        assert!(!cache.contains("x"));
        assert!(cache.aggregate("x", key).is_none());
        assert!(!cache.clear(), "second clear has nothing to drop");
    }

    #[test]
    fn restoring_a_sequence_resets_its_aggregates() {
        let mut cache = InheritedCache::<i64>::default();
        let key = "total";
        cache.store_sequence("x", Arc::from(vec![1]));
        cache.store_aggregate("x", key, Arc::new(1_i64));

        cache.store_sequence("x", Arc::from(vec![1, 5]));
        assert!(cache.aggregate("x", key).is_none());
        assert!(cache.contains("x"));
    }
}
