//! Bounded key/value cache with least-recently-used eviction.

use std::hash::Hash;

use indexmap::IndexMap;

use crate::error::{RecommendError, Result};

/// A fixed-capacity map that evicts the least-recently-used entry on insert.
///
/// Recency order is the map's insertion order: a `get` or an update moves the
/// entry to the back, eviction always removes the front. `shift_remove` keeps
/// the order of the remaining entries intact, which is what makes the front
/// entry the LRU one.
#[derive(Debug, Clone)]
pub struct LruCache<K, V>
where
    K: Eq + Hash,
{
    entries: IndexMap<K, V>,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash,
{
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A zero capacity is rejected at construction time rather than producing
    /// a cache that evicts everything it is given.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(RecommendError::InvalidArgument(
                "cache capacity must be positive".to_string(),
            ));
        }
        Ok(Self {
            entries: IndexMap::with_capacity(capacity),
            capacity,
        })
    }

    /// Look up `key`, promoting it to most-recently-used on a hit.
    /// A miss has no side effects.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let index = self.entries.get_index_of(key)?;
        let back = self.entries.len() - 1;
        self.entries.move_index(index, back);
        self.entries.get(key)
    }

    /// Insert or update `key`. An existing key is refreshed to
    /// most-recently-used; a new key evicts the least-recently-used entry
    /// first when the cache is full.
    pub fn insert(&mut self, key: K, value: V) {
        if self.entries.shift_remove(&key).is_none() && self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(key, value);
    }

    /// Remove all entries. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_rejected() {
        let err = LruCache::<u32, u32>::new(0).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidArgument(_)));
    }

    #[test]
    fn inserting_over_capacity_evicts_lru() {
        let mut cache = LruCache::new(3).unwrap();
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);
        cache.insert("d", 4);
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains_key(&"a"));
        assert!(cache.contains_key(&"b"));
        assert!(cache.contains_key(&"d"));
    }

    #[test]
    fn get_promotes_entry_past_eviction() {
        let mut cache = LruCache::new(2).unwrap();
        cache.insert("a", 1);
        cache.insert("b", 2);
        // "a" becomes most-recently-used, so "b" is the eviction victim
        assert_eq!(cache.get(&"a"), Some(&1));
        cache.insert("c", 3);
        assert!(cache.contains_key(&"a"));
        assert!(!cache.contains_key(&"b"));
    }

    #[test]
    fn miss_has_no_side_effects() {
        let mut cache = LruCache::new(2).unwrap();
        cache.insert("a", 1);
        assert_eq!(cache.get(&"missing"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn updating_existing_key_refreshes_without_evicting() {
        let mut cache = LruCache::new(2).unwrap();
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("a", 10);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), Some(&10));
        // "b" was the LRU entry after the refresh of "a"
        cache.insert("c", 3);
        assert!(!cache.contains_key(&"b"));
    }

    #[test]
    fn clear_empties_but_keeps_capacity() {
        let mut cache = LruCache::new(4).unwrap();
        cache.insert(1, "x");
        cache.insert(2, "y");
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 4);
    }
}
