// SPDX-License-Identifier: MIT OR Apache-2.0

//! A bounded cache for name lookups.
//!
//! Property sources whose structured lookups are expensive own one of these
//! rather than relying on process-wide state.

use moka::policy::EvictionPolicy as MokaEvictionPolicy;
use moka::sync::Cache;
use std::fmt;
use std::hash::Hash;
use std::time::Duration;

/// How entries are evicted once the cache is full.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Evict the least recently used entry.
    LeastRecentlyUsed,
    /// Entries expire after the given duration; least recently used go first when full.
    TimeToLive(Duration),
}

/// A thread-safe cache with a fixed capacity and an injected eviction policy.
///
/// Eviction is carried out lazily, so the cache may briefly hold more than
/// `capacity` entries.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::name_cache::{EvictionPolicy, NameCache};
///
/// let cache = NameCache::new(16, EvictionPolicy::LeastRecentlyUsed);
/// cache.insert("a", 1);
/// assert_eq!(cache.get(&"a"), Some(1));
/// assert_eq!(cache.get_or_insert_with(&"b", || 2), 2);
/// assert_eq!(cache.get_or_insert_with(&"b", || 3), 2);
/// ```
pub struct NameCache<K, V> {
    policy: EvictionPolicy,
    inner: Cache<K, V>,
}

impl<K, V> NameCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache holding at most `capacity` entries.
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Self {
        let builder = Cache::builder()
            .max_capacity(capacity.max(1) as u64)
            .eviction_policy(MokaEvictionPolicy::lru());
        let inner = match policy {
            EvictionPolicy::LeastRecentlyUsed => builder.build(),
            EvictionPolicy::TimeToLive(ttl) => builder.time_to_live(ttl).build(),
        };
        Self { policy, inner }
    }

    /// Returns a cached value, refreshing its recency.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key)
    }

    /// Inserts a value, evicting according to the policy when full.
    pub fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    /// Returns the cached value or computes and caches it.
    pub fn get_or_insert_with<F: FnOnce() -> V>(&self, key: &K, compute: F) -> V {
        self.inner.get_with(key.clone(), compute)
    }

    /// Returns the eviction policy.
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Returns the number of cached entries once pending evictions have run.
    pub fn len(&self) -> usize {
        self.inner.run_pending_tasks();
        self.inner.entry_count() as usize
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> fmt::Debug for NameCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameCache")
            .field("policy", &self.policy)
            .field("max_capacity", &self.inner.policy().max_capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_bounded() {
        let cache = NameCache::new(2, EvictionPolicy::LeastRecentlyUsed);
        for i in 0..10 {
            cache.insert(i, i * 10);
        }
        assert!(cache.len() <= 2);
    }

    #[test]
    fn test_replacing_keeps_one_entry() {
        let cache = NameCache::new(1, EvictionPolicy::LeastRecentlyUsed);
        cache.insert("k", 1);
        cache.insert("k", 2);
        assert_eq!(cache.get(&"k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = NameCache::new(4, EvictionPolicy::TimeToLive(Duration::from_millis(1)));
        cache.insert("k", 1);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get(&"k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_or_insert_with() {
        let cache = NameCache::new(4, EvictionPolicy::LeastRecentlyUsed);
        assert_eq!(cache.get_or_insert_with(&"a", || 1), 1);
        assert_eq!(cache.get_or_insert_with(&"a", || 2), 1);
        assert_eq!(cache.policy(), EvictionPolicy::LeastRecentlyUsed);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache = NameCache::new(0, EvictionPolicy::LeastRecentlyUsed);
        cache.insert("a", 1);
        assert_eq!(cache.get(&"a"), Some(1));
    }
}
