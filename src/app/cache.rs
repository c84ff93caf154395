use crate::domain::{SessionSummary, SourceFilter};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(4);
pub const MAX_CACHE_ENTRIES: usize = 16;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SessionCacheKey {
    pub filter: SourceFilter,
    pub limit: usize,
}

/// Short-lived list cache: entries expire after the TTL and the oldest
/// inserted key is evicted once the cache is full.
#[derive(Debug)]
pub struct SessionCache {
    ttl: Duration,
    max_entries: usize,
    entries: HashMap<SessionCacheKey, (Instant, Vec<SessionSummary>)>,
    insertion_order: VecDeque<SessionCacheKey>,
}

impl SessionCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, MAX_CACHE_ENTRIES)
    }

    pub fn with_capacity(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    pub fn get(&mut self, key: SessionCacheKey) -> Option<Vec<SessionSummary>> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&mut self, key: SessionCacheKey, now: Instant) -> Option<Vec<SessionSummary>> {
        let (stored_at, value) = self.entries.get(&key)?;
        if now.saturating_duration_since(*stored_at) < self.ttl {
            return Some(value.clone());
        }
        self.remove(key);
        None
    }

    pub fn set(&mut self, key: SessionCacheKey, value: Vec<SessionSummary>) {
        self.set_at(key, value, Instant::now());
    }

    pub fn set_at(&mut self, key: SessionCacheKey, value: Vec<SessionSummary>, now: Instant) {
        self.remove(key);
        self.entries.insert(key, (now, value));
        self.insertion_order.push_back(key);

        while self.entries.len() > self.max_entries {
            let Some(oldest) = self.insertion_order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }

    pub fn remove(&mut self, key: SessionCacheKey) {
        if self.entries.remove(&key).is_some() {
            self.insertion_order.retain(|existing| *existing != key);
        }
    }

    pub fn invalidate_all(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(limit: usize) -> SessionCacheKey {
        SessionCacheKey {
            filter: SourceFilter::All,
            limit,
        }
    }

    #[test]
    fn returns_fresh_entries_and_evicts_expired_ones() {
        let mut cache = SessionCache::new(Duration::from_secs(4));
        let start = Instant::now();
        cache.set_at(key(10), Vec::new(), start);

        assert!(cache.get_at(key(10), start + Duration::from_secs(3)).is_some());
        assert!(cache.get_at(key(10), start + Duration::from_secs(4)).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn evicts_oldest_inserted_when_full() {
        let mut cache = SessionCache::with_capacity(Duration::from_secs(60), 2);
        let now = Instant::now();
        cache.set_at(key(1), Vec::new(), now);
        cache.set_at(key(2), Vec::new(), now);
        assert!(cache.get_at(key(1), now).is_some());
        cache.set_at(key(3), Vec::new(), now);

        assert!(cache.get_at(key(1), now).is_none());
        assert!(cache.get_at(key(2), now).is_some());
        assert!(cache.get_at(key(3), now).is_some());
    }

    #[test]
    fn keys_differ_by_filter_and_limit() {
        let mut cache = SessionCache::default();
        cache.set(key(10), Vec::new());
        let other = SessionCacheKey {
            filter: SourceFilter::Codex,
            limit: 10,
        };
        assert!(cache.get(other).is_none());
        assert!(cache.get(key(20)).is_none());
        assert!(cache.get(key(10)).is_some());
    }

    #[test]
    fn invalidate_all_clears_everything() {
        let mut cache = SessionCache::default();
        cache.set(key(1), Vec::new());
        cache.set(key(2), Vec::new());
        cache.invalidate_all();
        assert_eq!(cache.len(), 0);
        assert!(cache.get(key(1)).is_none());
    }
}
