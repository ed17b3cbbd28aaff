use crate::lru::LruCache;
use crate::query::{QueryProcessor, ScoredDoc};
use crate::stats::CacheStats;
use serde::Serialize;
use std::num::NonZeroUsize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyOrigin {
    /// Served from the cache.
    Hit,
    /// Computed and stored in the cache.
    Stored,
    /// Computed but a sentinel, so not cached.
    Uncached,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchReply {
    pub origin: ReplyOrigin,
    pub text: String,
    /// Ranked documents when the answer was computed; `None` on a cache hit.
    pub top_docs: Option<Vec<ScoredDoc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry {
    pub query: String,
    pub result: String,
}

/// Cache contents in recency order plus the counters, for persistence.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    pub capacity: usize,
    pub entries: Vec<CacheEntry>,
    pub stats: CacheStats,
}

/// Query serving: result cache keyed by the raw query text plus its counters.
pub struct SearchSession {
    processor: QueryProcessor,
    cache: LruCache<String, String>,
    stats: CacheStats,
}

impl SearchSession {
    pub fn new(processor: QueryProcessor, capacity: NonZeroUsize) -> Self {
        Self { processor, cache: LruCache::new(capacity), stats: CacheStats::default() }
    }

    pub fn processor(&self) -> &QueryProcessor { &self.processor }

    pub fn search(&mut self, raw_query: &str) -> SearchReply {
        if let Some(text) = self.cache.get(raw_query) {
            let text = text.clone();
            self.stats.record_hit();
            tracing::debug!(query = raw_query, "cache hit");
            return SearchReply { origin: ReplyOrigin::Hit, text, top_docs: None };
        }

        let answer = self.processor.answer(raw_query);
        let origin = if answer.is_cacheable() {
            let evicted = self.cache.put(raw_query.to_string(), answer.text.clone());
            if let Some((key, _)) = &evicted {
                tracing::debug!(evicted = key.as_str(), "cache eviction");
            }
            self.stats.record_insert(evicted.is_some());
            ReplyOrigin::Stored
        } else {
            ReplyOrigin::Uncached
        };
        self.stats.record_miss();
        tracing::debug!(query = raw_query, ?origin, "cache miss");
        SearchReply { origin, text: answer.text, top_docs: Some(answer.top_docs) }
    }

    /// Cached result without promoting it.
    pub fn peek(&self, raw_query: &str) -> Option<&str> {
        self.cache.peek(raw_query).map(String::as_str)
    }

    /// Every cached entry in recency order, read through the promoting `get`,
    /// so the recency order is rewritten by the walk.
    pub fn cache_entries(&mut self) -> Vec<CacheEntry> {
        let keys: Vec<String> = self.cache.keys_by_recency().cloned().collect();
        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(result) = self.cache.get(&key).cloned() {
                entries.push(CacheEntry { query: key, result });
            }
        }
        entries
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            capacity: self.cache.capacity(),
            entries: self.cache.iter().map(|(q, r)| CacheEntry { query: q.clone(), result: r.clone() }).collect(),
            stats: self.stats,
        }
    }

    /// Empty the cache and reset the counters; returns how many entries were dropped.
    pub fn clear_cache(&mut self) -> usize {
        let removed = self.cache.len();
        self.cache.clear();
        self.stats.reset();
        tracing::info!(removed, "cache cleared");
        removed
    }

    pub fn stats(&self) -> CacheStats { self.stats }

    pub fn cache_len(&self) -> usize { self.cache.len() }

    pub fn cache_capacity(&self) -> usize { self.cache.capacity() }

    pub fn cached_queries(&self) -> impl Iterator<Item = &str> + '_ {
        self.cache.keys_by_recency().map(String::as_str)
    }
}
