use serde::Serialize;

/// Query-cache bookkeeping kept by the serving layer, outside the cache itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_queries: u64,
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn record_hit(&mut self) {
        self.total_queries += 1;
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.total_queries += 1;
        self.misses += 1;
    }

    pub fn record_insert(&mut self, evicted: bool) {
        self.insertions += 1;
        if evicted {
            self.evictions += 1;
        }
    }

    /// Hit percentage in `[0, 100]`; zero before any query.
    pub fn hit_rate(&self) -> f64 { percent(self.hits, self.total_queries) }

    pub fn miss_rate(&self) -> f64 { percent(self.misses, self.total_queries) }

    pub fn reset(&mut self) { *self = Self::default(); }
}

fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}
