//! Fixed-capacity least-recently-used cache.
//!
//! Entries live in a slot arena threaded into a doubly-linked recency list
//! (head = most recent, tail = least recent). A hash map from key to slot makes
//! lookup, promotion and eviction O(1). Slots are never freed individually:
//! once the cache is full, the evicted tail slot is reused for the new entry.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;

#[derive(Debug)]
struct Slot<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: NonZeroUsize,
    map: HashMap<K, usize>,
    slots: Vec<Slot<K, V>>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            map: HashMap::with_capacity(capacity.get()),
            slots: Vec::with_capacity(capacity.get()),
            head: None,
            tail: None,
        }
    }

    pub fn capacity(&self) -> usize { self.capacity.get() }

    pub fn len(&self) -> usize { self.map.len() }

    pub fn is_empty(&self) -> bool { self.map.is_empty() }

    /// Look up `key` and promote it to most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        self.promote(idx);
        Some(&self.slots[idx].value)
    }

    /// Look up `key` without touching the recency order.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).map(|&idx| &self.slots[idx].value)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Insert or replace `key`, leaving it most recently used.
    ///
    /// Returns the entry evicted to make room, if any. Replacing an existing
    /// key never evicts.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.map.get(&key) {
            self.slots[idx].value = value;
            self.promote(idx);
            return None;
        }

        if self.map.len() < self.capacity.get() {
            let idx = self.slots.len();
            self.slots.push(Slot { key: key.clone(), value, prev: None, next: None });
            self.push_front(idx);
            self.map.insert(key, idx);
            return None;
        }

        // Full: recycle the tail slot.
        let idx = self.tail?;
        self.unlink(idx);
        let old = std::mem::replace(&mut self.slots[idx], Slot { key: key.clone(), value, prev: None, next: None });
        self.map.remove(&old.key);
        self.push_front(idx);
        self.map.insert(key, idx);
        Some((old.key, old.value))
    }

    /// Keys from most to least recently used.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// Entries from most to least recently used. Does not promote.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { slots: &self.slots, cursor: self.head }
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.slots.clear();
        self.head = None;
        self.tail = None;
    }

    fn promote(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
        self.slots[idx].prev = None;
        self.slots[idx].next = None;
    }

    fn push_front(&mut self, idx: usize) {
        self.slots[idx].prev = None;
        self.slots[idx].next = self.head;
        if let Some(h) = self.head {
            self.slots[h].prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }
}

pub struct Iter<'a, K, V> {
    slots: &'a [Slot<K, V>],
    cursor: Option<usize>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = &self.slots[self.cursor?];
        self.cursor = slot.next;
        Some((&slot.key, &slot.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(cap: usize) -> LruCache<String, u32> {
        LruCache::new(NonZeroUsize::new(cap).unwrap())
    }

    fn keys(c: &LruCache<String, u32>) -> Vec<&str> {
        c.keys_by_recency().map(String::as_str).collect()
    }

    #[test]
    fn evicts_least_recent() {
        let mut c = cache(2);
        c.put("a".into(), 1);
        c.put("b".into(), 2);
        let evicted = c.put("c".into(), 3);
        assert_eq!(evicted, Some(("a".to_string(), 1)));
        assert!(!c.contains("a"));
        assert!(c.contains("b"));
        assert!(c.contains("c"));
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn get_promotes_and_changes_victim() {
        let mut c = cache(2);
        c.put("a".into(), 1);
        c.put("b".into(), 2);
        assert_eq!(c.get("a"), Some(&1));
        assert_eq!(keys(&c), vec!["a", "b"]);
        c.put("c".into(), 3);
        assert!(c.contains("a"));
        assert!(!c.contains("b"));
    }

    #[test]
    fn peek_and_contains_do_not_promote() {
        let mut c = cache(3);
        c.put("a".into(), 1);
        c.put("b".into(), 2);
        assert_eq!(c.peek("a"), Some(&1));
        assert!(c.contains("a"));
        assert_eq!(keys(&c), vec!["b", "a"]);
    }

    #[test]
    fn miss_leaves_order_untouched() {
        let mut c = cache(2);
        c.put("a".into(), 1);
        c.put("b".into(), 2);
        assert_eq!(c.get("zzz"), None);
        assert_eq!(keys(&c), vec!["b", "a"]);
    }

    #[test]
    fn put_existing_replaces_and_promotes_without_eviction() {
        let mut c = cache(2);
        c.put("a".into(), 1);
        c.put("b".into(), 2);
        assert_eq!(c.put("a".into(), 10), None);
        assert_eq!(keys(&c), vec!["a", "b"]);
        assert_eq!(c.peek("a"), Some(&10));
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn capacity_one_keeps_only_latest() {
        let mut c = cache(1);
        c.put("a".into(), 1);
        c.put("b".into(), 2);
        assert_eq!(keys(&c), vec!["b"]);
        assert_eq!(c.get("b"), Some(&2));
    }

    #[test]
    fn clear_resets_to_fresh_state() {
        let mut c = cache(2);
        c.put("a".into(), 1);
        c.put("b".into(), 2);
        c.clear();
        assert_eq!(c.len(), 0);
        assert!(c.is_empty());
        assert_eq!(c.keys_by_recency().count(), 0);
        assert_eq!(c.capacity(), 2);
        c.put("x".into(), 9);
        c.put("y".into(), 8);
        c.put("z".into(), 7);
        assert_eq!(keys(&c), vec!["z", "y"]);
    }
}
