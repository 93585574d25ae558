//! Insertion-ordered map and counter.
//!
//! Iteration follows first insertion, which is what makes "most common"
//! tie-breaks (first seen wins) deterministic.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct OrderedMap<K, V> {
    index: HashMap<K, usize>,
    entries: Vec<(K, V)>,
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Mutable access to `key`, inserting `default()` at the end on first sight.
    pub fn get_or_insert_with<Q, F>(&mut self, key: &Q, default: F) -> &mut V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce() -> V,
    {
        let i = match self.index.get(key) {
            Some(&i) => i,
            None => {
                let owned = key.to_owned();
                self.entries.push((owned.clone(), default()));
                let i = self.entries.len() - 1;
                self.index.insert(owned, i);
                i
            }
        };
        &mut self.entries[i].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }
}

/// Occurrence counter keyed in first-seen order.
pub type Tally<K> = OrderedMap<K, u64>;

impl<K: Eq + Hash + Clone> OrderedMap<K, u64> {
    pub fn increment<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        *self.get_or_insert_with(key, || 0) += 1;
    }

    pub fn count<Q>(&self, key: &Q) -> u64
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).copied().unwrap_or(0)
    }

    /// Highest count; on ties the earliest-inserted key wins.
    pub fn most_common(&self) -> Option<(&K, u64)> {
        let mut best: Option<(&K, u64)> = None;
        for (k, &n) in self.iter() {
            match best {
                Some((_, top)) if n <= top => {}
                _ => best = Some((k, n)),
            }
        }
        best
    }

    /// Up to `n` entries by descending count, ties kept in insertion order.
    pub fn most_common_n(&self, n: usize) -> Vec<(&K, u64)> {
        let mut ranked: Vec<(&K, u64)> = self.iter().map(|(k, &c)| (k, c)).collect();
        // sort_by is stable, so equal counts keep first-seen order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}
