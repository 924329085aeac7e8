//! Comparator-aware sorted map, as produced by
//! [`to_map_of_item_to_count()`](crate::SortedBag::to_map_of_item_to_count)

use crate::comparator::{self, Comparator};
use std::fmt;

/// A map whose keys are kept sorted by a [`Comparator`] or by the natural
/// ordering of `K`
///
/// Unlike sorted bags, this map is a mutable container that the caller owns.
/// It is backed by a sorted vector, which makes it best suited to the
/// build-once, query-many usage of bag conversions.
#[derive(Clone)]
pub struct SortedMap<K, V> {
    /// Entries sorted by key
    entries: Vec<(K, V)>,

    /// Ordering of keys, `None` means natural ordering
    comparator: Option<Comparator<K>>,
}
//
impl<K, V> SortedMap<K, V> {
    /// Makes a new, empty `SortedMap` with the specified key ordering
    #[must_use = "Only effect is to produce a result"]
    pub fn new(comparator: Option<Comparator<K>>) -> Self {
        Self {
            entries: Vec::new(),
            comparator,
        }
    }

    /// Number of entries in the map
    #[must_use = "Only effect is to produce a result"]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Truth that the map contains no entries
    #[must_use = "Only effect is to produce a result"]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ordering of keys, `None` means natural ordering
    #[must_use = "Only effect is to produce a result"]
    pub fn comparator(&self) -> Option<&Comparator<K>> {
        self.comparator.as_ref()
    }

    /// Iterator over the entries, sorted by key
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> + ExactSizeIterator + Clone {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    /// Iterator over the keys, in sorted order
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator + Clone {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Iterator over the values, in key order
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator + Clone {
        self.entries.iter().map(|(_, value)| value)
    }

    /// Entry with the smallest key, if any
    #[must_use = "Only effect is to produce a result"]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.entries.first().map(|(key, value)| (key, value))
    }

    /// Entry with the largest key, if any
    #[must_use = "Only effect is to produce a result"]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.entries.last().map(|(key, value)| (key, value))
    }
}
//
impl<K: Ord, V> SortedMap<K, V> {
    /// Build a map from entries whose keys are already sorted and distinct
    pub(crate) fn from_sorted(comparator: Option<Comparator<K>>, entries: Vec<(K, V)>) -> Self {
        debug_assert!(entries.windows(2).all(|pair| {
            comparator::compare(comparator.as_ref(), &pair[0].0, &pair[1].0).is_lt()
        }));
        Self {
            entries,
            comparator,
        }
    }

    fn position(&self, key: &K) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|(probe, _)| comparator::compare(self.comparator.as_ref(), probe, key))
    }

    /// Value associated with `key`, if any
    #[must_use = "Only effect is to produce a result"]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.position(key).ok().map(|idx| &self.entries[idx].1)
    }

    /// Truth that the map has an entry for `key`
    #[must_use = "Only effect is to produce a result"]
    pub fn contains_key(&self, key: &K) -> bool {
        self.position(key).is_ok()
    }

    /// Associate `value` with `key`, returning the value that was previously
    /// associated with `key`, if any
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.position(&key) {
            Ok(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            Err(idx) => {
                self.entries.insert(idx, (key, value));
                None
            }
        }
    }

    /// Remove the entry for `key`, returning its value if there was one
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.position(key)
            .ok()
            .map(|idx| self.entries.remove(idx).1)
    }
}

/// References to `entries`, sorted by the natural ordering of keys
fn naturally_sorted<K: Ord, V>(entries: &[(K, V)]) -> Vec<&(K, V)> {
    let mut sorted = entries.iter().collect::<Vec<_>>();
    sorted.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
    sorted
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for SortedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V: PartialEq> PartialEq for SortedMap<K, V> {
    /// Map equality, which does not depend on the key ordering of either map
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        if comparator::same_ordering(self.comparator(), other.comparator()) {
            return self.iter().eq(other.iter());
        }
        // Comparators may merge keys that `K` considers distinct, so entries
        // are matched under the natural ordering of `K` instead
        naturally_sorted(&self.entries) == naturally_sorted(&other.entries)
    }
}
//
impl<K: Ord, V: Eq> Eq for SortedMap<K, V> {}
