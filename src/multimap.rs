//! Multimaps from keys to sorted bags, as produced by
//! [`group_by()`](crate::SortedBag::group_by)

use crate::{
    array,
    bag::ImmutableSortedBag,
    comparator::Comparator,
    sorted_bag::SortedBag,
};
use std::{
    collections::{BTreeMap, btree_map},
    fmt,
    num::NonZeroUsize,
};

/// An immutable mapping from keys to non-empty sorted bags of values
///
/// Every bag of the multimap uses the same ordering, which is the ordering of
/// the bag that the multimap was built from. Looking up a key that has no
/// associated values yields an empty bag with that ordering.
///
/// # Examples
///
/// ```
/// use immutable_sorted_bag::{Comparator, ImmutableSortedBag, SortedBag};
///
/// let words = ImmutableSortedBag::with_all(
///     Some(Comparator::natural_reversed()),
///     ["apple", "avocado", "banana", "apple"],
/// );
/// let by_initial = words.group_by(|word| word.chars().next());
/// assert_eq!(by_initial.key_count(), 2);
/// assert!(by_initial.get(&Some('a')).iter().eq(&["avocado", "apple", "apple"]));
/// assert!(by_initial.get(&Some('c')).is_empty());
/// ```
pub struct SortedBagMultimap<K, V> {
    /// Non-empty bag of values associated with each key
    groups: BTreeMap<K, ImmutableSortedBag<V>>,

    /// Empty bag that is handed out for keys without values
    empty: ImmutableSortedBag<V>,

    /// Ordering of all bags, `None` means natural ordering
    comparator: Option<Comparator<V>>,

    /// Total number of values, across all keys
    len: usize,
}
//
impl<K, V> SortedBagMultimap<K, V> {
    /// Ordering of the bags of values, `None` means natural ordering
    #[must_use = "Only effect is to produce a result"]
    pub fn comparator(&self) -> Option<&Comparator<V>> {
        self.comparator.as_ref()
    }

    /// Number of values in the multimap, counting every occurence of a value
    /// under every key it is associated with
    #[must_use = "Only effect is to produce a result"]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of distinct keys
    #[must_use = "Only effect is to produce a result"]
    pub fn key_count(&self) -> usize {
        self.groups.len()
    }

    /// Truth that no key has any value associated with it
    #[must_use = "Only effect is to produce a result"]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterator over the keys, in ascending order
    pub fn keys(&self) -> btree_map::Keys<'_, K, ImmutableSortedBag<V>> {
        self.groups.keys()
    }

    /// Iterator over the keys and their bags of values, in ascending key order
    pub fn iter(&self) -> btree_map::Iter<'_, K, ImmutableSortedBag<V>> {
        self.groups.iter()
    }

    /// Split into a map from keys to non-empty bags of values
    #[must_use = "Only effect is to produce a result"]
    pub fn into_map(self) -> BTreeMap<K, ImmutableSortedBag<V>> {
        self.groups
    }
}
//
impl<K: Ord, V> SortedBagMultimap<K, V> {
    /// Values associated with `key`, which form an empty bag if there is none
    #[must_use = "Only effect is to produce a result"]
    pub fn get(&self, key: &K) -> &ImmutableSortedBag<V> {
        self.groups.get(key).unwrap_or(&self.empty)
    }

    /// Truth that at least one value is associated with `key`
    #[must_use = "Only effect is to produce a result"]
    pub fn contains_key(&self, key: &K) -> bool {
        self.groups.contains_key(key)
    }
}
//
impl<K: Clone, V> Clone for SortedBagMultimap<K, V> {
    fn clone(&self) -> Self {
        Self {
            groups: self.groups.clone(),
            empty: self.empty.clone(),
            comparator: self.comparator.clone(),
            len: self.len,
        }
    }
}
//
impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for SortedBagMultimap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.groups.iter()).finish()
    }
}
//
impl<K: Ord, V: Clone + Ord> PartialEq for SortedBagMultimap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.groups == other.groups
    }
}
//
impl<K: Ord, V: Clone + Ord> Eq for SortedBagMultimap<K, V> {}
//
impl<'a, K, V> IntoIterator for &'a SortedBagMultimap<K, V> {
    type Item = (&'a K, &'a ImmutableSortedBag<V>);
    type IntoIter = btree_map::Iter<'a, K, ImmutableSortedBag<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Accumulates the groups of a [`SortedBagMultimap`]
///
/// Values must be put in the ordering of the multimap, so that each group can
/// be built by appending to it.
pub(crate) struct MultimapBuilder<K, V> {
    groups: BTreeMap<K, Vec<(V, NonZeroUsize)>>,
    comparator: Option<Comparator<V>>,
}
//
impl<K: Ord, V: Clone + Ord> MultimapBuilder<K, V> {
    pub(crate) fn new(comparator: Option<Comparator<V>>) -> Self {
        Self {
            groups: BTreeMap::new(),
            comparator,
        }
    }

    /// Associate `count` occurences of `value` with `key`
    pub(crate) fn put(&mut self, key: K, value: &V, count: NonZeroUsize) {
        let group = self.groups.entry(key).or_default();
        array::push_sorted(self.comparator.as_ref(), group, value.clone(), count);
    }

    pub(crate) fn build(self) -> SortedBagMultimap<K, V> {
        let comparator = self.comparator;
        let mut len = 0;
        let groups = self
            .groups
            .into_iter()
            .map(|(key, entries)| {
                let bag = ImmutableSortedBag::from_sorted_entries(comparator.clone(), entries);
                len = bag
                    .size()
                    .checked_add(len)
                    .expect("Multiplicity counter has overflown");
                (key, bag)
            })
            .collect();
        SortedBagMultimap {
            groups,
            empty: ImmutableSortedBag::empty_with(comparator.clone()),
            comparator,
            len,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn every_occurence_is_grouped() {
        let bag = ImmutableSortedBag::from_iter([1, 2, 2, 3, 4]);
        let by_parity = bag.group_by(|x| x % 2);
        assert_eq!(by_parity.len(), bag.size());
        assert_eq!(by_parity.key_count(), 2);
        assert!(by_parity.keys().eq(&[0, 1]));
        assert!(by_parity.get(&0).iter().eq(&[2, 2, 4]));
        assert!(by_parity.get(&1).iter().eq(&[1, 3]));
        assert!(!by_parity.contains_key(&2));
        assert!(by_parity.get(&2).is_empty());
        assert!(by_parity.comparator().is_none());
    }

    #[test]
    fn values_under_many_keys() {
        let reverse = Comparator::natural_reversed();
        let bag = ImmutableSortedBag::with_all(Some(reverse.clone()), [1, 2, 2, 3]);
        let divisors = bag.group_by_each(|&x| (1..=x).filter(move |d| x % d == 0));
        assert_eq!(divisors.len(), 4 + 2 + 1);
        assert!(divisors.get(&1).iter().eq(&[3, 2, 2, 1]));
        assert!(divisors.get(&2).iter().eq(&[2, 2]));
        assert!(divisors.get(&3).iter().eq(&[3]));
        assert!(divisors.comparator().is_some_and(|c| c.ptr_eq(&reverse)));
        for (_, group) in &divisors {
            assert!(group.comparator().is_some_and(|c| c.ptr_eq(&reverse)));
        }
        assert!(divisors.get(&4).comparator().is_some_and(|c| c.ptr_eq(&reverse)));

        // A key produced twice for one value counts it twice
        let doubled = bag.group_by_each(|_| [0, 0]);
        assert_eq!(doubled.get(&0).size(), 2 * bag.size());
    }
}
