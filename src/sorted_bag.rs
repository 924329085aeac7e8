//! The observable behavior shared by all sorted bag representations

use crate::{
    array::{self, ONE},
    bag::ImmutableSortedBag,
    comparator::{self, Comparator},
    error::{self, Error, Result},
    iter::{Entries, Iter},
    multimap::{MultimapBuilder, SortedBagMultimap},
    partition::PartitionSortedBag,
    sorted_map::SortedMap,
    sorted_set::ImmutableSortedSet,
};
use itertools::{EitherOrBoth, Itertools};
use std::{
    any::Any,
    cmp::Ordering,
    collections::{BTreeMap, btree_map::Entry},
    hash::{DefaultHasher, Hash, Hasher},
    iter::FusedIterator,
    num::NonZeroUsize,
    ops::Range,
};

/// An immutable multiset whose elements are always iterated in the order
/// defined by a [`Comparator`], or by the natural ordering of `T` when the bag
/// has no comparator
///
/// In all the following documentation, we will use the following terminology:
///
/// - "values" refers to a unique value as defined by the bag's ordering
/// - "elements" refers to possibly duplicate occurences of a value within the
///   bag, so that a value with multiplicity 3 is 3 elements
/// - "multiplicity" refers to the number of occurences of a value within the
///   bag
///
/// Indices always count elements, not values.
///
/// Operations that would modify a mutable collection instead return a new
/// [`ImmutableSortedBag`], which uses the same comparator as the original bag
/// and may share storage with it. When the result has no elements, it is an
/// [`EmptySortedBag`](crate::EmptySortedBag).
///
/// Implementors only need to provide the four required methods. All other
/// methods are defined in terms of [`as_entries()`](Self::as_entries), and
/// may be overriden by representations that can answer them more cheaply.
pub trait SortedBag<T: Clone + Ord> {
    /// Ordering of this bag, `None` means natural ordering
    #[must_use = "Only effect is to produce a result"]
    fn comparator(&self) -> Option<&Comparator<T>>;

    /// Distinct values along with their multiplicities, in comparator order
    #[must_use = "Only effect is to produce a result"]
    fn as_entries(&self) -> &[(T, NonZeroUsize)];

    /// Number of elements in the bag, including duplicate occurences of a
    /// value
    #[must_use = "Only effect is to produce a result"]
    fn size(&self) -> usize;

    /// This bag as an [`ImmutableSortedBag`] value
    #[must_use = "Only effect is to produce a result"]
    fn to_immutable(&self) -> ImmutableSortedBag<T>;

    /// Number of distinct values in the bag
    #[must_use = "Only effect is to produce a result"]
    fn size_distinct(&self) -> usize {
        self.as_entries().len()
    }

    /// Truth that the bag contains no elements
    #[must_use = "Only effect is to produce a result"]
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Number of occurences of `value` in the bag, or `None` if it is absent
    #[must_use = "Only effect is to produce a result"]
    fn multiplicity(&self, value: &T) -> Option<NonZeroUsize> {
        let entries = self.as_entries();
        array::find(self.comparator(), entries, value)
            .ok()
            .map(|idx| entries[idx].1)
    }

    /// Number of occurences of `value` in the bag, 0 if it is absent
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::{ImmutableSortedBag, SortedBag};
    ///
    /// let bag = ImmutableSortedBag::from_iter([1, 2, 2]);
    /// assert_eq!(bag.occurrences_of(&2), 2);
    /// assert_eq!(bag.occurrences_of(&3), 0);
    /// ```
    #[must_use = "Only effect is to produce a result"]
    fn occurrences_of(&self, value: &T) -> usize {
        self.multiplicity(value).map_or(0, NonZeroUsize::get)
    }

    /// Truth that the bag contains at least one occurence of `value`
    #[must_use = "Only effect is to produce a result"]
    fn contains(&self, value: &T) -> bool {
        self.multiplicity(value).is_some()
    }

    /// Variant of [`contains()`](Self::contains) for callers that may not
    /// have a value to look up
    ///
    /// # Errors
    ///
    /// [`Error::NullValue`] if `value` is `None`.
    fn checked_contains(&self, value: Option<&T>) -> Result<bool> {
        value.map(|value| self.contains(value)).ok_or(Error::NullValue)
    }

    /// First element in iteration order
    ///
    /// # Errors
    ///
    /// [`Error::EmptyCollection`] if the bag is empty. See
    /// [`get_first()`](Self::get_first) for a non-failing alternative.
    fn min(&self) -> Result<&T> {
        self.get_first().ok_or(Error::EmptyCollection)
    }

    /// Last element in iteration order
    ///
    /// # Errors
    ///
    /// [`Error::EmptyCollection`] if the bag is empty. See
    /// [`get_last()`](Self::get_last) for a non-failing alternative.
    fn max(&self) -> Result<&T> {
        self.get_last().ok_or(Error::EmptyCollection)
    }

    /// Smallest element according to `compare` rather than to the bag's
    /// own ordering
    ///
    /// # Errors
    ///
    /// [`Error::EmptyCollection`] if the bag is empty.
    fn min_by(&self, mut compare: impl FnMut(&T, &T) -> Ordering) -> Result<&T> {
        self.values()
            .min_by(|a, b| compare(*a, *b))
            .ok_or(Error::EmptyCollection)
    }

    /// Largest element according to `compare` rather than to the bag's
    /// own ordering
    ///
    /// # Errors
    ///
    /// [`Error::EmptyCollection`] if the bag is empty.
    fn max_by(&self, mut compare: impl FnMut(&T, &T) -> Ordering) -> Result<&T> {
        self.values()
            .max_by(|a, b| compare(*a, *b))
            .ok_or(Error::EmptyCollection)
    }

    /// Element for which `key` returns the smallest key
    ///
    /// # Errors
    ///
    /// [`Error::EmptyCollection`] if the bag is empty.
    fn min_by_key<K: Ord>(&self, mut key: impl FnMut(&T) -> K) -> Result<&T> {
        self.values()
            .min_by_key(|value| key(*value))
            .ok_or(Error::EmptyCollection)
    }

    /// Element for which `key` returns the largest key
    ///
    /// # Errors
    ///
    /// [`Error::EmptyCollection`] if the bag is empty.
    fn max_by_key<K: Ord>(&self, mut key: impl FnMut(&T) -> K) -> Result<&T> {
        self.values()
            .max_by_key(|value| key(*value))
            .ok_or(Error::EmptyCollection)
    }

    /// First element in iteration order, if any
    #[must_use = "Only effect is to produce a result"]
    fn get_first(&self) -> Option<&T> {
        self.as_entries().first().map(|(value, _)| value)
    }

    /// Last element in iteration order, if any
    #[must_use = "Only effect is to produce a result"]
    fn get_last(&self) -> Option<&T> {
        self.as_entries().last().map(|(value, _)| value)
    }

    /// First value in iteration order along with its multiplicity, if any
    #[must_use = "Only effect is to produce a result"]
    fn first_entry(&self) -> Option<(&T, NonZeroUsize)> {
        self.entries().next()
    }

    /// Last value in iteration order along with its multiplicity, if any
    #[must_use = "Only effect is to produce a result"]
    fn last_entry(&self) -> Option<(&T, NonZeroUsize)> {
        self.entries().next_back()
    }

    /// Iterator over all elements, in comparator order, where a value of
    /// multiplicity N is yielded N times
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::{ImmutableSortedBag, SortedBag};
    ///
    /// let bag = ImmutableSortedBag::from_iter([3, 1, 2, 2]);
    /// assert!(bag.iter().eq(&[1, 2, 2, 3]));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.as_entries(), self.size())
    }

    /// Iterator over all distinct values along with their multiplicities, in
    /// comparator order
    #[must_use = "Only effect is to produce a result"]
    fn entries(&self) -> Entries<'_, T> {
        Entries::new(self.as_entries())
    }

    /// Iterator over all distinct values, in comparator order
    #[must_use = "Only effect is to produce a result"]
    fn values<'a>(
        &'a self,
    ) -> impl DoubleEndedIterator<Item = &'a T> + ExactSizeIterator + FusedIterator + Clone
    where
        T: 'a,
    {
        self.as_entries().iter().map(|(value, _)| value)
    }

    /// Call `f` on every element, in comparator order
    fn for_each(&self, f: impl FnMut(&T)) {
        self.iter().for_each(f)
    }

    /// Call `f` on every element along with an extra parameter
    fn for_each_with<P>(&self, mut f: impl FnMut(&T, &P), parameter: &P) {
        self.iter().for_each(|value| f(value, parameter))
    }

    /// Call `f` once per distinct value, along with its multiplicity
    fn for_each_with_occurrences(&self, mut f: impl FnMut(&T, NonZeroUsize)) {
        self.entries().for_each(|(value, count)| f(value, count))
    }

    /// Call `f` on every element along with its index
    fn for_each_with_index(&self, mut f: impl FnMut(&T, usize)) {
        self.iter()
            .enumerate()
            .for_each(|(idx, value)| f(value, idx))
    }

    /// Call `f` on the elements whose indices are within `range`
    ///
    /// `range` is half-open, following Rust slicing conventions: the inclusive
    /// window `from..=to` of index-based traversals is written `from..to + 1`
    /// here, and `0..0` visits nothing.
    ///
    /// # Errors
    ///
    /// [`Error::IndexRange`] if `range` is reversed or extends beyond the end
    /// of the bag. The empty range `0..0` is always accepted.
    fn for_each_in_range(&self, range: Range<usize>, f: impl FnMut(&T)) -> Result<()> {
        error::check_range(&range, self.size())?;
        self.iter().skip(range.start).take(range.len()).for_each(f);
        Ok(())
    }

    /// Call `f` on the elements whose indices are within `range`, along with
    /// their index
    ///
    /// As in [`for_each_in_range()`](Self::for_each_in_range), `range` is
    /// half-open: the last visited index is `range.end - 1`, unlike inclusive
    /// `(from, to)` windows.
    ///
    /// # Errors
    ///
    /// [`Error::IndexRange`] if `range` is reversed or extends beyond the end
    /// of the bag. The empty range `0..0` is always accepted.
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::{ImmutableSortedBag, SortedBag};
    ///
    /// let bag = ImmutableSortedBag::from_iter([1, 1, 2, 3]);
    /// let mut visited = Vec::new();
    /// bag.for_each_with_index_in_range(1..3, |value, idx| visited.push((*value, idx)))
    ///     .unwrap();
    /// assert_eq!(visited, [(1, 1), (2, 2)]);
    /// assert!(bag.for_each_with_index_in_range(2..5, |_, _| {}).is_err());
    /// ```
    fn for_each_with_index_in_range(
        &self,
        range: Range<usize>,
        mut f: impl FnMut(&T, usize),
    ) -> Result<()> {
        error::check_range(&range, self.size())?;
        self.iter()
            .enumerate()
            .skip(range.start)
            .take(range.len())
            .for_each(|(idx, value)| f(value, idx));
        Ok(())
    }

    /// Number of elements that match `predicate`
    #[must_use = "Only effect is to produce a result"]
    fn count(&self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        self.entries()
            .filter(|(value, _)| predicate(*value))
            .map(|(_, count)| count.get())
            .sum()
    }

    /// Index of the first element that matches `predicate`, if any
    #[must_use = "Only effect is to produce a result"]
    fn detect_index(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<usize> {
        let mut idx = 0;
        for (value, count) in self.entries() {
            if predicate(value) {
                return Some(idx);
            }
            idx += count.get();
        }
        None
    }

    /// Index of the first occurence of `value`, if any
    #[must_use = "Only effect is to produce a result"]
    fn index_of(&self, value: &T) -> Option<usize> {
        let entries = self.as_entries();
        let position = array::find(self.comparator(), entries, value).ok()?;
        Some(entries[..position].iter().map(|(_, count)| count.get()).sum())
    }

    /// Apply `f` to every element, collecting the results in iteration order
    #[must_use = "Only effect is to produce a result"]
    fn collect<V>(&self, f: impl FnMut(&T) -> V) -> Vec<V> {
        self.iter().map(f).collect()
    }

    /// Truth that `other` has as many elements as this bag, and that
    /// `predicate` holds for every pair of elements at the same index
    #[must_use = "Only effect is to produce a result"]
    fn corresponds<S>(
        &self,
        other: impl IntoIterator<Item = S>,
        mut predicate: impl FnMut(&T, S) -> bool,
    ) -> bool {
        self.iter().zip_longest(other).all(|pair| match pair {
            EitherOrBoth::Both(value, other) => predicate(value, other),
            EitherOrBoth::Left(_) | EitherOrBoth::Right(_) => false,
        })
    }

    /// Mapping from distinct values to their multiplicities, using the same
    /// ordering as this bag
    #[must_use = "Only effect is to produce a result"]
    fn to_map_of_item_to_count(&self) -> SortedMap<T, usize> {
        SortedMap::from_sorted(
            self.comparator().cloned(),
            self.entries()
                .map(|(value, count)| (value.clone(), count.get()))
                .collect(),
        )
    }

    /// Elements pushed onto a stack in iteration order, so that popping from
    /// the stack yields them in reverse iteration order
    #[must_use = "Only effect is to produce a result"]
    fn to_stack(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// Compare this bag with another, for use when bags are themselves sorted
    ///
    /// Elements are compared pairwise in iteration order, using this bag's
    /// ordering. The first difference decides the result (-1 or 1). If one
    /// bag is a prefix of the other, the result is `self.size() -
    /// other.size()`, so that an empty bag compares as `-other.size()`.
    #[must_use = "Only effect is to produce a result"]
    fn compare_to(&self, other: &(impl SortedBag<T> + ?Sized)) -> isize {
        let comparator = self.comparator();
        for (mine, theirs) in self.iter().zip(other.iter()) {
            match comparator::compare(comparator, mine, theirs) {
                Ordering::Less => return -1,
                Ordering::Greater => return 1,
                Ordering::Equal => {}
            }
        }
        self.size() as isize - other.size() as isize
    }

    /// Multiset equality: truth that both bags contain the same values with
    /// the same multiplicities, regardless of their comparators
    #[must_use = "Only effect is to produce a result"]
    fn equals_bag(&self, other: &(impl SortedBag<T> + ?Sized)) -> bool {
        if self.size() != other.size() || self.size_distinct() != other.size_distinct() {
            return false;
        }
        if comparator::same_ordering(self.comparator(), other.comparator()) {
            return self.as_entries() == other.as_entries();
        }
        // Comparators may merge values that `T` considers distinct, so entries
        // are matched under the natural ordering of `T` instead
        naturally_sorted(self.as_entries()) == naturally_sorted(other.as_entries())
    }

    /// Order-independent hash of the bag's contents, 0 for an empty bag
    #[must_use = "Only effect is to produce a result"]
    fn hash_code(&self) -> u64
    where
        T: Hash,
    {
        self.entries()
            .map(|(value, count)| {
                let mut hasher = DefaultHasher::new();
                value.hash(&mut hasher);
                hasher.finish() ^ count.get() as u64
            })
            .fold(0, u64::wrapping_add)
    }

    /// Call `f` on every element, then return this bag
    fn tap(&self, f: impl FnMut(&T)) -> ImmutableSortedBag<T> {
        self.for_each(f);
        self.to_immutable()
    }

    /// Keep the values that match `predicate`, with their full multiplicity
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::{ImmutableSortedBag, SortedBag};
    ///
    /// let bag = ImmutableSortedBag::from_iter([1, 2, 2, 3, 4, 4]);
    /// let even = bag.select(|x| x % 2 == 0);
    /// assert!(even.iter().eq(&[2, 2, 4, 4]));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    fn select(&self, mut predicate: impl FnMut(&T) -> bool) -> ImmutableSortedBag<T> {
        filtered(self, |value, _| predicate(value))
    }

    /// Drop the values that match `predicate`
    #[must_use = "Only effect is to produce a result"]
    fn reject(&self, mut predicate: impl FnMut(&T) -> bool) -> ImmutableSortedBag<T> {
        filtered(self, |value, _| !predicate(value))
    }

    /// Keep the values that match `predicate` given an extra parameter
    #[must_use = "Only effect is to produce a result"]
    fn select_with<P>(
        &self,
        mut predicate: impl FnMut(&T, &P) -> bool,
        parameter: &P,
    ) -> ImmutableSortedBag<T> {
        filtered(self, |value, _| predicate(value, parameter))
    }

    /// Drop the values that match `predicate` given an extra parameter
    #[must_use = "Only effect is to produce a result"]
    fn reject_with<P>(
        &self,
        mut predicate: impl FnMut(&T, &P) -> bool,
        parameter: &P,
    ) -> ImmutableSortedBag<T> {
        filtered(self, |value, _| !predicate(value, parameter))
    }

    /// Keep the values whose multiplicity matches `predicate`
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::{ImmutableSortedBag, SortedBag};
    ///
    /// let bag = ImmutableSortedBag::from_iter([1, 2, 2, 3, 3, 3]);
    /// let repeated = bag.select_by_occurrences(|count| count > 1);
    /// assert!(repeated.iter().eq(&[2, 2, 3, 3, 3]));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    fn select_by_occurrences(
        &self,
        mut predicate: impl FnMut(usize) -> bool,
    ) -> ImmutableSortedBag<T> {
        filtered(self, |_, count| predicate(count.get()))
    }

    /// Split the bag into the values that match `predicate` and the others
    #[must_use = "Only effect is to produce a result"]
    fn partition(&self, mut predicate: impl FnMut(&T) -> bool) -> PartitionSortedBag<T> {
        let comparator = self.comparator();
        let (selected, rejected): (Vec<_>, Vec<_>) = self
            .as_entries()
            .iter()
            .cloned()
            .partition(|(value, _)| predicate(value));
        PartitionSortedBag::new(
            ImmutableSortedBag::from_sorted_entries(comparator.cloned(), selected),
            ImmutableSortedBag::from_sorted_entries(comparator.cloned(), rejected),
        )
    }

    /// Keep the elements of type `S`, as a bag of `S`
    ///
    /// The comparator is carried over when it is a `Comparator<S>`, otherwise
    /// the new bag uses the natural ordering of `S`.
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::{ImmutableSortedBag, SortedBag};
    ///
    /// let bag = ImmutableSortedBag::from_iter([2, 1, 1]);
    /// assert_eq!(bag.select_instances_of::<i32>(), bag);
    /// assert!(bag.select_instances_of::<u8>().is_empty());
    /// ```
    #[must_use = "Only effect is to produce a result"]
    fn select_instances_of<S>(&self) -> ImmutableSortedBag<S>
    where
        T: Any,
        S: Any + Clone + Ord,
    {
        let comparator = downcast_comparator::<T, S>(self.comparator());
        ImmutableSortedBag::from_entries(
            comparator,
            self.entries().filter_map(|(value, count)| {
                (value as &dyn Any)
                    .downcast_ref::<S>()
                    .map(|value| (value.clone(), count))
            }),
        )
    }

    /// Set of distinct values, with the same ordering
    #[must_use = "Only effect is to produce a result"]
    fn distinct(&self) -> ImmutableSortedSet<T> {
        ImmutableSortedSet::from_sorted(self.comparator().cloned(), self.values().cloned().collect())
    }

    /// First `count` elements of the bag
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::{ImmutableSortedBag, SortedBag};
    ///
    /// let bag = ImmutableSortedBag::from_iter([1, 2, 2, 3]);
    /// assert!(bag.take(2).iter().eq(&[1, 2]));
    /// assert_eq!(bag.take(10), bag);
    /// ```
    #[must_use = "Only effect is to produce a result"]
    fn take(&self, count: usize) -> ImmutableSortedBag<T> {
        if count >= self.size() {
            return self.to_immutable();
        }
        let mut remaining = count;
        let mut entries = Vec::new();
        for (value, multiplicity) in self.entries() {
            let Some(taken) = NonZeroUsize::new(multiplicity.get().min(remaining)) else {
                break;
            };
            entries.push((value.clone(), taken));
            remaining -= taken.get();
        }
        ImmutableSortedBag::from_sorted_entries(self.comparator().cloned(), entries)
    }

    /// All elements of the bag except for the first `count` ones
    #[must_use = "Only effect is to produce a result"]
    fn drop(&self, count: usize) -> ImmutableSortedBag<T> {
        if count == 0 {
            return self.to_immutable();
        }
        let mut skipped = count;
        let mut entries = Vec::new();
        for (value, multiplicity) in self.entries() {
            match NonZeroUsize::new(multiplicity.get().saturating_sub(skipped)) {
                Some(kept) => {
                    entries.push((value.clone(), kept));
                    skipped = 0;
                }
                None => skipped -= multiplicity.get(),
            }
        }
        ImmutableSortedBag::from_sorted_entries(self.comparator().cloned(), entries)
    }

    /// Longest prefix of the bag whose elements match `predicate`
    #[must_use = "Only effect is to produce a result"]
    fn take_while(&self, predicate: impl FnMut(&T) -> bool) -> ImmutableSortedBag<T> {
        let split = prefix_len(self, predicate);
        sub_bag(self, 0..split)
    }

    /// Elements of the bag after the longest prefix that matches `predicate`
    #[must_use = "Only effect is to produce a result"]
    fn drop_while(&self, predicate: impl FnMut(&T) -> bool) -> ImmutableSortedBag<T> {
        let split = prefix_len(self, predicate);
        sub_bag(self, split..self.size_distinct())
    }

    /// Split the bag into the longest prefix that matches `predicate`, and the
    /// remaining elements
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::{ImmutableSortedBag, SortedBag};
    ///
    /// let bag = ImmutableSortedBag::from_iter([1, 1, 2, 5, 3]);
    /// let partition = bag.partition_while(|&x| x < 3);
    /// assert!(partition.selected().iter().eq(&[1, 1, 2]));
    /// assert!(partition.rejected().iter().eq(&[3, 5]));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    fn partition_while(&self, predicate: impl FnMut(&T) -> bool) -> PartitionSortedBag<T> {
        let split = prefix_len(self, predicate);
        PartitionSortedBag::new(
            sub_bag(self, 0..split),
            sub_bag(self, split..self.size_distinct()),
        )
    }

    /// Group elements by the key that `function` computes for them
    ///
    /// The bags of the resulting multimap use the same ordering as this bag.
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::{ImmutableSortedBag, SortedBag};
    ///
    /// let bag = ImmutableSortedBag::from_iter([1, 2, 2, 3, 4]);
    /// let by_parity = bag.group_by(|x| x % 2);
    /// assert!(by_parity.get(&0).iter().eq(&[2, 2, 4]));
    /// assert!(by_parity.get(&1).iter().eq(&[1, 3]));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    fn group_by<K: Ord>(&self, mut function: impl FnMut(&T) -> K) -> SortedBagMultimap<K, T> {
        let mut builder = MultimapBuilder::new(self.comparator().cloned());
        for (value, count) in self.entries() {
            builder.put(function(value), value, count);
        }
        builder.build()
    }

    /// Group elements under every key that `function` computes for them
    #[must_use = "Only effect is to produce a result"]
    fn group_by_each<K: Ord, I: IntoIterator<Item = K>>(
        &self,
        mut function: impl FnMut(&T) -> I,
    ) -> SortedBagMultimap<K, T> {
        let mut builder = MultimapBuilder::new(self.comparator().cloned());
        for (value, count) in self.entries() {
            for key in function(value) {
                builder.put(key, value, count);
            }
        }
        builder.build()
    }

    /// Map every distinct value to the key that `function` computes for it
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateKey`] if two distinct values are mapped to the same
    /// key.
    fn group_by_unique_key<K: Ord>(
        &self,
        mut function: impl FnMut(&T) -> K,
    ) -> Result<BTreeMap<K, T>> {
        let mut map = BTreeMap::new();
        for value in self.values() {
            match map.entry(function(value)) {
                Entry::Vacant(vacant) => {
                    vacant.insert(value.clone());
                }
                Entry::Occupied(_) => return Err(Error::DuplicateKey),
            }
        }
        Ok(map)
    }

    /// Set of `(element, index)` pairs, sorted like the elements of this bag
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::{ImmutableSortedBag, SortedBag};
    ///
    /// let bag = ImmutableSortedBag::from_iter(['b', 'a', 'b']);
    /// assert!(bag.zip_with_index().iter().eq(&[('a', 0), ('b', 1), ('b', 2)]));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    fn zip_with_index(&self) -> ImmutableSortedSet<(T, usize)>
    where
        T: 'static,
    {
        ImmutableSortedSet::from_sorted(
            comparator::indexed(self.comparator()),
            self.iter()
                .cloned()
                .enumerate()
                .map(|(idx, value)| (value, idx))
                .collect(),
        )
    }

    /// Split the elements into consecutive bags of `size` elements, except
    /// for the last bag which may be smaller
    ///
    /// # Errors
    ///
    /// [`Error::ChunkSize`] if `size` is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::{ImmutableSortedBag, SortedBag};
    ///
    /// let bag = ImmutableSortedBag::from_iter([1, 1, 1, 2, 3]);
    /// let chunks = bag.chunk(2).unwrap();
    /// assert_eq!(chunks.len(), 3);
    /// assert!(chunks[0].iter().eq(&[1, 1]));
    /// assert!(chunks[1].iter().eq(&[1, 2]));
    /// assert!(chunks[2].iter().eq(&[3]));
    /// ```
    fn chunk(&self, size: usize) -> Result<Vec<ImmutableSortedBag<T>>> {
        if size == 0 {
            return Err(Error::ChunkSize(size));
        }
        let comparator = self.comparator();
        let chunks = self.iter().chunks(size);
        let result = (&chunks)
            .into_iter()
            .map(|chunk| ImmutableSortedBag::from_sorted_values(comparator.cloned(), chunk.cloned()))
            .collect();
        Ok(result)
    }

    /// This bag with one more occurence of `value`
    #[must_use = "Only effect is to produce a result"]
    fn new_with(&self, value: T) -> ImmutableSortedBag<T> {
        let comparator = self.comparator();
        let mut entries = self.as_entries().to_vec();
        match array::find(comparator, &entries, &value) {
            Ok(idx) => {
                let count = &mut entries[idx].1;
                *count = count
                    .checked_add(1)
                    .expect("Multiplicity counter has overflown");
            }
            Err(idx) => entries.insert(idx, (value, ONE)),
        }
        ImmutableSortedBag::from_sorted_entries(comparator.cloned(), entries)
    }

    /// This bag with the additional elements from `elements`
    #[must_use = "Only effect is to produce a result"]
    fn new_with_all(&self, elements: impl IntoIterator<Item = T>) -> ImmutableSortedBag<T> {
        let comparator = self.comparator();
        let added = array::sort_entries(comparator, elements.into_iter().map(|value| (value, ONE)));
        if added.is_empty() {
            return self.to_immutable();
        }
        ImmutableSortedBag::from_sorted_entries(
            comparator.cloned(),
            crate::algebra::sum(comparator, self.as_entries(), &added),
        )
    }

    /// This bag with one less occurence of `value`
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::{ImmutableSortedBag, SortedBag};
    ///
    /// let bag = ImmutableSortedBag::from_iter([1, 2, 2]);
    /// assert!(bag.new_without(&2).iter().eq(&[1, 2]));
    /// assert!(bag.new_without(&1).iter().eq(&[2, 2]));
    /// assert_eq!(bag.new_without(&3), bag);
    /// ```
    #[must_use = "Only effect is to produce a result"]
    fn new_without(&self, value: &T) -> ImmutableSortedBag<T> {
        let comparator = self.comparator();
        let Ok(idx) = array::find(comparator, self.as_entries(), value) else {
            return self.to_immutable();
        };
        let mut entries = self.as_entries().to_vec();
        match NonZeroUsize::new(entries[idx].1.get() - 1) {
            Some(count) => entries[idx].1 = count,
            None => {
                entries.remove(idx);
            }
        }
        ImmutableSortedBag::from_sorted_entries(comparator.cloned(), entries)
    }

    /// This bag without any occurence of the values from `elements`
    #[must_use = "Only effect is to produce a result"]
    fn new_without_all(&self, elements: impl IntoIterator<Item = T>) -> ImmutableSortedBag<T> {
        let comparator = self.comparator();
        let removed = array::sort_entries(comparator, elements.into_iter().map(|value| (value, ONE)));
        self.reject(|value| array::find(comparator, &removed, value).is_ok())
    }
}

/// Bag made of the entries of `bag` for which `keep` returns true
fn filtered<T: Clone + Ord>(
    bag: &(impl SortedBag<T> + ?Sized),
    mut keep: impl FnMut(&T, NonZeroUsize) -> bool,
) -> ImmutableSortedBag<T> {
    let entries = bag
        .as_entries()
        .iter()
        .filter(|(value, count)| keep(value, *count))
        .cloned()
        .collect::<Vec<_>>();
    if entries.len() == bag.size_distinct() {
        return bag.to_immutable();
    }
    ImmutableSortedBag::from_sorted_entries(bag.comparator().cloned(), entries)
}

/// References to `entries`, sorted by the natural ordering of `T`
fn naturally_sorted<T: Ord>(entries: &[(T, NonZeroUsize)]) -> Vec<&(T, NonZeroUsize)> {
    let mut sorted = entries.iter().collect::<Vec<_>>();
    sorted.sort_unstable();
    sorted
}

/// Number of leading entries of `bag` whose value matches `predicate`
fn prefix_len<T: Clone + Ord>(
    bag: &(impl SortedBag<T> + ?Sized),
    mut predicate: impl FnMut(&T) -> bool,
) -> usize {
    bag.as_entries()
        .iter()
        .position(|(value, _)| !predicate(value))
        .unwrap_or(bag.size_distinct())
}

/// Bag made of the entries of `bag` within `range`
fn sub_bag<T: Clone + Ord>(
    bag: &(impl SortedBag<T> + ?Sized),
    range: Range<usize>,
) -> ImmutableSortedBag<T> {
    if range.len() == bag.size_distinct() {
        return bag.to_immutable();
    }
    ImmutableSortedBag::from_sorted_entries(bag.comparator().cloned(), bag.as_entries()[range].to_vec())
}

/// Reinterpret a comparator of `T` as a comparator of `S`, which only
/// succeeds when both are the same type
pub(crate) fn downcast_comparator<T: Any, S: Any>(
    comparator: Option<&Comparator<T>>,
) -> Option<Comparator<S>> {
    comparator
        .and_then(|comparator| (comparator as &dyn Any).downcast_ref::<Comparator<S>>())
        .cloned()
}
