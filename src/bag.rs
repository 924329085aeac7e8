//! The sorted bag value type that all operations produce

use crate::{
    array::{self, ONE, SortedArrayBag},
    comparator::{self, Comparator},
    empty::EmptySortedBag,
    error::Result,
    iter::Iter,
    multimap::SortedBagMultimap,
    partition::PartitionSortedBag,
    sorted_bag::SortedBag,
    sorted_map::SortedMap,
    sorted_set::ImmutableSortedSet,
};
use log::trace;
use std::{
    any::Any,
    cmp::Ordering,
    collections::BTreeMap,
    hash::{Hash, Hasher},
    num::NonZeroUsize,
};

/// Forward a [`SortedBag`] method call to the representation held by an
/// [`ImmutableSortedBag`]
macro_rules! dispatch {
    ($bag:expr, $method:ident $(::<$($generic:ty),+>)? ($($arg:expr),*)) => {
        match $bag {
            ImmutableSortedBag::Empty(bag) => bag.$method $(::<$($generic),+>)? ($($arg),*),
            ImmutableSortedBag::Populated(bag) => bag.$method $(::<$($generic),+>)? ($($arg),*),
        }
    };
}

/// An immutable sorted multiset
///
/// This is the value type that all sorted bag operations return. It is either
/// an [`EmptySortedBag`] or a non-empty [`SortedArrayBag`], and factories
/// always pick the empty representation when there is no element to store.
/// Both representations implement [`SortedBag`], which is where all the bag
/// operations are documented.
///
/// Cloning a bag is cheap, as clones share their storage.
///
/// # Examples
///
/// ```
/// use immutable_sorted_bag::{Comparator, ImmutableSortedBag, SortedBag};
///
/// let natural = ImmutableSortedBag::from_iter([3, 1, 2, 1]);
/// assert!(natural.iter().eq(&[1, 1, 2, 3]));
/// assert_eq!(natural.occurrences_of(&1), 2);
///
/// let reverse = ImmutableSortedBag::with_all(Some(Comparator::natural_reversed()), [3, 1, 2, 1]);
/// assert!(reverse.iter().eq(&[3, 2, 1, 1]));
///
/// // Equality does not depend on ordering
/// assert_eq!(natural, reverse);
/// ```
#[derive(Debug)]
pub enum ImmutableSortedBag<T> {
    /// Bag without any element
    Empty(EmptySortedBag<T>),

    /// Bag with at least one element
    Populated(SortedArrayBag<T>),
}
//
impl<T> ImmutableSortedBag<T> {
    /// Empty bag using the natural ordering of `T`
    #[must_use = "Only effect is to produce a result"]
    pub fn empty() -> Self {
        Self::Empty(EmptySortedBag::NATURAL)
    }

    /// Empty bag that will sort elements with `comparator`
    #[must_use = "Only effect is to produce a result"]
    pub fn empty_with_comparator(comparator: Comparator<T>) -> Self {
        Self::Empty(EmptySortedBag::with_comparator(comparator))
    }

    /// Empty bag with an optional comparator
    pub(crate) fn empty_with(comparator: Option<Comparator<T>>) -> Self {
        Self::Empty(EmptySortedBag::new(comparator))
    }
}
//
impl<T: Clone + Ord> ImmutableSortedBag<T> {
    /// Bag of `elements`, sorted by `comparator` or by natural ordering
    ///
    /// # Panics
    ///
    /// If a value occurs more than `usize::MAX` times, or if the bag would
    /// hold more than `usize::MAX` elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::{Comparator, ImmutableSortedBag, SortedBag};
    ///
    /// let by_len = Comparator::by_key(|s: &&str| s.len());
    /// let bag = ImmutableSortedBag::with_all(Some(by_len), ["ccc", "a", "bb", "d"]);
    /// assert_eq!(bag.size(), 4);
    /// assert_eq!(bag.size_distinct(), 3);
    /// assert_eq!(bag.get_first(), Some(&"a"));
    /// assert_eq!(bag.occurrences_of(&"z"), 2);
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn with_all(
        comparator: Option<Comparator<T>>,
        elements: impl IntoIterator<Item = T>,
    ) -> Self {
        Self::from_entries(comparator, elements.into_iter().map(|value| (value, ONE)))
    }

    /// Bag made of `(value, multiplicity)` pairs, sorted by `comparator` or by
    /// natural ordering
    ///
    /// Pairs may come in any order, and the multiplicities of pairs holding
    /// the same value are added up.
    ///
    /// # Panics
    ///
    /// If a value occurs more than `usize::MAX` times, or if the bag would
    /// hold more than `usize::MAX` elements.
    #[must_use = "Only effect is to produce a result"]
    pub fn from_entries(
        comparator: Option<Comparator<T>>,
        entries: impl IntoIterator<Item = (T, NonZeroUsize)>,
    ) -> Self {
        let entries = array::sort_entries(comparator.as_ref(), entries);
        Self::from_sorted_entries(comparator, entries)
    }

    /// Bag made of entries that are already sorted and deduplicated
    pub(crate) fn from_sorted_entries(
        comparator: Option<Comparator<T>>,
        entries: Vec<(T, NonZeroUsize)>,
    ) -> Self {
        if entries.is_empty() {
            trace!("No element to store, using an empty sorted bag");
            return Self::empty_with(comparator);
        }
        trace!(
            "Building a sorted bag with {} distinct values",
            entries.len()
        );
        Self::Populated(SortedArrayBag::from_sorted_entries(comparator, entries))
    }

    /// Bag made of elements that are already sorted, but may repeat
    pub(crate) fn from_sorted_values(
        comparator: Option<Comparator<T>>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        let mut entries = Vec::new();
        for value in values {
            array::push_sorted(comparator.as_ref(), &mut entries, value, ONE);
        }
        Self::from_sorted_entries(comparator, entries)
    }
}

impl<T: Clone + Ord> SortedBag<T> for ImmutableSortedBag<T> {
    fn comparator(&self) -> Option<&Comparator<T>> {
        dispatch!(self, comparator())
    }

    fn as_entries(&self) -> &[(T, NonZeroUsize)] {
        dispatch!(self, as_entries())
    }

    fn size(&self) -> usize {
        dispatch!(self, size())
    }

    fn to_immutable(&self) -> ImmutableSortedBag<T> {
        self.clone()
    }

    fn size_distinct(&self) -> usize {
        dispatch!(self, size_distinct())
    }

    fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }

    fn multiplicity(&self, value: &T) -> Option<NonZeroUsize> {
        dispatch!(self, multiplicity(value))
    }

    fn occurrences_of(&self, value: &T) -> usize {
        dispatch!(self, occurrences_of(value))
    }

    fn contains(&self, value: &T) -> bool {
        dispatch!(self, contains(value))
    }

    fn min(&self) -> Result<&T> {
        dispatch!(self, min())
    }

    fn max(&self) -> Result<&T> {
        dispatch!(self, max())
    }

    fn min_by(&self, compare: impl FnMut(&T, &T) -> Ordering) -> Result<&T> {
        dispatch!(self, min_by(compare))
    }

    fn max_by(&self, compare: impl FnMut(&T, &T) -> Ordering) -> Result<&T> {
        dispatch!(self, max_by(compare))
    }

    fn min_by_key<K: Ord>(&self, key: impl FnMut(&T) -> K) -> Result<&T> {
        dispatch!(self, min_by_key(key))
    }

    fn max_by_key<K: Ord>(&self, key: impl FnMut(&T) -> K) -> Result<&T> {
        dispatch!(self, max_by_key(key))
    }

    fn get_first(&self) -> Option<&T> {
        dispatch!(self, get_first())
    }

    fn get_last(&self) -> Option<&T> {
        dispatch!(self, get_last())
    }

    fn iter(&self) -> Iter<'_, T> {
        dispatch!(self, iter())
    }

    fn count(&self, predicate: impl FnMut(&T) -> bool) -> usize {
        dispatch!(self, count(predicate))
    }

    fn detect_index(&self, predicate: impl FnMut(&T) -> bool) -> Option<usize> {
        dispatch!(self, detect_index(predicate))
    }

    fn index_of(&self, value: &T) -> Option<usize> {
        dispatch!(self, index_of(value))
    }

    fn to_map_of_item_to_count(&self) -> SortedMap<T, usize> {
        dispatch!(self, to_map_of_item_to_count())
    }

    fn to_stack(&self) -> Vec<T> {
        dispatch!(self, to_stack())
    }

    fn compare_to(&self, other: &(impl SortedBag<T> + ?Sized)) -> isize {
        dispatch!(self, compare_to(other))
    }

    fn equals_bag(&self, other: &(impl SortedBag<T> + ?Sized)) -> bool {
        dispatch!(self, equals_bag(other))
    }

    fn hash_code(&self) -> u64
    where
        T: Hash,
    {
        dispatch!(self, hash_code())
    }

    fn tap(&self, f: impl FnMut(&T)) -> ImmutableSortedBag<T> {
        dispatch!(self, tap(f))
    }

    fn select(&self, predicate: impl FnMut(&T) -> bool) -> ImmutableSortedBag<T> {
        dispatch!(self, select(predicate))
    }

    fn reject(&self, predicate: impl FnMut(&T) -> bool) -> ImmutableSortedBag<T> {
        dispatch!(self, reject(predicate))
    }

    fn select_with<P>(
        &self,
        predicate: impl FnMut(&T, &P) -> bool,
        parameter: &P,
    ) -> ImmutableSortedBag<T> {
        dispatch!(self, select_with(predicate, parameter))
    }

    fn reject_with<P>(
        &self,
        predicate: impl FnMut(&T, &P) -> bool,
        parameter: &P,
    ) -> ImmutableSortedBag<T> {
        dispatch!(self, reject_with(predicate, parameter))
    }

    fn select_by_occurrences(&self, predicate: impl FnMut(usize) -> bool) -> ImmutableSortedBag<T> {
        dispatch!(self, select_by_occurrences(predicate))
    }

    fn partition(&self, predicate: impl FnMut(&T) -> bool) -> PartitionSortedBag<T> {
        dispatch!(self, partition(predicate))
    }

    fn select_instances_of<S>(&self) -> ImmutableSortedBag<S>
    where
        T: Any,
        S: Any + Clone + Ord,
    {
        dispatch!(self, select_instances_of::<S>())
    }

    fn distinct(&self) -> ImmutableSortedSet<T> {
        dispatch!(self, distinct())
    }

    fn take(&self, count: usize) -> ImmutableSortedBag<T> {
        dispatch!(self, take(count))
    }

    fn drop(&self, count: usize) -> ImmutableSortedBag<T> {
        dispatch!(self, drop(count))
    }

    fn take_while(&self, predicate: impl FnMut(&T) -> bool) -> ImmutableSortedBag<T> {
        dispatch!(self, take_while(predicate))
    }

    fn drop_while(&self, predicate: impl FnMut(&T) -> bool) -> ImmutableSortedBag<T> {
        dispatch!(self, drop_while(predicate))
    }

    fn partition_while(&self, predicate: impl FnMut(&T) -> bool) -> PartitionSortedBag<T> {
        dispatch!(self, partition_while(predicate))
    }

    fn group_by<K: Ord>(&self, function: impl FnMut(&T) -> K) -> SortedBagMultimap<K, T> {
        dispatch!(self, group_by(function))
    }

    fn group_by_each<K: Ord, I: IntoIterator<Item = K>>(
        &self,
        function: impl FnMut(&T) -> I,
    ) -> SortedBagMultimap<K, T> {
        dispatch!(self, group_by_each(function))
    }

    fn group_by_unique_key<K: Ord>(
        &self,
        function: impl FnMut(&T) -> K,
    ) -> Result<BTreeMap<K, T>> {
        dispatch!(self, group_by_unique_key(function))
    }

    fn zip_with_index(&self) -> ImmutableSortedSet<(T, usize)>
    where
        T: 'static,
    {
        dispatch!(self, zip_with_index())
    }

    fn chunk(&self, size: usize) -> Result<Vec<ImmutableSortedBag<T>>> {
        dispatch!(self, chunk(size))
    }

    fn new_with(&self, value: T) -> ImmutableSortedBag<T> {
        dispatch!(self, new_with(value))
    }

    fn new_with_all(&self, elements: impl IntoIterator<Item = T>) -> ImmutableSortedBag<T> {
        dispatch!(self, new_with_all(elements))
    }

    fn new_without(&self, value: &T) -> ImmutableSortedBag<T> {
        dispatch!(self, new_without(value))
    }

    fn new_without_all(&self, elements: impl IntoIterator<Item = T>) -> ImmutableSortedBag<T> {
        dispatch!(self, new_without_all(elements))
    }
}

impl<T> Clone for ImmutableSortedBag<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty(bag) => Self::Empty(bag.clone()),
            Self::Populated(bag) => Self::Populated(bag.clone()),
        }
    }
}

impl<T> Default for ImmutableSortedBag<T> {
    /// Empty bag using the natural ordering of `T`
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Clone + Ord> Eq for ImmutableSortedBag<T> {}

impl<T: Clone + Ord> FromIterator<T> for ImmutableSortedBag<T> {
    /// Bag of all elements from `iter`, using natural ordering
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::with_all(None, iter)
    }
}

impl<T: Clone + Ord> FromIterator<(T, NonZeroUsize)> for ImmutableSortedBag<T> {
    /// Bag made of `(value, multiplicity)` pairs, using natural ordering
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::{ImmutableSortedBag, SortedBag};
    /// use std::num::NonZeroUsize;
    ///
    /// let nonzero = |x| NonZeroUsize::new(x).unwrap();
    /// let bag =
    ///     ImmutableSortedBag::<i32>::from_iter([(2, nonzero(1)), (1, nonzero(2)), (2, nonzero(1))]);
    /// assert!(bag.iter().eq(&[1, 1, 2, 2]));
    /// ```
    fn from_iter<I: IntoIterator<Item = (T, NonZeroUsize)>>(iter: I) -> Self {
        Self::from_entries(None, iter)
    }
}

impl<T: Clone + Ord + Hash> Hash for ImmutableSortedBag<T> {
    /// Hashes the order-independent [`hash_code()`](SortedBag::hash_code),
    /// so that bags that are equal under different orderings hash the same
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code())
    }
}

impl<'a, T: Clone + Ord> IntoIterator for &'a ImmutableSortedBag<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone + Ord> PartialEq for ImmutableSortedBag<T> {
    /// Multiset equality, which does not depend on the ordering of either bag
    fn eq(&self, other: &Self) -> bool {
        self.equals_bag(other)
    }
}

impl<T: Clone + Ord> PartialOrd for ImmutableSortedBag<T> {
    /// Ordering given by the sign of [`compare_to()`](SortedBag::compare_to)
    ///
    /// Non-empty bags with different orderings are only comparable when they
    /// are equal, because `compare_to()` would not give the same answer
    /// depending on which bag's ordering is used.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        let comparable = self.is_empty()
            || other.is_empty()
            || comparator::same_ordering(self.comparator(), other.comparator());
        comparable.then(|| self.compare_to(other).cmp(&0))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::{Error, ErrorKind};
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use std::{collections::BTreeMap, fmt::Debug};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn check_equal_iterable<V, It1, It2>(it1: It1, it2: It2)
    where
        It1: IntoIterator<Item = V>,
        It2: IntoIterator<Item = V>,
        V: Debug + PartialEq,
    {
        assert_eq!(
            it1.into_iter().collect::<Vec<_>>(),
            it2.into_iter().collect::<Vec<_>>(),
        );
    }

    fn check_empty_iterable<It>(it: It)
    where
        It: IntoIterator,
        It::Item: Debug + PartialEq,
    {
        check_equal_iterable(it, std::iter::empty());
    }

    fn check_any_bag(bag: &ImmutableSortedBag<i32>, contents: &[i32]) {
        let mut contents_histogram = BTreeMap::<i32, usize>::new();
        for &value in contents {
            *contents_histogram.entry(value).or_default() += 1;
        }
        let mut sorted = contents.to_vec();
        sorted.sort_unstable();

        check_equal_iterable(bag.iter().copied(), sorted.iter().copied());
        check_equal_iterable(bag.iter().rev().copied(), sorted.iter().rev().copied());
        check_equal_iterable(bag, bag.iter());
        check_equal_iterable(
            bag.entries().map(|(val, mul)| (*val, mul.get())),
            contents_histogram.iter().map(|(&k, &v)| (k, v)),
        );
        check_equal_iterable(bag.values().copied(), contents_histogram.keys().copied());
        check_equal_iterable(bag.to_stack(), sorted.clone());
        check_equal_iterable(bag.collect(|x| x.wrapping_mul(2)), sorted.iter().map(|x| x.wrapping_mul(2)));

        assert_eq!(bag.size(), contents.len());
        assert_eq!(bag.iter().len(), contents.len());
        assert_eq!(bag.size_distinct(), contents_histogram.len());
        assert_eq!(bag.is_empty(), contents.is_empty());
        assert_eq!(
            bag.size(),
            bag.distinct().iter().map(|val| bag.occurrences_of(val)).sum::<usize>()
        );

        for (&val, &mul) in &contents_histogram {
            assert!(bag.contains(&val));
            assert_eq!(bag.checked_contains(Some(&val)), Ok(true));
            assert_eq!(bag.occurrences_of(&val), mul);
            assert_eq!(bag.multiplicity(&val).map(NonZeroUsize::get), Some(mul));
            let first_index = sorted.iter().position(|&x| x == val);
            assert_eq!(bag.index_of(&val), first_index);
            assert_eq!(bag.detect_index(|&x| x == val), first_index);
            assert_eq!(bag.to_map_of_item_to_count().get(&val), Some(&mul));
        }
        assert_eq!(bag.checked_contains(None), Err(Error::NullValue));
        assert_eq!(bag.count(|x| x % 2 == 0), contents.iter().filter(|x| *x % 2 == 0).count());

        assert_eq!(bag.get_first(), sorted.first());
        assert_eq!(bag.get_last(), sorted.last());
        assert_eq!(bag.min().ok(), sorted.first());
        assert_eq!(bag.max().ok(), sorted.last());
        assert_eq!(bag.min_by(|a, b| b.cmp(a)).ok(), sorted.last());
        assert_eq!(bag.max_by(|a, b| b.cmp(a)).ok(), sorted.first());
        assert_eq!(bag.min_by_key(|x| x.wrapping_neg()).ok(), sorted.iter().min_by_key(|x| x.wrapping_neg()));
        assert_eq!(bag.max_by_key(|x| x.wrapping_neg()).ok(), sorted.iter().max_by_key(|x| x.wrapping_neg()));
        if bag.is_empty() {
            assert_matches!(bag.min(), Err(Error::EmptyCollection));
            assert_matches!(bag.max_by_key(|&x| x), Err(Error::EmptyCollection));
        }

        #[allow(clippy::eq_op)]
        {
            assert_eq!(bag, bag);
        }
        assert_eq!(*bag, bag.clone());
        assert_eq!(bag.compare_to(bag), 0);
        assert_eq!(bag.partial_cmp(bag), Some(Ordering::Equal));
        assert_eq!(bag.to_immutable(), *bag);
        assert_eq!(bag.tap(|_| {}), *bag);

        // Equality and hashing do not depend on ordering
        let reverse = Comparator::natural_reversed();
        let reversed = ImmutableSortedBag::with_all(Some(reverse.clone()), contents.iter().copied());
        assert_eq!(reversed, *bag);
        assert_eq!(reversed.hash_code(), bag.hash_code());
        check_equal_iterable(reversed.iter(), bag.iter().rev());
        assert!(reversed.comparator().is_some_and(|c| c.ptr_eq(&reverse)));
        assert!(reversed.distinct().comparator().is_some_and(|c| c.ptr_eq(&reverse)));
        assert!(reversed.select(|_| true).comparator().is_some_and(|c| c.ptr_eq(&reverse)));
        assert!(reversed.take(1).comparator().is_some_and(|c| c.ptr_eq(&reverse)));
        assert!(reversed.new_with(0).comparator().is_some_and(|c| c.ptr_eq(&reverse)));
        let keeps_reverse = |derived: &ImmutableSortedBag<i32>| {
            derived.comparator().is_some_and(|c| c.ptr_eq(&reverse))
        };
        let half = reversed.size() / 2;
        assert!(keeps_reverse(&reversed.drop(half)));
        assert!(keeps_reverse(&reversed.drop(reversed.size())));
        assert!(keeps_reverse(&reversed.take_while(|&x| x > 0)));
        assert!(keeps_reverse(&reversed.drop_while(|&x| x > 0)));
        assert!(keeps_reverse(&reversed.reject(|_| true)));
        assert!(keeps_reverse(&reversed.new_without_all(contents.iter().copied())));
        assert!(keeps_reverse(&reversed.select_instances_of::<i32>()));
        assert!(reversed.chunk(2).unwrap().iter().all(keeps_reverse));
        assert!(keeps_reverse(&(&reversed | bag)));
        assert!(keeps_reverse(&(&reversed & bag)));
        assert!(keeps_reverse(&(&reversed - bag)));
        assert!(keeps_reverse(&(&reversed ^ bag)));
        assert!(keeps_reverse(&(&reversed + bag)));
        let zipped = reversed.zip_with_index();
        assert!(zipped.comparator().is_some());
        check_equal_iterable(zipped.iter().map(|(val, _)| val), reversed.iter());
        check_equal_iterable(zipped.iter().map(|&(_, idx)| idx), 0..reversed.size());
        assert!(reversed.to_map_of_item_to_count().comparator().is_some_and(|c| c.ptr_eq(&reverse)));
        assert!(reversed.group_by(|x| x % 2).comparator().is_some_and(|c| c.ptr_eq(&reverse)));
        let partition = reversed.partition_while(|&x| x > 0);
        assert!(keeps_reverse(partition.selected()) && keeps_reverse(partition.rejected()));

        // Windowed traversal
        let mut visited = Vec::new();
        assert_eq!(bag.for_each_with_index_in_range(0..bag.size(), |val, idx| visited.push((*val, idx))), Ok(()));
        check_equal_iterable(visited, sorted.iter().copied().zip(0..));
        assert_eq!(bag.for_each_in_range(0..0, |_| {}), Ok(()));
        assert_matches!(
            bag.for_each_in_range(0..bag.size() + 1, |_| {}),
            Err(Error::IndexRange { .. })
        );
        let mut with_occurrences = 0;
        bag.for_each_with_occurrences(|_, count| with_occurrences += count.get());
        assert_eq!(with_occurrences, bag.size());

        // Filtering
        let is_even = |x: &i32| x % 2 == 0;
        let even = bag.select(is_even);
        let odd = bag.reject(is_even);
        assert_eq!(even.size() + odd.size(), bag.size());
        assert!(even.iter().all(is_even));
        assert!(!odd.iter().any(is_even));
        assert_eq!(even, bag.reject(|x| !is_even(x)));
        assert_eq!(even, bag.select_with(|x, modulus| x % modulus == 0, &2));
        assert_eq!(odd, bag.reject_with(|x, modulus| x % modulus == 0, &2));
        let partition = bag.partition(is_even);
        assert_eq!(*partition.selected(), even);
        assert_eq!(*partition.rejected(), odd);
        assert_eq!(bag.select(|_| true), *bag);
        assert!(bag.select(|_| false).is_empty());
        let repeated = bag.select_by_occurrences(|count| count > 1);
        assert!(repeated.entries().all(|(_, count)| count.get() > 1));
        assert_eq!(bag.select_instances_of::<i32>(), *bag);
        assert!(bag.select_instances_of::<u32>().is_empty());

        // Distinct values and indices
        let distinct = bag.distinct();
        check_equal_iterable(distinct.iter(), bag.values());
        assert_eq!(distinct.len(), bag.size_distinct());
        check_equal_iterable(
            bag.zip_with_index().iter().copied(),
            sorted.iter().copied().zip(0..),
        );

        // Prefixes and suffixes
        for count in [0, 1, bag.size() / 2, bag.size(), bag.size() + 1] {
            let taken = bag.take(count);
            let dropped = bag.drop(count);
            check_equal_iterable(taken.iter(), bag.iter().take(count));
            check_equal_iterable(dropped.iter(), bag.iter().skip(count));
            assert_eq!(taken.take(count), taken);
            assert_eq!(taken.size() + dropped.size(), bag.size());
        }
        let small = |x: &i32| *x < 0;
        check_equal_iterable(bag.take_while(small).iter(), bag.iter().take_while(|x| small(*x)));
        check_equal_iterable(bag.drop_while(small).iter(), bag.iter().skip_while(|x| small(*x)));
        let partition = bag.partition_while(small);
        assert_eq!(*partition.selected(), bag.take_while(small));
        assert_eq!(*partition.rejected(), bag.drop_while(small));

        // Groupings
        let by_sign = bag.group_by(|x| x.signum());
        assert_eq!(by_sign.len(), bag.size());
        for (sign, group) in &by_sign {
            assert!(group.iter().all(|x| x.signum() == *sign));
        }
        let unique = bag.group_by_unique_key(|&x| x);
        check_equal_iterable(unique.unwrap().into_keys(), bag.values().copied());
        if bag.size_distinct() > 1 {
            assert_matches!(bag.group_by_unique_key(|_| ()), Err(Error::DuplicateKey));
        }

        // Chunking
        assert_eq!(bag.chunk(0).map_err(|e| e.kind()), Err(ErrorKind::InvalidArgument));
        for size in [1, 2, 3] {
            let chunks = bag.chunk(size).unwrap();
            assert_eq!(chunks.len(), bag.size().div_ceil(size));
            assert!(chunks.iter().all(|chunk| chunk.size() <= size));
            check_equal_iterable(chunks.iter().flat_map(|chunk| chunk.iter()), bag.iter());
        }
        assert!(bag.corresponds(sorted.iter(), |a, b| a == b));
        assert!(!bag.corresponds(sorted.iter().skip(1), |a, b| a == b) || bag.is_empty());
    }

    fn check_empty_bag(empty: &ImmutableSortedBag<i32>) {
        check_any_bag(empty, &[]);

        assert_eq!(empty.size(), 0);
        assert_eq!(empty.size_distinct(), 0);
        assert!(empty.is_empty());
        assert_matches!(empty, ImmutableSortedBag::Empty(_));
        assert_eq!(empty.get_first(), None);
        assert_eq!(empty.get_last(), None);
        assert_eq!(empty.hash_code(), 0);
        assert_eq!(*empty, ImmutableSortedBag::default());

        check_empty_iterable(empty.iter());
        check_empty_iterable(empty.values());
        check_empty_iterable(empty.entries());
        check_empty_iterable(empty.distinct().iter());
    }

    #[test]
    fn empty() {
        init_logger();
        check_empty_bag(&ImmutableSortedBag::default());
        check_empty_bag(&ImmutableSortedBag::empty());
        check_empty_bag(&ImmutableSortedBag::empty_with_comparator(Comparator::natural_reversed()));
        check_empty_bag(&ImmutableSortedBag::from_iter(Vec::<i32>::new()));
        check_empty_bag(&ImmutableSortedBag::from_iter([1, 2, 2]).select(|_| false));
    }

    #[test]
    fn custom_ordering() {
        init_logger();
        let by_abs = Comparator::by_key(|x: &i32| x.unsigned_abs());
        let bag = ImmutableSortedBag::with_all(Some(by_abs.clone()), [-3, 1, 2, -1, 3]);
        assert!(bag.iter().eq(&[1, 1, 2, -3, -3]));
        assert_eq!(bag.occurrences_of(&-1), 2);
        assert_eq!(bag.size_distinct(), 3);
        assert_eq!(bag.min(), Ok(&1));
        assert_eq!(bag.max(), Ok(&-3));
        assert_eq!(bag.index_of(&3), Some(3));
        assert!(bag.new_with(-2).iter().eq(&[1, 1, 2, 2, -3, -3]));
        assert!(bag.new_with(-2).comparator().is_some_and(|c| c.ptr_eq(&by_abs)));
        assert!(bag.new_without(&3).iter().eq(&[1, 1, 2, -3]));
        assert!(bag.new_without_all([1, 4]).iter().eq(&[2, -3, -3]));
        assert!(bag.new_with_all([0, -2]).iter().eq(&[0, 1, 1, 2, 2, -3, -3]));
    }

    #[test]
    fn equality_ignores_merging_comparators() {
        let by_abs1 = Comparator::by_key(|x: &i32| x.unsigned_abs());
        let by_abs2 = Comparator::by_key(|x: &i32| x.unsigned_abs());
        let a = ImmutableSortedBag::with_all(Some(by_abs1.clone()), [-1, 1]);
        let b = ImmutableSortedBag::with_all(Some(by_abs2), [1, -1]);
        let c = ImmutableSortedBag::with_all(Some(by_abs1), [1, -1]);
        assert!(a.iter().eq(&[-1, -1]));
        assert!(b.iter().eq(&[1, 1]));
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(b, c);
        assert_eq!(b.hash_code(), c.hash_code());
        assert_eq!(b, ImmutableSortedBag::from_iter([1, 1]));
        assert_ne!(a, ImmutableSortedBag::from_iter([-1, 1]));
    }

    #[test]
    fn comparisons() {
        let empty = ImmutableSortedBag::<i32>::empty();
        let small = ImmutableSortedBag::from_iter([1, 2]);
        let large = ImmutableSortedBag::from_iter([1, 2, 2]);
        let other = ImmutableSortedBag::from_iter([1, 3]);
        assert_eq!(empty.compare_to(&large), -3);
        assert_eq!(large.compare_to(&empty), 3);
        assert_eq!(small.compare_to(&large), -1);
        assert_eq!(small.compare_to(&other), -1);
        assert_eq!(other.compare_to(&large), 1);
        assert!(empty < small && small < large && large < other);

        let reversed = ImmutableSortedBag::with_all(Some(Comparator::natural_reversed()), [1, 2]);
        assert_eq!(reversed.partial_cmp(&small), Some(Ordering::Equal));
        assert_eq!(reversed.partial_cmp(&large), None);
        assert_eq!(empty.partial_cmp(&reversed), Some(Ordering::Less));
    }

    #[test]
    fn chunks() {
        let bag = ImmutableSortedBag::from_iter([1, 1, 1, 2, 3]);
        let chunks = bag.chunk(2).unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].iter().eq(&[1, 1]));
        assert!(chunks[1].iter().eq(&[1, 2]));
        assert!(chunks[2].iter().eq(&[3]));
        assert_matches!(bag.chunk(0), Err(Error::ChunkSize(0)));
    }

    #[test]
    #[should_panic(expected = "Multiplicity counter has overflown")]
    fn too_many_elements() {
        let _ = ImmutableSortedBag::from_entries(
            None,
            [(1, NonZeroUsize::MAX), (2, NonZeroUsize::MAX)],
        );
    }

    #[test]
    fn singleton_from_empty() {
        let bag = ImmutableSortedBag::<i32>::empty().new_with(5);
        assert_eq!(bag.size(), 1);
        assert_matches!(bag, ImmutableSortedBag::Populated(_));
        assert!(bag.entries().eq([(&5, ONE)]));
        assert_matches!(bag.new_without(&5), ImmutableSortedBag::Empty(_));
    }

    proptest! {
        #[test]
        fn single(contents in any::<Vec<i32>>()) {
            let bag = contents.iter().copied().collect();
            check_any_bag(&bag, &contents);
        }
    }

    fn bag() -> impl Strategy<Value = ImmutableSortedBag<i32>> {
        any::<Vec<i32>>().prop_map(|v| v.into_iter().collect())
    }

    fn bag_and_value() -> impl Strategy<Value = (ImmutableSortedBag<i32>, i32)> {
        bag().prop_flat_map(|bag| {
            if bag.is_empty() {
                (Just(bag), any::<i32>()).boxed()
            } else {
                let inner_value = prop::sample::select(bag.values().copied().collect::<Vec<_>>());
                let value = prop_oneof![inner_value, any::<i32>(),];
                (Just(bag), value).boxed()
            }
        })
    }

    proptest! {
        #[test]
        fn with_value((bag, value) in bag_and_value()) {
            let count = bag.occurrences_of(&value);
            assert_eq!(bag.contains(&value), count > 0);

            let added = bag.new_with(value);
            assert_eq!(added.size(), bag.size() + 1);
            assert_eq!(added.occurrences_of(&value), count + 1);
            assert_eq!(bag, bag.new_with_all(std::iter::empty()));
            assert_eq!(added.new_without(&value), bag);

            let removed = bag.new_without(&value);
            assert_eq!(removed.size(), bag.size() - count.min(1));
            assert_eq!(removed.occurrences_of(&value), count.saturating_sub(1));

            let removed_all = bag.new_without_all([value]);
            assert_eq!(removed_all.size(), bag.size() - count);
            assert!(!removed_all.contains(&value));
            assert_eq!(removed_all, bag.reject(|&x| x == value));
        }
    }
}
