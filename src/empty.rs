//! Zero-element sorted bags

use crate::{
    array::ONE,
    bag::ImmutableSortedBag,
    comparator::{self, Comparator},
    error::{Error, Result},
    multimap::{MultimapBuilder, SortedBagMultimap},
    partition::PartitionSortedBag,
    sorted_bag::{self, SortedBag},
    sorted_map::SortedMap,
    sorted_set::ImmutableSortedSet,
};
use std::{
    any::Any,
    cmp::Ordering,
    collections::BTreeMap,
    fmt,
    hash::{Hash, Hasher},
    num::NonZeroUsize,
};

/// A sorted bag with no elements
///
/// Every operation answers in constant time without touching any storage.
/// Transformations that cannot add elements return an equivalent empty bag,
/// while [`new_with()`](SortedBag::new_with) and
/// [`new_with_all()`](SortedBag::new_with_all) go through the
/// [`ImmutableSortedBag`] factories.
///
/// The comparator of an empty bag is kept and handed over to every collection
/// derived from it, so that a bag built by adding elements to an empty bag
/// sorts them as expected.
///
/// # Examples
///
/// ```
/// use immutable_sorted_bag::{Comparator, EmptySortedBag, SortedBag};
///
/// let empty = EmptySortedBag::with_comparator(Comparator::<i32>::natural_reversed());
/// assert_eq!(empty.size(), 0);
/// assert!(empty.min().is_err());
/// assert!(empty.new_with_all([1, 3, 2]).iter().eq(&[3, 2, 1]));
/// ```
pub struct EmptySortedBag<T> {
    /// Ordering of this bag, `None` means natural ordering
    comparator: Option<Comparator<T>>,
}
//
impl<T> EmptySortedBag<T> {
    /// Empty bag using the natural ordering of `T`
    ///
    /// This is the one comparator-free empty bag, which all operations
    /// producing such a bag hand out.
    pub const NATURAL: Self = Self { comparator: None };

    /// Empty bag that will sort elements added to it with `comparator`
    #[must_use = "Only effect is to produce a result"]
    pub fn with_comparator(comparator: Comparator<T>) -> Self {
        Self {
            comparator: Some(comparator),
        }
    }

    /// Empty bag with an optional comparator
    pub(crate) fn new(comparator: Option<Comparator<T>>) -> Self {
        match comparator {
            Some(comparator) => Self::with_comparator(comparator),
            None => Self::NATURAL,
        }
    }
}
//
impl<T> Clone for EmptySortedBag<T> {
    fn clone(&self) -> Self {
        Self {
            comparator: self.comparator.clone(),
        }
    }
}
//
impl<T> fmt::Debug for EmptySortedBag<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmptySortedBag")
            .field("comparator", &self.comparator)
            .finish()
    }
}
//
impl<T> Default for EmptySortedBag<T> {
    fn default() -> Self {
        Self::NATURAL
    }
}
//
impl<T> Eq for EmptySortedBag<T> {}
//
impl<T> Hash for EmptySortedBag<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(0)
    }
}
//
impl<T> PartialEq for EmptySortedBag<T> {
    /// All empty bags are equal, whatever their comparator
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}
//
impl<T> PartialOrd for EmptySortedBag<T> {
    fn partial_cmp(&self, _other: &Self) -> Option<Ordering> {
        Some(Ordering::Equal)
    }
}
//
impl<T: Clone + Ord> SortedBag<T> for EmptySortedBag<T> {
    fn comparator(&self) -> Option<&Comparator<T>> {
        self.comparator.as_ref()
    }

    fn as_entries(&self) -> &[(T, NonZeroUsize)] {
        &[]
    }

    fn size(&self) -> usize {
        0
    }

    fn to_immutable(&self) -> ImmutableSortedBag<T> {
        ImmutableSortedBag::Empty(self.clone())
    }

    fn size_distinct(&self) -> usize {
        0
    }

    fn is_empty(&self) -> bool {
        true
    }

    fn multiplicity(&self, _value: &T) -> Option<NonZeroUsize> {
        None
    }

    fn occurrences_of(&self, _value: &T) -> usize {
        0
    }

    fn contains(&self, _value: &T) -> bool {
        false
    }

    fn min(&self) -> Result<&T> {
        Err(Error::EmptyCollection)
    }

    fn max(&self) -> Result<&T> {
        Err(Error::EmptyCollection)
    }

    fn min_by(&self, _compare: impl FnMut(&T, &T) -> Ordering) -> Result<&T> {
        Err(Error::EmptyCollection)
    }

    fn max_by(&self, _compare: impl FnMut(&T, &T) -> Ordering) -> Result<&T> {
        Err(Error::EmptyCollection)
    }

    fn min_by_key<K: Ord>(&self, _key: impl FnMut(&T) -> K) -> Result<&T> {
        Err(Error::EmptyCollection)
    }

    fn max_by_key<K: Ord>(&self, _key: impl FnMut(&T) -> K) -> Result<&T> {
        Err(Error::EmptyCollection)
    }

    fn get_first(&self) -> Option<&T> {
        None
    }

    fn get_last(&self) -> Option<&T> {
        None
    }

    fn count(&self, _predicate: impl FnMut(&T) -> bool) -> usize {
        0
    }

    fn detect_index(&self, _predicate: impl FnMut(&T) -> bool) -> Option<usize> {
        None
    }

    fn index_of(&self, _value: &T) -> Option<usize> {
        None
    }

    fn to_map_of_item_to_count(&self) -> SortedMap<T, usize> {
        SortedMap::new(self.comparator.clone())
    }

    fn to_stack(&self) -> Vec<T> {
        Vec::new()
    }

    /// Negated size of `other`
    fn compare_to(&self, other: &(impl SortedBag<T> + ?Sized)) -> isize {
        -(other.size() as isize)
    }

    fn equals_bag(&self, other: &(impl SortedBag<T> + ?Sized)) -> bool {
        other.is_empty()
    }

    fn hash_code(&self) -> u64
    where
        T: Hash,
    {
        0
    }

    fn tap(&self, _f: impl FnMut(&T)) -> ImmutableSortedBag<T> {
        self.to_immutable()
    }

    fn select(&self, _predicate: impl FnMut(&T) -> bool) -> ImmutableSortedBag<T> {
        self.to_immutable()
    }

    fn reject(&self, _predicate: impl FnMut(&T) -> bool) -> ImmutableSortedBag<T> {
        self.to_immutable()
    }

    fn select_with<P>(
        &self,
        _predicate: impl FnMut(&T, &P) -> bool,
        _parameter: &P,
    ) -> ImmutableSortedBag<T> {
        self.to_immutable()
    }

    fn reject_with<P>(
        &self,
        _predicate: impl FnMut(&T, &P) -> bool,
        _parameter: &P,
    ) -> ImmutableSortedBag<T> {
        self.to_immutable()
    }

    fn select_by_occurrences(
        &self,
        _predicate: impl FnMut(usize) -> bool,
    ) -> ImmutableSortedBag<T> {
        self.to_immutable()
    }

    fn partition(&self, _predicate: impl FnMut(&T) -> bool) -> PartitionSortedBag<T> {
        PartitionSortedBag::new(self.to_immutable(), self.to_immutable())
    }

    fn select_instances_of<S>(&self) -> ImmutableSortedBag<S>
    where
        T: Any,
        S: Any + Clone + Ord,
    {
        ImmutableSortedBag::empty_with(sorted_bag::downcast_comparator(self.comparator()))
    }

    fn distinct(&self) -> ImmutableSortedSet<T> {
        ImmutableSortedSet::empty(self.comparator.clone())
    }

    fn take(&self, _count: usize) -> ImmutableSortedBag<T> {
        self.to_immutable()
    }

    fn drop(&self, _count: usize) -> ImmutableSortedBag<T> {
        self.to_immutable()
    }

    fn take_while(&self, _predicate: impl FnMut(&T) -> bool) -> ImmutableSortedBag<T> {
        self.to_immutable()
    }

    fn drop_while(&self, _predicate: impl FnMut(&T) -> bool) -> ImmutableSortedBag<T> {
        self.to_immutable()
    }

    fn partition_while(&self, _predicate: impl FnMut(&T) -> bool) -> PartitionSortedBag<T> {
        PartitionSortedBag::new(self.to_immutable(), self.to_immutable())
    }

    fn group_by<K: Ord>(&self, _function: impl FnMut(&T) -> K) -> SortedBagMultimap<K, T> {
        MultimapBuilder::new(self.comparator.clone()).build()
    }

    fn group_by_each<K: Ord, I: IntoIterator<Item = K>>(
        &self,
        _function: impl FnMut(&T) -> I,
    ) -> SortedBagMultimap<K, T> {
        MultimapBuilder::new(self.comparator.clone()).build()
    }

    fn group_by_unique_key<K: Ord>(
        &self,
        _function: impl FnMut(&T) -> K,
    ) -> Result<BTreeMap<K, T>> {
        Ok(BTreeMap::new())
    }

    fn zip_with_index(&self) -> ImmutableSortedSet<(T, usize)>
    where
        T: 'static,
    {
        ImmutableSortedSet::empty(comparator::indexed(self.comparator()))
    }

    fn chunk(&self, size: usize) -> Result<Vec<ImmutableSortedBag<T>>> {
        if size == 0 {
            return Err(Error::ChunkSize(size));
        }
        Ok(Vec::new())
    }

    fn new_with(&self, value: T) -> ImmutableSortedBag<T> {
        ImmutableSortedBag::from_sorted_entries(self.comparator.clone(), vec![(value, ONE)])
    }

    fn new_with_all(&self, elements: impl IntoIterator<Item = T>) -> ImmutableSortedBag<T> {
        ImmutableSortedBag::with_all(self.comparator.clone(), elements)
    }

    fn new_without(&self, _value: &T) -> ImmutableSortedBag<T> {
        self.to_immutable()
    }

    fn new_without_all(&self, _elements: impl IntoIterator<Item = T>) -> ImmutableSortedBag<T> {
        self.to_immutable()
    }
}
