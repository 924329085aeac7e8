//! Immutable sorted set, as produced by [`distinct()`](crate::SortedBag::distinct)
//! and [`zip_with_index()`](crate::SortedBag::zip_with_index)

use crate::comparator::{self, Comparator};
use std::{fmt, sync::Arc};

/// An immutable set of distinct values, kept sorted by a [`Comparator`] or by
/// the natural ordering of `T`
///
/// # Examples
///
/// ```
/// use immutable_sorted_bag::{Comparator, ImmutableSortedBag, SortedBag};
///
/// let bag = ImmutableSortedBag::with_all(Some(Comparator::natural_reversed()), [1, 3, 3, 2]);
/// let set = bag.distinct();
/// assert!(set.iter().eq(&[3, 2, 1]));
/// assert!(set.comparator().is_some());
/// ```
#[derive(Clone)]
pub struct ImmutableSortedSet<T> {
    /// Distinct values in comparator order
    elements: Arc<[T]>,

    /// Ordering of `elements`, `None` means natural ordering
    comparator: Option<Comparator<T>>,
}
//
impl<T> ImmutableSortedSet<T> {
    /// Makes a new, empty `ImmutableSortedSet` with the specified ordering
    #[must_use = "Only effect is to produce a result"]
    pub fn empty(comparator: Option<Comparator<T>>) -> Self {
        Self {
            elements: Vec::new().into(),
            comparator,
        }
    }

    /// Number of values in the set
    #[must_use = "Only effect is to produce a result"]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Truth that the set contains no values
    #[must_use = "Only effect is to produce a result"]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Ordering of this set, `None` means natural ordering
    #[must_use = "Only effect is to produce a result"]
    pub fn comparator(&self) -> Option<&Comparator<T>> {
        self.comparator.as_ref()
    }

    /// Iterator over the values of the set, in sorted order
    #[must_use = "Only effect is to produce a result"]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    /// Smallest value of the set, if any
    #[must_use = "Only effect is to produce a result"]
    pub fn first(&self) -> Option<&T> {
        self.elements.first()
    }

    /// Largest value of the set, if any
    #[must_use = "Only effect is to produce a result"]
    pub fn last(&self) -> Option<&T> {
        self.elements.last()
    }

    /// Sorted values as a slice
    #[must_use = "Only effect is to produce a result"]
    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }
}
//
impl<T: Ord> ImmutableSortedSet<T> {
    /// Build a set from values that are already sorted and deduplicated
    pub(crate) fn from_sorted(comparator: Option<Comparator<T>>, elements: Vec<T>) -> Self {
        debug_assert!(elements.windows(2).all(|pair| {
            comparator::compare(comparator.as_ref(), &pair[0], &pair[1]).is_lt()
        }));
        Self {
            elements: elements.into(),
            comparator,
        }
    }

    /// Truth that `value` belongs to the set
    #[must_use = "Only effect is to produce a result"]
    pub fn contains(&self, value: &T) -> bool {
        self.elements
            .binary_search_by(|probe| comparator::compare(self.comparator.as_ref(), probe, value))
            .is_ok()
    }
}

impl<T: fmt::Debug> fmt::Debug for ImmutableSortedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.elements.iter()).finish()
    }
}

impl<T: Ord> PartialEq for ImmutableSortedSet<T> {
    /// Set equality, which does not depend on the ordering of either set
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        if comparator::same_ordering(self.comparator(), other.comparator()) {
            return self.elements == other.elements;
        }
        // Comparators may merge values that `T` considers distinct, so values
        // are matched under the natural ordering of `T` instead
        naturally_sorted(&self.elements) == naturally_sorted(&other.elements)
    }
}
//
impl<T: Ord> Eq for ImmutableSortedSet<T> {}

/// References to `elements`, sorted by the natural ordering of `T`
fn naturally_sorted<T: Ord>(elements: &[T]) -> Vec<&T> {
    let mut sorted = elements.iter().collect::<Vec<_>>();
    sorted.sort_unstable();
    sorted
}

impl<'a, T> IntoIterator for &'a ImmutableSortedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
