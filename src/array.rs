//! Array-backed representation of non-empty sorted bags

use crate::{
    bag::ImmutableSortedBag,
    comparator::{self, Comparator},
    sorted_bag::SortedBag,
};
use std::{num::NonZeroUsize, sync::Arc};

/// Non-empty sorted bag stored as a run-length encoded sorted array
///
/// Each distinct value is stored once, along with its multiplicity, and
/// entries are sorted by the bag's comparator. The array is shared between
/// clones of the bag, which is possible because it is never modified after
/// construction.
///
/// Values of this type can only be obtained from an
/// [`ImmutableSortedBag::Populated`], whose factories guarantee that they
/// hold at least one element.
pub struct SortedArrayBag<T> {
    /// Mapping from distinct values to their multiplicities, sorted by value
    entries: Arc<[(T, NonZeroUsize)]>,

    /// Number of elements = sum of all multiplicities
    len: usize,

    /// Ordering of `entries`, `None` means natural ordering
    comparator: Option<Comparator<T>>,
}
//
impl<T: Ord> SortedArrayBag<T> {
    /// Wrap entries that are sorted, deduplicated and non-empty
    ///
    /// # Panics
    ///
    /// If the total number of elements overflows `usize`.
    pub(crate) fn from_sorted_entries(
        comparator: Option<Comparator<T>>,
        entries: Vec<(T, NonZeroUsize)>,
    ) -> Self {
        debug_assert!(!entries.is_empty());
        debug_assert!(is_strictly_sorted(comparator.as_ref(), &entries));
        let len = entries.iter().fold(0usize, |len, (_, count)| {
            len.checked_add(count.get())
                .expect("Multiplicity counter has overflown")
        });
        Self {
            entries: entries.into(),
            len,
            comparator,
        }
    }
}
//
impl<T> Clone for SortedArrayBag<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            len: self.len,
            comparator: self.comparator.clone(),
        }
    }
}
//
impl<T: std::fmt::Debug> std::fmt::Debug for SortedArrayBag<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortedArrayBag")
            .field("entries", &self.entries)
            .field("len", &self.len)
            .field("comparator", &self.comparator)
            .finish()
    }
}
//
impl<T: Clone + Ord> SortedBag<T> for SortedArrayBag<T> {
    fn comparator(&self) -> Option<&Comparator<T>> {
        self.comparator.as_ref()
    }

    fn as_entries(&self) -> &[(T, NonZeroUsize)] {
        &self.entries
    }

    fn size(&self) -> usize {
        self.len
    }

    fn to_immutable(&self) -> ImmutableSortedBag<T> {
        ImmutableSortedBag::Populated(self.clone())
    }
}

/// Multiplicity of a single element
pub(crate) const ONE: NonZeroUsize = NonZeroUsize::MIN;

/// Locate `value` in sorted `entries`, with the usual binary search
/// convention: `Ok` is the position of the entry, `Err` the position where it
/// would be inserted.
pub(crate) fn find<T: Ord>(
    comparator: Option<&Comparator<T>>,
    entries: &[(T, NonZeroUsize)],
    value: &T,
) -> Result<usize, usize> {
    entries.binary_search_by(|(probe, _)| comparator::compare(comparator, probe, value))
}

/// Truth that `entries` are sorted and that no two of them compare equal
pub(crate) fn is_strictly_sorted<T: Ord>(
    comparator: Option<&Comparator<T>>,
    entries: &[(T, NonZeroUsize)],
) -> bool {
    entries
        .windows(2)
        .all(|pair| comparator::compare(comparator, &pair[0].0, &pair[1].0).is_lt())
}

/// Add `count` occurences of `value` at the end of sorted `entries`, merging
/// them into the last entry if it holds the same value
///
/// # Panics
///
/// If the multiplicity of the last entry overflows.
pub(crate) fn push_sorted<T: Ord>(
    comparator: Option<&Comparator<T>>,
    entries: &mut Vec<(T, NonZeroUsize)>,
    value: T,
    count: NonZeroUsize,
) {
    if let Some((last, last_count)) = entries.last_mut() {
        if comparator::compare(comparator, last, &value).is_eq() {
            *last_count = last_count
                .checked_add(count.get())
                .expect("Multiplicity counter has overflown");
            return;
        }
    }
    debug_assert!(
        entries
            .last()
            .is_none_or(|(last, _)| comparator::compare(comparator, last, &value).is_lt())
    );
    entries.push((value, count));
}

/// Turn an arbitrary sequence of `(value, count)` pairs into sorted,
/// deduplicated entries
pub(crate) fn sort_entries<T: Ord>(
    comparator: Option<&Comparator<T>>,
    unsorted: impl IntoIterator<Item = (T, NonZeroUsize)>,
) -> Vec<(T, NonZeroUsize)> {
    let mut unsorted = unsorted.into_iter().collect::<Vec<_>>();
    unsorted.sort_by(|(a, _), (b, _)| comparator::compare(comparator, a, b));
    let mut entries = Vec::with_capacity(unsorted.len());
    for (value, count) in unsorted {
        push_sorted(comparator, &mut entries, value, count);
    }
    entries
}

#[cfg(test)]
mod test {
    use super::*;

    fn nonzero(x: usize) -> NonZeroUsize {
        NonZeroUsize::new(x).unwrap()
    }

    #[test]
    fn sorting_merges_duplicates() {
        let entries = sort_entries(None, [(3, ONE), (1, nonzero(2)), (3, nonzero(4))]);
        assert_eq!(entries, [(1, nonzero(2)), (3, nonzero(5))]);
        assert!(is_strictly_sorted(None, &entries));

        let reverse = Comparator::natural_reversed();
        let entries = sort_entries(Some(&reverse), [(1, ONE), (2, ONE), (1, ONE)]);
        assert_eq!(entries, [(2, ONE), (1, nonzero(2))]);
        assert!(is_strictly_sorted(Some(&reverse), &entries));
        assert!(!is_strictly_sorted(None, &entries));
    }

    #[test]
    fn lookup() {
        let entries = [(1, ONE), (4, nonzero(2)), (9, ONE)];
        assert_eq!(find(None, &entries, &4), Ok(1));
        assert_eq!(find(None, &entries, &5), Err(2));
        assert_eq!(find(None, &entries, &0), Err(0));
    }

    #[test]
    #[should_panic(expected = "Multiplicity counter has overflown")]
    fn element_count_overflow() {
        let _ = SortedArrayBag::from_sorted_entries(
            None,
            vec![(1, NonZeroUsize::MAX), (2, NonZeroUsize::MAX)],
        );
    }

    #[test]
    fn storage_is_shared_between_clones() {
        let bag = SortedArrayBag::from_sorted_entries(None, vec![(1, nonzero(3)), (2, ONE)]);
        let clone = bag.clone();
        assert!(Arc::ptr_eq(&bag.entries, &clone.entries));
        assert_eq!(clone.size(), 4);
        assert_eq!(clone.size_distinct(), 2);
    }
}
