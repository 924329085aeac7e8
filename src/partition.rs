//! Outcome of splitting a sorted bag in two

use crate::{bag::ImmutableSortedBag, sorted_bag::SortedBag};

/// The two sorted bags produced by [`partition()`](SortedBag::partition) and
/// [`partition_while()`](SortedBag::partition_while)
///
/// Both bags use the ordering of the bag they were split from.
#[derive(Clone, Debug)]
pub struct PartitionSortedBag<T> {
    /// Elements that satisfied the predicate
    selected: ImmutableSortedBag<T>,

    /// Elements that did not satisfy the predicate
    rejected: ImmutableSortedBag<T>,
}
//
impl<T> PartitionSortedBag<T> {
    pub(crate) fn new(selected: ImmutableSortedBag<T>, rejected: ImmutableSortedBag<T>) -> Self {
        Self { selected, rejected }
    }

    /// Elements that satisfied the predicate
    #[must_use = "Only effect is to produce a result"]
    pub fn selected(&self) -> &ImmutableSortedBag<T> {
        &self.selected
    }

    /// Elements that did not satisfy the predicate
    #[must_use = "Only effect is to produce a result"]
    pub fn rejected(&self) -> &ImmutableSortedBag<T> {
        &self.rejected
    }

    /// Split into `(selected, rejected)`
    #[must_use = "Only effect is to produce a result"]
    pub fn into_parts(self) -> (ImmutableSortedBag<T>, ImmutableSortedBag<T>) {
        (self.selected, self.rejected)
    }
}
//
impl<T: Clone + Ord> PartialEq for PartitionSortedBag<T> {
    fn eq(&self, other: &Self) -> bool {
        self.selected.equals_bag(&other.selected) && self.rejected.equals_bag(&other.rejected)
    }
}
//
impl<T: Clone + Ord> Eq for PartitionSortedBag<T> {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::comparator::Comparator;

    #[test]
    fn split() {
        let bag = ImmutableSortedBag::from_iter([1, 2, 2, 3, 4]);
        let partition = bag.partition(|x| x % 2 == 0);
        assert!(partition.selected().iter().eq(&[2, 2, 4]));
        assert!(partition.rejected().iter().eq(&[1, 3]));
        let (selected, rejected) = partition.into_parts();
        assert_eq!(selected.size() + rejected.size(), bag.size());
    }

    #[test]
    fn split_keeps_ordering() {
        let reverse = Comparator::natural_reversed();
        let bag = ImmutableSortedBag::with_all(Some(reverse.clone()), [1, 2, 3, 3]);
        let partition = bag.partition_while(|&x| x > 2);
        assert!(partition.selected().iter().eq(&[3, 3]));
        assert!(partition.rejected().iter().eq(&[2, 1]));
        for part in [partition.selected(), partition.rejected()] {
            assert!(part.comparator().is_some_and(|c| c.ptr_eq(&reverse)));
        }
        assert_eq!(partition, bag.partition(|&x| x == 3));
    }
}
