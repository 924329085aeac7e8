//! Multiset algebra between sorted bags
//!
//! All operations are computed by well-ordered joint iteration over the
//! entries of both operands, which requires both operands to be sorted by the
//! same ordering. Results use the ordering of the left-hand operand, and the
//! right-hand operand is sorted again when its ordering is different.

use crate::{
    array,
    bag::ImmutableSortedBag,
    comparator::{self, Comparator},
    sorted_bag::SortedBag,
};
use log::debug;
use std::{
    borrow::Cow,
    cmp::Ordering,
    num::NonZeroUsize,
    ops::{Add, BitAnd, BitOr, BitXor, Sub},
};

type Entries<T> = Vec<(T, NonZeroUsize)>;

/// Entries of `other`, sorted by `comparator`
fn aligned<'a, T: Clone + Ord>(
    comparator: Option<&Comparator<T>>,
    other: &'a (impl SortedBag<T> + ?Sized),
) -> Cow<'a, [(T, NonZeroUsize)]> {
    if comparator::same_ordering(comparator, other.comparator()) {
        Cow::Borrowed(other.as_entries())
    } else {
        debug!(
            "Sorting {} distinct values again to match the left-hand operand's ordering",
            other.size_distinct()
        );
        Cow::Owned(array::sort_entries(
            comparator,
            other.as_entries().iter().cloned(),
        ))
    }
}

/// Elements that are in either operand, counting values present in both
/// operands as many times as the operand where they are most frequent
pub(crate) fn union<T: Clone + Ord>(
    comparator: Option<&Comparator<T>>,
    left: &[(T, NonZeroUsize)],
    right: &[(T, NonZeroUsize)],
) -> Entries<T> {
    let mut result = Vec::with_capacity(left.len().max(right.len()));
    let mut iter1 = left.iter().peekable();
    let mut iter2 = right.iter().peekable();
    loop {
        let next = match (iter1.peek(), iter2.peek()) {
            // As long as both iterators yield entries, must be careful to
            // push them in the right order and merge common multiplicities
            (Some((value1, multiplicity1)), Some((value2, multiplicity2))) => {
                match comparator::compare(comparator, value1, value2) {
                    Ordering::Less => iter1.next().cloned(),
                    Ordering::Greater => iter2.next().cloned(),
                    Ordering::Equal => {
                        let merged = (value1.clone(), *multiplicity1.max(multiplicity2));
                        let _ = (iter1.next(), iter2.next());
                        Some(merged)
                    }
                }
            }

            // Once one iterator ends, we can just take the rest as-is
            (Some(_), None) => iter1.next().cloned(),
            (None, Some(_)) => iter2.next().cloned(),
            (None, None) => return result,
        };
        result.extend(next);
    }
}

/// Elements that are in both operands
pub(crate) fn intersection<T: Clone + Ord>(
    comparator: Option<&Comparator<T>>,
    left: &[(T, NonZeroUsize)],
    right: &[(T, NonZeroUsize)],
) -> Entries<T> {
    let mut result = Vec::with_capacity(left.len().min(right.len()));
    let mut iter1 = left.iter().peekable();
    let mut iter2 = right.iter().peekable();
    while let (Some((value1, multiplicity1)), Some((value2, multiplicity2))) =
        (iter1.peek(), iter2.peek())
    {
        match comparator::compare(comparator, value1, value2) {
            // Advance the iterator which is behind, trying to make it reach
            // the same value as the other iterator.
            Ordering::Less => {
                let _ = iter1.next();
            }
            Ordering::Greater => {
                let _ = iter2.next();
            }

            // Merge entries associated with a common value
            Ordering::Equal => {
                result.push((value1.clone(), *multiplicity1.min(multiplicity2)));
                let _ = (iter1.next(), iter2.next());
            }
        }
    }
    // Once one iterator ends, there is no common value left
    result
}

/// Elements of `left` that are not matched by an element of `right`
pub(crate) fn difference<T: Clone + Ord>(
    comparator: Option<&Comparator<T>>,
    left: &[(T, NonZeroUsize)],
    right: &[(T, NonZeroUsize)],
) -> Entries<T> {
    let mut result = Vec::with_capacity(left.len());
    let mut other_iter = right.iter().peekable();
    'self_iter: for (value, multiplicity) in left {
        // Check if this value also exists in the other iterator
        'other_iter: loop {
            match other_iter.peek() {
                Some((other_value, other_multiplicity)) => {
                    match comparator::compare(comparator, value, other_value) {
                        // Other iterator is ahead, and because it emits values
                        // in sorted order, we know it's never going to get
                        // back to the current value. So we can keep it.
                        Ordering::Less => break 'other_iter,

                        // Other iterator is behind and may get to the current
                        // value later in its sorted sequence, so we must
                        // advance it and check again.
                        Ordering::Greater => {
                            let _ = other_iter.next();
                            continue 'other_iter;
                        }

                        // If `left` contains more occurences of the common
                        // value than `right`, then we must keep those extra
                        // occurences. Otherwise the value is discarded.
                        Ordering::Equal => {
                            let remaining = multiplicity.get().saturating_sub(other_multiplicity.get());
                            let _ = other_iter.next();
                            if let Some(remaining) = NonZeroUsize::new(remaining) {
                                result.push((value.clone(), remaining));
                            }
                            continue 'self_iter;
                        }
                    }
                }

                // Other iterator has ended, can keep all remaining values
                None => break 'other_iter,
            }
        }
        result.push((value.clone(), *multiplicity));
    }
    result
}

/// Elements that are in one operand but not matched in the other
pub(crate) fn symmetric_difference<T: Clone + Ord>(
    comparator: Option<&Comparator<T>>,
    left: &[(T, NonZeroUsize)],
    right: &[(T, NonZeroUsize)],
) -> Entries<T> {
    let mut result = Vec::with_capacity(left.len() + right.len());
    let mut iter1 = left.iter().peekable();
    let mut iter2 = right.iter().peekable();
    loop {
        match (iter1.peek(), iter2.peek()) {
            (Some((value1, multiplicity1)), Some((value2, multiplicity2))) => {
                match comparator::compare(comparator, value1, value2) {
                    // Keep the smallest entry, advancing the corresponding
                    // iterator along the way
                    Ordering::Less => result.extend(iter1.next().cloned()),
                    Ordering::Greater => result.extend(iter2.next().cloned()),

                    // If a common value has different multiplicities, we must
                    // still keep the absolute difference of these
                    // multiplicities.
                    Ordering::Equal => {
                        let difference = multiplicity1.get().abs_diff(multiplicity2.get());
                        if let Some(difference) = NonZeroUsize::new(difference) {
                            result.push((value1.clone(), difference));
                        }
                        let _ = (iter1.next(), iter2.next());
                    }
                }
            }

            // Once one iterator ends, there's no common value left and the
            // remainder can be kept as-is.
            (Some(_), None) => result.extend(iter1.by_ref().cloned()),
            (None, Some(_)) => result.extend(iter2.by_ref().cloned()),
            (None, None) => return result,
        }
    }
}

/// Elements of both operands, adding up the multiplicities of common values
///
/// # Panics
///
/// If the multiplicity of a common value overflows.
pub(crate) fn sum<T: Clone + Ord>(
    comparator: Option<&Comparator<T>>,
    left: &[(T, NonZeroUsize)],
    right: &[(T, NonZeroUsize)],
) -> Entries<T> {
    let mut result = Vec::with_capacity(left.len() + right.len());
    let mut iter1 = left.iter().peekable();
    let mut iter2 = right.iter().peekable();
    loop {
        let next = match (iter1.peek(), iter2.peek()) {
            (Some((value1, _)), Some((value2, _))) => {
                match comparator::compare(comparator, value1, value2) {
                    Ordering::Less | Ordering::Equal => iter1.next(),
                    Ordering::Greater => iter2.next(),
                }
            }
            (Some(_), None) => iter1.next(),
            (None, Some(_)) => iter2.next(),
            (None, None) => return result,
        };
        if let Some((value, multiplicity)) = next {
            array::push_sorted(comparator, &mut result, value.clone(), *multiplicity);
        }
    }
}

/// Truth that every value of `left` is in `right`, with at least the same
/// multiplicity
fn is_subset<T: Ord>(
    comparator: Option<&Comparator<T>>,
    left: &[(T, NonZeroUsize)],
    right: &[(T, NonZeroUsize)],
) -> bool {
    let mut other_iter = right.iter().peekable();
    for (value, multiplicity) in left {
        'other_iter: loop {
            match other_iter.peek() {
                Some((other_value, other_multiplicity)) => {
                    match comparator::compare(comparator, value, other_value) {
                        // Other iterator is ahead and will never get back to
                        // the current value, so `right` does not contain it.
                        Ordering::Less => return false,

                        // Other iterator is behind, advance it and check again
                        Ordering::Greater => {
                            let _ = other_iter.next();
                            continue 'other_iter;
                        }

                        // For `left` to be a subset, `right` must contain at
                        // least the same number of occurences of this value.
                        Ordering::Equal => {
                            if other_multiplicity < multiplicity {
                                return false;
                            }
                            let _ = other_iter.next();
                            break 'other_iter;
                        }
                    }
                }

                // Other iterator has ended, it won't yield `value`
                None => return false,
            }
        }
    }
    true
}

/// Truth that no value is present in both operands
fn is_disjoint<T: Ord>(
    comparator: Option<&Comparator<T>>,
    left: &[(T, NonZeroUsize)],
    right: &[(T, NonZeroUsize)],
) -> bool {
    let mut iter1 = left.iter().peekable();
    let mut iter2 = right.iter().peekable();
    while let (Some((value1, _)), Some((value2, _))) = (iter1.peek(), iter2.peek()) {
        match comparator::compare(comparator, value1, value2) {
            Ordering::Less => {
                let _ = iter1.next();
            }
            Ordering::Greater => {
                let _ = iter2.next();
            }
            Ordering::Equal => return false,
        }
    }
    true
}

/// # Multiset algebra
///
/// These operations accept any sorted bag as their right-hand operand. The
/// result always uses the ordering of `self`.
impl<T: Clone + Ord> ImmutableSortedBag<T> {
    /// Apply a merge operation to the entries of `self` and `other`
    fn merge(
        &self,
        other: &(impl SortedBag<T> + ?Sized),
        operation: impl FnOnce(
            Option<&Comparator<T>>,
            &[(T, NonZeroUsize)],
            &[(T, NonZeroUsize)],
        ) -> Entries<T>,
    ) -> Self {
        let comparator = self.comparator();
        let other = aligned(comparator, other);
        Self::from_sorted_entries(
            comparator.cloned(),
            operation(comparator, self.as_entries(), &other),
        )
    }

    /// Union of `self` and `other`
    ///
    /// If both bags contain occurences of a value `v` with respective
    /// multiplicities `s` and `o`, then the union contains `s.max(o)`
    /// occurences of `v`.
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::{ImmutableSortedBag, SortedBag};
    ///
    /// let a = ImmutableSortedBag::from_iter([1, 1, 2, 2, 3]);
    /// let b = ImmutableSortedBag::from_iter([2, 3, 4]);
    /// assert!(a.union(&b).iter().eq(&[1, 1, 2, 2, 3, 4]));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn union(&self, other: &(impl SortedBag<T> + ?Sized)) -> Self {
        self.merge(other, union)
    }

    /// Intersection of `self` and `other`
    ///
    /// If both bags contain occurences of a value `v` with respective
    /// multiplicities `s` and `o`, then the intersection contains `s.min(o)`
    /// occurences of `v`.
    #[must_use = "Only effect is to produce a result"]
    pub fn intersection(&self, other: &(impl SortedBag<T> + ?Sized)) -> Self {
        self.merge(other, intersection)
    }

    /// Elements of `self` that are not matched by an element of `other`
    ///
    /// If both bags contain occurences of a value `v` with respective
    /// multiplicities `s` and `o`, then the difference contains
    /// `s.saturating_sub(o)` occurences of `v`.
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::{ImmutableSortedBag, SortedBag};
    ///
    /// let a = ImmutableSortedBag::from_iter([1, 1, 2, 2, 3]);
    /// let b = ImmutableSortedBag::from_iter([2, 3, 4]);
    /// assert!(a.difference(&b).iter().eq(&[1, 1, 2]));
    /// assert!(b.difference(&b).is_empty());
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn difference(&self, other: &(impl SortedBag<T> + ?Sized)) -> Self {
        self.merge(other, difference)
    }

    /// Elements that are in `self` or in `other` but not in both
    ///
    /// If both bags contain occurences of a value `v` with respective
    /// multiplicities `s` and `o`, then the symmetric difference contains
    /// `s.abs_diff(o)` occurences of `v`.
    #[must_use = "Only effect is to produce a result"]
    pub fn symmetric_difference(&self, other: &(impl SortedBag<T> + ?Sized)) -> Self {
        self.merge(other, symmetric_difference)
    }

    /// All elements of `self` and `other`
    ///
    /// If both bags contain occurences of a value `v` with respective
    /// multiplicities `s` and `o`, then the sum contains `s + o` occurences of
    /// `v`.
    ///
    /// # Panics
    ///
    /// If the multiplicity of a value overflows `usize`.
    #[must_use = "Only effect is to produce a result"]
    pub fn sum(&self, other: &(impl SortedBag<T> + ?Sized)) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        self.merge(other, sum)
    }

    /// Truth that `other` contains every element of `self`
    ///
    /// In a multiset context, this means that if `self` contains N occurences
    /// of a certain value, then `other` must contain at least N occurences of
    /// that value.
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::ImmutableSortedBag;
    ///
    /// let sup = ImmutableSortedBag::from_iter([1, 2, 2]);
    /// assert!(ImmutableSortedBag::from_iter([2, 2]).is_subset(&sup));
    /// assert!(!ImmutableSortedBag::from_iter([1, 1]).is_subset(&sup));
    /// assert!(ImmutableSortedBag::empty().is_subset(&sup));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn is_subset(&self, other: &(impl SortedBag<T> + ?Sized)) -> bool {
        if self.size() > other.size() {
            return false;
        }
        let comparator = self.comparator();
        is_subset(comparator, self.as_entries(), &aligned(comparator, other))
    }

    /// Truth that `self` contains every element of `other`
    #[must_use = "Only effect is to produce a result"]
    pub fn is_superset(&self, other: &(impl SortedBag<T> + ?Sized)) -> bool {
        let comparator = self.comparator();
        is_subset(comparator, &aligned(comparator, other), self.as_entries())
    }

    /// Truth that `self` and `other` have no value in common
    #[must_use = "Only effect is to produce a result"]
    pub fn is_disjoint(&self, other: &(impl SortedBag<T> + ?Sized)) -> bool {
        let comparator = self.comparator();
        is_disjoint(comparator, self.as_entries(), &aligned(comparator, other))
    }
}

impl<T: Clone + Ord> Add<&ImmutableSortedBag<T>> for &ImmutableSortedBag<T> {
    type Output = ImmutableSortedBag<T>;

    /// Returns the sum of `self` and `rhs` as a new bag
    fn add(self, rhs: &ImmutableSortedBag<T>) -> Self::Output {
        self.sum(rhs)
    }
}

impl<T: Clone + Ord> BitAnd<&ImmutableSortedBag<T>> for &ImmutableSortedBag<T> {
    type Output = ImmutableSortedBag<T>;

    /// Returns the intersection of `self` and `rhs` as a new bag
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::ImmutableSortedBag;
    ///
    /// let a = ImmutableSortedBag::from_iter([1, 1, 2, 2, 3]);
    /// let b = ImmutableSortedBag::from_iter([2, 3, 4]);
    /// assert_eq!(&a & &b, ImmutableSortedBag::from_iter([2, 3]));
    /// ```
    fn bitand(self, rhs: &ImmutableSortedBag<T>) -> Self::Output {
        self.intersection(rhs)
    }
}

impl<T: Clone + Ord> BitOr<&ImmutableSortedBag<T>> for &ImmutableSortedBag<T> {
    type Output = ImmutableSortedBag<T>;

    /// Returns the union of `self` and `rhs` as a new bag
    fn bitor(self, rhs: &ImmutableSortedBag<T>) -> Self::Output {
        self.union(rhs)
    }
}

impl<T: Clone + Ord> BitXor<&ImmutableSortedBag<T>> for &ImmutableSortedBag<T> {
    type Output = ImmutableSortedBag<T>;

    /// Returns the symmetric difference of `self` and `rhs` as a new bag
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::ImmutableSortedBag;
    ///
    /// let a = ImmutableSortedBag::from_iter([1, 1, 2, 2, 3]);
    /// let b = ImmutableSortedBag::from_iter([2, 3, 4]);
    /// assert_eq!(&a ^ &b, ImmutableSortedBag::from_iter([1, 1, 2, 4]));
    /// ```
    fn bitxor(self, rhs: &ImmutableSortedBag<T>) -> Self::Output {
        self.symmetric_difference(rhs)
    }
}

impl<T: Clone + Ord> Sub<&ImmutableSortedBag<T>> for &ImmutableSortedBag<T> {
    type Output = ImmutableSortedBag<T>;

    /// Returns the difference of `self` and `rhs` as a new bag
    fn sub(self, rhs: &ImmutableSortedBag<T>) -> Self::Output {
        self.difference(rhs)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn counts(bag: &ImmutableSortedBag<i32>, value: &i32) -> usize {
        bag.occurrences_of(value)
    }

    fn check_any_bag_pair(bag1: &ImmutableSortedBag<i32>, bag2: &ImmutableSortedBag<i32>) {
        let values = || bag1.values().chain(bag2.values());

        let intersection = bag1 & bag2;
        for val in values() {
            assert_eq!(
                counts(&intersection, val),
                counts(bag1, val).min(counts(bag2, val))
            );
        }

        let union = bag1 | bag2;
        for val in values() {
            assert_eq!(counts(&union, val), counts(bag1, val).max(counts(bag2, val)));
        }
        assert_eq!(union.size_distinct(), values().collect::<std::collections::BTreeSet<_>>().len());

        let difference = bag1 - bag2;
        for val in values() {
            assert_eq!(
                counts(&difference, val),
                counts(bag1, val).saturating_sub(counts(bag2, val))
            );
        }

        let symmetric_difference = bag1 ^ bag2;
        for val in values() {
            assert_eq!(
                counts(&symmetric_difference, val),
                counts(bag1, val).abs_diff(counts(bag2, val))
            );
        }

        let sum = bag1 + bag2;
        assert_eq!(sum.size(), bag1.size() + bag2.size());
        for val in values() {
            assert_eq!(counts(&sum, val), counts(bag1, val) + counts(bag2, val));
        }
        assert_eq!(sum, bag1.new_with_all(bag2.iter().copied()));

        assert_eq!(bag1.is_disjoint(bag2), intersection.is_empty());
        assert_eq!(bag1.is_subset(bag2), difference.is_empty());
        assert_eq!(bag1.is_subset(bag2), bag2.is_superset(bag1));
        assert!(intersection.is_subset(bag1) && intersection.is_subset(bag2));
        assert!(union.is_superset(bag1) && union.is_superset(bag2));

        // Results do not depend on the ordering of the right-hand operand
        let reversed = ImmutableSortedBag::with_all(
            Some(Comparator::natural_reversed()),
            bag2.iter().copied(),
        );
        assert_eq!(bag1 & &reversed, intersection);
        assert_eq!(bag1 | &reversed, union);
        assert_eq!(bag1 - &reversed, difference);
        assert_eq!(bag1 ^ &reversed, symmetric_difference);
        assert!((bag1 ^ &reversed).iter().is_sorted());

        // ...but they use the ordering of the left-hand operand
        let reversed_union = &reversed | bag1;
        assert_eq!(reversed_union, union);
        assert!(reversed_union.iter().rev().is_sorted());
    }

    fn bag() -> impl Strategy<Value = ImmutableSortedBag<i32>> {
        any::<Vec<i32>>().prop_map(ImmutableSortedBag::from_iter)
    }

    /// Bags whose values are drawn from a small range, so that they often
    /// have values in common
    fn overlapping_bag() -> impl Strategy<Value = ImmutableSortedBag<i32>> {
        prop::collection::vec(0..8, 0..16).prop_map(ImmutableSortedBag::from_iter)
    }

    proptest! {
        #[test]
        fn any_bag_pair(bag1 in bag(), bag2 in bag()) {
            check_any_bag_pair(&bag1, &bag2);
        }

        #[test]
        fn overlapping_bag_pair(bag1 in overlapping_bag(), bag2 in overlapping_bag()) {
            check_any_bag_pair(&bag1, &bag2);
        }
    }

    #[test]
    fn known_results() {
        let a = ImmutableSortedBag::from_iter([1, 1, 2, 2, 3]);
        let b = ImmutableSortedBag::from_iter([2, 3, 4]);
        assert!((&a & &b).iter().eq(&[2, 3]));
        assert!((&a | &b).iter().eq(&[1, 1, 2, 2, 3, 4]));
        assert!((&a - &b).iter().eq(&[1, 1, 2]));
        assert!((&a ^ &b).iter().eq(&[1, 1, 2, 4]));
        assert!((&a + &b).iter().eq(&[1, 1, 2, 2, 2, 3, 3, 4]));
        assert!(!a.is_disjoint(&b));
        assert!(a.is_disjoint(&ImmutableSortedBag::from_iter([0, 5])));
        assert!((&b - &b).is_empty());
    }
}
