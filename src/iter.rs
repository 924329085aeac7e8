//! Iterators over the contents of sorted bags

use std::{iter::FusedIterator, num::NonZeroUsize};

/// An iterator over the elements of a sorted bag, in comparator order
///
/// Values with a multiplicity of N are yielded N times in a row. Every call to
/// [`iter()`](crate::SortedBag::iter) starts a new traversal from the first
/// element, so independent traversals never interfere with each other.
#[derive(Debug)]
pub struct Iter<'a, T> {
    /// Entries of the bag being iterated over
    entries: &'a [(T, NonZeroUsize)],

    /// Index of the entry that the front cursor points to, and number of
    /// occurences of that entry which were already yielded from the front
    head: usize,
    head_taken: usize,

    /// One past the index of the entry that the back cursor points to, and
    /// number of occurences of that entry which were already yielded from the
    /// back
    tail: usize,
    tail_taken: usize,

    /// Number of elements that remain to be yielded
    remaining: usize,
}
//
impl<'a, T> Iter<'a, T> {
    /// Iterate over `entries`, which collectively hold `len` elements
    pub(crate) fn new(entries: &'a [(T, NonZeroUsize)], len: usize) -> Self {
        debug_assert_eq!(
            entries.iter().map(|(_, count)| count.get()).sum::<usize>(),
            len
        );
        Self {
            entries,
            head: 0,
            head_taken: 0,
            tail: entries.len(),
            tail_taken: 0,
            remaining: len,
        }
    }
}
//
impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}
//
impl<T> DoubleEndedIterator for Iter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        // When both cursors meet on a single entry, `remaining` is what keeps
        // them from yielding more occurences than the entry has.
        let entries = self.entries;
        let (value, count) = &entries[self.tail - 1];
        self.tail_taken += 1;
        if self.tail_taken == count.get() {
            self.tail -= 1;
            self.tail_taken = 0;
        }
        self.remaining -= 1;
        Some(value)
    }
}
//
impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}
//
impl<T> FusedIterator for Iter<'_, T> {}
//
impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entries = self.entries;
        let (value, count) = &entries[self.head];
        self.head_taken += 1;
        if self.head_taken == count.get() {
            self.head += 1;
            self.head_taken = 0;
        }
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    fn count(self) -> usize
    where
        Self: Sized,
    {
        self.remaining
    }
}

/// An iterator over the distinct values of a sorted bag along with their
/// multiplicities, in comparator order
///
/// This `struct` is created by the [`entries()`](crate::SortedBag::entries)
/// method of sorted bags.
#[derive(Debug)]
pub struct Entries<'a, T>(std::slice::Iter<'a, (T, NonZeroUsize)>);
//
impl<'a, T> Entries<'a, T> {
    pub(crate) fn new(entries: &'a [(T, NonZeroUsize)]) -> Self {
        Self(entries.iter())
    }
}
//
impl<T> Clone for Entries<'_, T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
//
impl<T> DoubleEndedIterator for Entries<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(value, count)| (value, *count))
    }
}
//
impl<T> ExactSizeIterator for Entries<'_, T> {
    fn len(&self) -> usize {
        self.0.len()
    }
}
//
impl<T> FusedIterator for Entries<'_, T> {}
//
impl<'a, T> Iterator for Entries<'a, T> {
    type Item = (&'a T, NonZeroUsize);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(value, count)| (value, *count))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.0.nth(n).map(|(value, count)| (value, *count))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn entries(raw: &[(i32, usize)]) -> Vec<(i32, NonZeroUsize)> {
        raw.iter()
            .map(|&(value, count)| (value, NonZeroUsize::new(count).unwrap()))
            .collect()
    }

    #[test]
    fn forward_and_backward() {
        let entries = entries(&[(1, 2), (2, 1), (3, 3)]);
        let iter = Iter::new(&entries, 6);
        assert_eq!(iter.len(), 6);
        assert_eq!(iter.clone().copied().collect::<Vec<_>>(), [1, 1, 2, 3, 3, 3]);
        assert_eq!(iter.rev().copied().collect::<Vec<_>>(), [3, 3, 3, 2, 1, 1]);
    }

    #[test]
    fn cursors_meet_inside_an_entry() {
        let entries = entries(&[(7, 4)]);
        let mut iter = Iter::new(&entries, 4);
        assert_eq!(iter.next(), Some(&7));
        assert_eq!(iter.next_back(), Some(&7));
        assert_eq!(iter.next(), Some(&7));
        assert_eq!(iter.len(), 1);
        assert_eq!(iter.next_back(), Some(&7));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn empty() {
        let mut iter = Iter::<i32>::new(&[], 0);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
        assert_eq!(Entries::<i32>::new(&[]).count(), 0);
    }
}
