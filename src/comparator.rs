//! Runtime orderings that sorted collections can be built with

use std::{cmp::Ordering, fmt, sync::Arc};

/// A shareable total ordering over values of type `T`
///
/// Sorted collections which are built without a comparator use the natural
/// ordering of `T`, as defined by its [`Ord`] implementation. A `Comparator`
/// replaces that ordering for the whole lifetime of the collection and of
/// every collection derived from it.
///
/// Cloning a comparator is cheap, and all clones are considered to be the
/// same ordering by [`ptr_eq()`](Self::ptr_eq). As with [`Ord`], it is a logic
/// error for a comparator not to be a total order, or to disagree with the
/// [`Eq`] implementation of `T` when that is used.
///
/// # Examples
///
/// ```
/// use immutable_sorted_bag::Comparator;
/// use std::cmp::Ordering;
///
/// let by_len = Comparator::by_key(|s: &&str| s.len());
/// assert_eq!(by_len.compare(&"ab", &"c"), Ordering::Greater);
/// assert_eq!(by_len.reversed().compare(&"ab", &"c"), Ordering::Less);
/// ```
pub struct Comparator<T: ?Sized>(Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>);
//
impl<T: ?Sized + 'static> Comparator<T> {
    /// Wrap an ordering function
    pub fn new(compare: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Self {
        Self(Arc::new(compare))
    }

    /// Order values by comparing a key derived from them
    pub fn by_key<K: Ord + 'static>(key: impl Fn(&T) -> K + Send + Sync + 'static) -> Self {
        Self::new(move |a, b| key(a).cmp(&key(b)))
    }

    /// Comparator that orders values the other way around
    #[must_use = "Only effect is to produce a result"]
    pub fn reversed(&self) -> Self {
        let inner = self.clone();
        Self::new(move |a, b| inner.compare(b, a))
    }
}
//
impl<T: ?Sized> Comparator<T> {
    /// Compare two values
    #[inline]
    #[must_use = "Only effect is to produce a result"]
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.0)(a, b)
    }

    /// Truth that `self` and `other` are clones of the same comparator
    #[must_use = "Only effect is to produce a result"]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
//
impl<T: Ord + ?Sized + 'static> Comparator<T> {
    /// Comparator implementing the reverse of the natural ordering
    #[must_use = "Only effect is to produce a result"]
    pub fn natural_reversed() -> Self {
        Self::new(|a: &T, b: &T| b.cmp(a))
    }
}

impl<T: ?Sized> Clone for Comparator<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: ?Sized> fmt::Debug for Comparator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Comparator({:p})", Arc::as_ptr(&self.0).cast::<()>())
    }
}

/// Compare two values under an optional comparator, falling back to the
/// natural ordering of `T`
#[inline]
pub(crate) fn compare<T: Ord>(comparator: Option<&Comparator<T>>, a: &T, b: &T) -> Ordering {
    match comparator {
        Some(comparator) => comparator.compare(a, b),
        None => a.cmp(b),
    }
}

/// Truth that two optional comparators are known to define the same ordering
pub(crate) fn same_ordering<T>(a: Option<&Comparator<T>>, b: Option<&Comparator<T>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.ptr_eq(b),
        (Some(_), None) | (None, Some(_)) => false,
    }
}

/// Lift an element ordering to `(element, index)` pairs, breaking ties by
/// index
pub(crate) fn indexed<T: Ord + 'static>(
    comparator: Option<&Comparator<T>>,
) -> Option<Comparator<(T, usize)>> {
    comparator.cloned().map(|comparator| {
        Comparator::new(move |a: &(T, usize), b: &(T, usize)| {
            comparator.compare(&a.0, &b.0).then(a.1.cmp(&b.1))
        })
    })
}
