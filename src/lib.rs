//! Immutable sorted multisets with pluggable orderings.
//!
//! This crate implements a kind of multiset, also known as a bag, which is a
//! generalization of the notion of mathematical set where multiple elements
//! that are equal to each other can be present simultaneously. Our bags differ
//! from the usual collections in the following respects:
//!
//! - They are immutable. Every operation that would modify a mutable
//!   collection, from adding an element to filtering or grouping, instead
//!   produces a new [`ImmutableSortedBag`]. Bags share their storage with
//!   their clones, so handing them around is cheap.
//! - They are sorted by a runtime [`Comparator`], or by the natural [`Ord`]
//!   ordering of the element type when no comparator is specified. The
//!   ordering of a bag is carried over to every bag, set, map and multimap
//!   derived from it.
//! - Values that compare equal are stored once, along with their number of
//!   occurences. This means that when a comparator considers two distinct
//!   values as equal, only the first one of them is kept.
//!
//! The observable behavior of bags is defined by the [`SortedBag`] trait,
//! which is implemented by the two bag representations, [`EmptySortedBag`]
//! and [`SortedArrayBag`], and by the [`ImmutableSortedBag`] enum that
//! switches between them. Empty bags answer every query in constant time
//! without touching any storage, and all operations that leave no element
//! behind produce one.
//!
//! # Examples
//!
//! ```
//! use immutable_sorted_bag::{Comparator, ImmutableSortedBag, SortedBag};
//!
//! let bag = ImmutableSortedBag::with_all(
//!     Some(Comparator::natural_reversed()),
//!     [1, 3, 2, 3],
//! );
//! assert!(bag.iter().eq(&[3, 3, 2, 1]));
//!
//! // Transformations produce new bags with the same ordering...
//! let odd = bag.select(|x| x % 2 == 1);
//! assert!(odd.iter().eq(&[3, 3, 1]));
//!
//! // ...and leave the original bag untouched
//! assert_eq!(bag.size(), 4);
//!
//! // Filtering everything out yields an empty bag
//! assert!(bag.select(|&x| x > 3).is_empty());
//! ```
//!
//! Operations that can fail, like asking for the minimum of an empty bag,
//! report an [`Error`]:
//!
//! ```
//! use immutable_sorted_bag::{Error, ErrorKind, ImmutableSortedBag, SortedBag};
//!
//! let empty = ImmutableSortedBag::<i32>::empty();
//! assert_eq!(empty.min(), Err(Error::EmptyCollection));
//! assert_eq!(empty.chunk(0).unwrap_err().kind(), ErrorKind::InvalidArgument);
//! ```

mod algebra;
mod array;
mod bag;
mod comparator;
mod empty;
mod error;
mod iter;
mod multimap;
mod partition;
mod sorted_bag;
mod sorted_map;
mod sorted_set;

pub use crate::{
    array::SortedArrayBag,
    bag::ImmutableSortedBag,
    comparator::Comparator,
    empty::EmptySortedBag,
    error::{Error, ErrorKind, Result},
    iter::{Entries, Iter},
    multimap::SortedBagMultimap,
    partition::PartitionSortedBag,
    sorted_bag::SortedBag,
    sorted_map::SortedMap,
    sorted_set::ImmutableSortedSet,
};
