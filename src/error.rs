//! Error type shared by all fallible sorted bag operations

/// Errors reported by sorted bag operations
///
/// All of these indicate a programming error on the caller's side: sorted bag
/// operations are pure computations, so retrying with the same inputs will
/// always fail in the same way.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("size for groups must be positive but was: {0}")]
    ChunkSize(usize),

    #[error("index range {start}..{end} is out of bounds for a bag of size {len}")]
    IndexRange {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("operation requires a non-empty collection")]
    EmptyCollection,

    #[error("expected an element, got no value")]
    NullValue,

    #[error("two distinct values were mapped to the same unique key")]
    DuplicateKey,
}
//
impl Error {
    /// Broad category of this error
    ///
    /// # Examples
    ///
    /// ```
    /// use immutable_sorted_bag::{ErrorKind, ImmutableSortedBag, SortedBag};
    ///
    /// let bag = ImmutableSortedBag::<i32>::empty();
    /// let err = bag.chunk(0).unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ChunkSize(_) | Self::IndexRange { .. } => ErrorKind::InvalidArgument,
            Self::EmptyCollection => ErrorKind::EmptyCollection,
            Self::NullValue => ErrorKind::NullValue,
            Self::DuplicateKey => ErrorKind::DuplicateKey,
        }
    }
}

/// Category of an [`Error`]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A parameter was outside of its domain (index range, group size...)
    InvalidArgument,

    /// The operation needs at least one element
    EmptyCollection,

    /// No value was provided where an element is required
    NullValue,

    /// A key that must be unique was produced twice
    DuplicateKey,
}

/// Result type of fallible sorted bag operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Check that `range` is a valid half-open index range for a collection of
/// `len` elements
pub(crate) fn check_range(range: &std::ops::Range<usize>, len: usize) -> Result<()> {
    if range.start > range.end || range.end > len {
        return Err(Error::IndexRange {
            start: range.start,
            end: range.end,
            len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn ranges() {
        assert_eq!(check_range(&(0..0), 0), Ok(()));
        assert_eq!(check_range(&(1..3), 3), Ok(()));
        assert_matches!(
            check_range(&(0..1), 0),
            Err(Error::IndexRange {
                start: 0,
                end: 1,
                len: 0
            })
        );
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = 2..1;
        let err = check_range(&reversed, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn kinds() {
        assert_eq!(Error::ChunkSize(0).kind(), ErrorKind::InvalidArgument);
        assert_eq!(Error::EmptyCollection.kind(), ErrorKind::EmptyCollection);
        assert_eq!(Error::NullValue.kind(), ErrorKind::NullValue);
        assert_eq!(Error::DuplicateKey.kind(), ErrorKind::DuplicateKey);
        assert_eq!(
            Error::ChunkSize(0).to_string(),
            "size for groups must be positive but was: 0"
        );
    }
}
