use core::cmp::PartialOrd;
use core::ops::Deref;

/// A pair of elements sorted in increasing order.
///
/// Used as the key of unordered pairs: proxy pairs reported by the broad-phase
/// and fixture pairs indexing the contact graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SortedPair<T: PartialOrd>((T, T));

impl<T: PartialOrd> SortedPair<T> {
    /// Sorts two elements in increasing order into a new pair.
    pub fn new(element1: T, element2: T) -> Self {
        if element1 > element2 {
            SortedPair((element2, element1))
        } else {
            SortedPair((element1, element2))
        }
    }

    /// Consumes this pair, returning the smallest and the largest element, in that order.
    pub fn into_inner(self) -> (T, T) {
        self.0
    }
}

impl<T: PartialOrd> Deref for SortedPair<T> {
    type Target = (T, T);

    fn deref(&self) -> &(T, T) {
        &self.0
    }
}
