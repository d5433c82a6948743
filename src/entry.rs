use crate::raw::{NodeId, RawList};
use std::fmt;

/// A key/value pair in a [`SkipList`](crate::SkipList), with O(1) access to
/// its neighbours.
///
/// ```
/// use skiplist_lanes::SkipList;
///
/// let sk: SkipList<u32, char> = vec![(1, 'a'), (2, 'b'), (3, 'c')].into_iter().collect();
/// let two = sk.get(&2).unwrap();
/// assert_eq!(two.next().map(|e| *e.value()), Some('c'));
/// assert_eq!(two.prev().map(|e| *e.key()), Some(1));
/// ```
pub struct Entry<'a, K, V> {
    raw: &'a RawList<(K, V)>,
    index: usize,
}

impl<'a, K, V> Entry<'a, K, V> {
    #[inline]
    pub(crate) fn new(raw: &'a RawList<(K, V)>, index: usize) -> Self {
        Self { raw, index }
    }

    #[inline]
    pub(crate) fn at(raw: &'a RawList<(K, V)>, link: Option<usize>) -> Option<Self> {
        link.map(|index| Self::new(raw, index))
    }

    #[inline]
    pub fn key(&self) -> &'a K {
        &self.raw.item(self.index).0
    }

    #[inline]
    pub fn value(&self) -> &'a V {
        &self.raw.item(self.index).1
    }

    /// The entry with the next larger key.
    #[inline]
    pub fn next(&self) -> Option<Self> {
        Self::at(self.raw, self.raw.next(self.index))
    }

    /// The entry with the next smaller key.
    #[inline]
    pub fn prev(&self) -> Option<Self> {
        Self::at(self.raw, self.raw.prev(self.index))
    }
}

impl<K, V> Clone for Entry<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Entry<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", self.key())
            .field("value", self.value())
            .finish()
    }
}

/// An item in a [`SkipSet`](crate::SkipSet).
pub struct Element<'a, T> {
    raw: &'a RawList<T>,
    index: usize,
}

impl<'a, T> Element<'a, T> {
    #[inline]
    pub(crate) fn at(raw: &'a RawList<T>, link: Option<usize>) -> Option<Self> {
        link.map(|index| Self { raw, index })
    }

    #[inline]
    pub fn value(&self) -> &'a T {
        self.raw.item(self.index)
    }

    /// Handle for removing this element later, see [`NodeId::remove_from`].
    #[inline]
    pub fn id(&self) -> NodeId {
        self.raw.id(self.index)
    }

    #[inline]
    pub fn next(&self) -> Option<Self> {
        Self::at(self.raw, self.raw.next(self.index))
    }

    #[inline]
    pub fn prev(&self) -> Option<Self> {
        Self::at(self.raw, self.raw.prev(self.index))
    }
}

impl<T> Clone for Element<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Element<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Element<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Element").field(self.value()).finish()
    }
}
