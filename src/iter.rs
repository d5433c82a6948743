use crate::raw::{Link, RawList};
use std::cmp::Ordering;
use std::iter::FusedIterator;

/// Walks lane 0 from both ends at once.
pub(crate) struct Items<'a, T> {
    raw: &'a RawList<T>,
    front: Link,
    back: Link,
    remaining: usize,
}

impl<'a, T> Items<'a, T> {
    pub(crate) fn new(raw: &'a RawList<T>) -> Self {
        Self {
            raw,
            front: raw.first(),
            back: raw.last(),
            remaining: raw.len(),
        }
    }
}

impl<T> Clone for Items<'_, T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, T> Iterator for Items<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.front?;
        self.front = self.raw.next(index);
        self.remaining -= 1;
        Some(self.raw.item(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Items<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.back?;
        self.back = self.raw.prev(index);
        self.remaining -= 1;
        Some(self.raw.item(index))
    }
}

/// In-order iterator over the pairs of a [`SkipList`](crate::SkipList).
/// Runs from either end.
pub struct Iter<'a, K, V>(pub(crate) Items<'a, (K, V)>);

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter(self.0.clone())
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (k, v))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

pub struct Keys<'a, K, V>(pub(crate) Items<'a, (K, V)>);

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys(self.0.clone())
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, _)| k)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

pub struct Values<'a, K, V>(pub(crate) Items<'a, (K, V)>);

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values(self.0.clone())
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

/// In-order iterator over the items of a [`SkipSet`](crate::SkipSet).
pub struct SetIter<'a, T>(pub(crate) Items<'a, T>);

impl<T> Clone for SetIter<'_, T> {
    fn clone(&self) -> Self {
        SetIter(self.0.clone())
    }
}

impl<'a, T> Iterator for SetIter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<T> DoubleEndedIterator for SetIter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back()
    }
}

impl<T> ExactSizeIterator for SetIter<'_, T> {}
impl<T> FusedIterator for SetIter<'_, T> {}

/// Pairs with keys in `start..=end`, see [`SkipList::range`](crate::SkipList::range).
pub struct Range<'a, K, V> {
    raw: &'a RawList<(K, V)>,
    cursor: Link,
    end: &'a K,
}

impl<'a, K, V> Range<'a, K, V> {
    pub(crate) fn new(raw: &'a RawList<(K, V)>, cursor: Link, end: &'a K) -> Self {
        Self { raw, cursor, end }
    }
}

impl<'a, K: Ord, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let (k, v) = self.raw.item(index);
        if k > self.end {
            self.cursor = None;
            return None;
        }
        self.cursor = self.raw.next(index);
        Some((k, v))
    }
}

/// Hint that the current value `item` is:
/// - Smaller (outside) than the desired
/// - Inside the desired range
/// - Larger (outside) the desired range
///
/// Used with RangeWith, or `range_with`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeHint {
    SmallerThanRange,
    InRange,
    LargerThanRange,
}

impl RangeHint {
    /// Where the item sits relative to the range, as an ordering.
    #[inline]
    pub(crate) fn ordering(self) -> Ordering {
        match self {
            RangeHint::SmallerThanRange => Ordering::Less,
            RangeHint::InRange => Ordering::Equal,
            RangeHint::LargerThanRange => Ordering::Greater,
        }
    }
}

/// Pairs whose keys the closure places [`RangeHint::InRange`].
pub struct RangeWith<'a, K, V, F>
where
    F: Fn(&K) -> RangeHint,
{
    raw: &'a RawList<(K, V)>,
    cursor: Link,
    inclusive_fn: F,
}

impl<'a, K, V, F> RangeWith<'a, K, V, F>
where
    F: Fn(&K) -> RangeHint,
{
    pub(crate) fn new(raw: &'a RawList<(K, V)>, inclusive_fn: F) -> Self {
        let cursor = raw.ceiling(|(k, _)| inclusive_fn(k).ordering());
        Self {
            raw,
            cursor,
            inclusive_fn,
        }
    }
}

impl<'a, K, V, F> Iterator for RangeWith<'a, K, V, F>
where
    F: Fn(&K) -> RangeHint,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let (k, v) = self.raw.item(index);
        if let RangeHint::LargerThanRange = (self.inclusive_fn)(k) {
            self.cursor = None;
            return None;
        }
        self.cursor = self.raw.next(index);
        Some((k, v))
    }
}
