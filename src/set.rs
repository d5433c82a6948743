use crate::config::{Config, Duplicates};
use crate::entry::Element;
use crate::error::{ConfigError, Result};
use crate::iter::{Items, SetIter};
use crate::level::LevelSampler;
use crate::raw::{Insertion, NodeId, RawList};
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, trace};

/// A sorted multiset ordered by a comparator.
///
/// By default equal items are all kept, in insertion order, and every
/// [`add`](SkipSet::add) returns a [`NodeId`] that later removes exactly that
/// node, whatever else compares equal to it.
///
/// ```
/// use skiplist_lanes::SkipSet;
///
/// let mut set = SkipSet::new();
/// let a = set.add(5);
/// let b = set.add(5);
/// set.add(1);
/// assert_eq!(set.len(), 3);
/// assert_eq!(b.remove_from(&mut set), Some(5));
/// assert_eq!(b.remove_from(&mut set), None);
/// assert_eq!(set.get(a), Some(&5));
/// ```
pub struct SkipSet<T, F = fn(&T, &T) -> Ordering> {
    raw: RawList<T>,
    compare: F,
    duplicates: Duplicates,
}

impl<T: Ord> SkipSet<T> {
    /// Make a new multiset ordered by `Ord`, seeded from the clock.
    pub fn new() -> Self {
        Self::with_comparator(T::cmp)
    }
}

impl<T: Ord> Default for SkipSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, F> SkipSet<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    /// Make a new multiset ordered by `compare`.
    ///
    /// `compare` must be a total order and must not change while the set is
    /// alive. A misbehaving comparator scrambles the order and makes lookups
    /// miss, but removals still leave every link valid.
    pub fn with_comparator(compare: F) -> Self {
        Self::build(&Config::multiset(), compare)
    }

    /// Make a new set from explicit options.
    ///
    /// [`Duplicates::Replace`] collapses equal items into one node, keeping the
    /// most recently added item. Sets have no key to hash, so asking for a
    /// hash index is an error.
    pub fn with_config(config: Config, compare: F) -> Result<Self> {
        if config.hash_index {
            return Err(ConfigError::HashIndexWithoutKey);
        }
        config.validate()?;
        Ok(Self::build(&config, compare))
    }

    fn build(config: &Config, compare: F) -> Self {
        let seed = config.resolved_seed();
        debug!(
            max_level = config.max_level,
            probability = config.probability,
            seed,
            duplicates = ?config.duplicates,
            "new skipset"
        );
        Self {
            raw: RawList::new(LevelSampler::new(
                seed,
                config.max_level,
                config.probability,
            )),
            compare,
            duplicates: config.duplicates,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Remove every item. Outstanding handles go stale.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Add an item and return its handle.
    ///
    /// Under [`Duplicates::Replace`] an equal item is overwritten in place and
    /// its existing handle is returned.
    pub fn add(&mut self, item: T) -> NodeId {
        let compare = &self.compare;
        let slot = match self.raw.insert(item, compare, self.duplicates) {
            Insertion::Linked(slot) => slot,
            Insertion::Existing(slot, item) => {
                *self.raw.item_mut(slot) = item;
                slot
            }
        };
        self.raw.id(slot)
    }

    /// The item behind a handle, if it's still in this set.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.raw.resolve(id).map(|slot| self.raw.item(slot))
    }

    /// The element behind a handle, for walking to its neighbours.
    pub fn element(&self, id: NodeId) -> Option<Element<'_, T>> {
        Element::at(&self.raw, self.raw.resolve(id))
    }

    pub fn contains(&self, item: &T) -> bool {
        let compare = &self.compare;
        self.raw.find(|other| compare(other, item)).is_some()
    }

    /// Remove the first item comparing equal to `item`.
    pub fn remove(&mut self, item: &T) -> Option<T> {
        let compare = &self.compare;
        self.raw.remove(|other| compare(other, item))
    }

    /// Remove the smallest item in O(1).
    pub fn remove_first(&mut self) -> Option<T> {
        self.raw.remove_first()
    }

    /// Remove exactly the node behind `id`, or nothing if it's already gone or
    /// was issued by another set.
    ///
    /// O(1) for the first node, otherwise O(log n) plus the number of equal
    /// items ahead of it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<T> {
        let slot = match self.raw.resolve(id) {
            Some(slot) => slot,
            None => {
                trace!(index = id.index, "stale skipset handle");
                return None;
            }
        };
        Some(self.raw.remove_at(slot, &self.compare))
    }

    #[inline]
    pub fn first(&self) -> Option<Element<'_, T>> {
        Element::at(&self.raw, self.raw.first())
    }

    #[inline]
    pub fn last(&self) -> Option<Element<'_, T>> {
        Element::at(&self.raw, self.raw.last())
    }

    /// The first item not ordered before `item`.
    pub fn at_or_after(&self, item: &T) -> Option<Element<'_, T>> {
        let compare = &self.compare;
        Element::at(&self.raw, self.raw.ceiling(|other| compare(other, item)))
    }

    /// The first item ordered after `item`.
    pub fn after(&self, item: &T) -> Option<Element<'_, T>> {
        let compare = &self.compare;
        Element::at(
            &self.raw,
            self.raw.strict_ceiling(|other| compare(other, item)),
        )
    }

    /// The last item not ordered after `item`.
    pub fn at_or_before(&self, item: &T) -> Option<Element<'_, T>> {
        let compare = &self.compare;
        Element::at(&self.raw, self.raw.floor(|other| compare(other, item)))
    }

    /// The last item ordered before `item`.
    pub fn before(&self, item: &T) -> Option<Element<'_, T>> {
        let compare = &self.compare;
        Element::at(&self.raw, self.raw.strict_floor(|other| compare(other, item)))
    }

    pub fn iter(&self) -> SetIter<'_, T> {
        SetIter(Items::new(&self.raw))
    }

    #[cfg(test)]
    fn ensure_invariants(&self) {
        let strict = self.duplicates == Duplicates::Replace;
        self.raw.check_invariants(&self.compare, strict);
    }
}

impl NodeId {
    /// Remove this node from `set`, see [`SkipSet::remove_node`].
    pub fn remove_from<T, F>(self, set: &mut SkipSet<T, F>) -> Option<T>
    where
        F: Fn(&T, &T) -> Ordering,
    {
        set.remove_node(self)
    }
}

impl<T, F> Extend<T> for SkipSet<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

impl<T: Ord> FromIterator<T> for SkipSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = SkipSet::new();
        set.extend(iter);
        set
    }
}

impl<'a, T, F> IntoIterator for &'a SkipSet<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    type Item = &'a T;
    type IntoIter = SetIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug, F> fmt::Debug for SkipSet<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "SkipSet(len: {}, max_level: {}, p: {}), and lanes:",
            self.raw.len(),
            self.raw.max_level(),
            self.raw.probability()
        )?;
        self.raw.fmt_lanes::<T, _>(f, |item| item)
    }
}
