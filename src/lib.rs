//! Doubly linked skiplists with nearest-key queries.
//!
//! [`SkipList`] is an ordered map. Every key lookup, insert and removal is
//! O(log n) on average, and with the hash index (on by default) exact-key
//! lookups and in-place value replacement are O(1). Walking to the next or
//! previous entry, `first`, `last` and `remove_first` are O(1).
//!
//! [`SkipSet`] is the comparator-ordered flavor: it stores bare items, may hold
//! equal items side by side, and hands out [`NodeId`] handles that remove
//! exactly the node they point at.
//!
//! ```
//! use skiplist_lanes::SkipList;
//!
//! let mut sk = SkipList::new();
//! for key in &[4, 2, 10, 6, 8, 12, 18, 14, 16] {
//!     sk.insert(*key, key * 100);
//! }
//! assert_eq!(sk.first().map(|e| *e.key()), Some(2));
//! assert_eq!(sk.last().map(|e| *e.key()), Some(18));
//! assert_eq!(sk.search(&7).map(|e| *e.key()), Some(8));
//! assert_eq!(sk.before(&8).map(|e| *e.value()), Some(600));
//! ```
//!
//! Neither container synchronizes internally. Inserts mutate the level
//! generator, so sharing one across threads takes a lock.

mod config;
mod entry;
mod error;
mod iter;
mod level;
mod raw;
mod set;

pub use crate::config::{Config, Duplicates, DEFAULT_MAX_LEVEL, DEFAULT_PROBABILITY};
pub use crate::entry::{Element, Entry};
pub use crate::error::{ConfigError, Result};
pub use crate::iter::{Iter, Keys, Range, RangeHint, RangeWith, SetIter, Values};
pub use crate::raw::NodeId;
pub use crate::set::SkipSet;

use crate::iter::Items;
use crate::level::LevelSampler;
use crate::raw::{Insertion, Link, RawList};
use rustc_hash::FxHashMap;
use std::fmt;
use std::hash::Hash;
use tracing::debug;

/// An ordered map built on a skiplist.
///
/// Keys are unique by default: setting an existing key swaps its value and
/// leaves the node where it is, so [`Entry`] handles and the node's level
/// survive the update. With [`Duplicates::Allow`] (and the hash index off)
/// equal keys are kept in insertion order instead.
pub struct SkipList<K, V> {
    raw: RawList<(K, V)>,
    index: Option<FxHashMap<K, usize>>,
    duplicates: Duplicates,
}

impl<K: Ord + Hash + Clone, V> Default for SkipList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Hash + Clone, V> SkipList<K, V> {
    /// Make a new skiplist with 32 lanes, p = 0.5, a hash index and a
    /// clock-derived seed.
    pub fn new() -> Self {
        let config = Config::default();
        Self::build(&config)
    }

    /// Make a new skiplist from explicit options.
    ///
    /// ```
    /// use skiplist_lanes::{Config, ConfigError, SkipList};
    ///
    /// let bad = SkipList::<u8, u8>::with_config(Config::default().with_probability(2.0));
    /// assert_eq!(bad.err(), Some(ConfigError::InvalidProbability(2.0)));
    /// ```
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(&config))
    }

    fn build(config: &Config) -> Self {
        let seed = config.resolved_seed();
        debug!(
            max_level = config.max_level,
            probability = config.probability,
            seed,
            hash_index = config.hash_index,
            duplicates = ?config.duplicates,
            "new skiplist"
        );
        Self {
            raw: RawList::new(LevelSampler::new(
                seed,
                config.max_level,
                config.probability,
            )),
            index: if config.hash_index {
                Some(FxHashMap::default())
            } else {
                None
            },
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

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.raw.clear();
        if let Some(index) = self.index.as_mut() {
            index.clear();
        }
    }

    #[inline]
    fn entry(&self, link: Link) -> Option<Entry<'_, K, V>> {
        Entry::at(&self.raw, link)
    }

    /// The slot holding `key`, through the hash index when there is one.
    fn find(&self, key: &K) -> Link {
        match &self.index {
            Some(index) => index.get(key).copied(),
            None => self.raw.find(|(k, _)| k.cmp(key)),
        }
    }

    /// The slot holding `key` if the hash index knows it. `None` without an index.
    #[inline]
    fn fast_find(&self, key: &K) -> Link {
        self.index.as_ref().and_then(|index| index.get(key).copied())
    }

    /// Insert or replace, returning the node's slot and the replaced value.
    fn upsert(&mut self, key: K, value: V) -> (usize, Option<V>) {
        if let Some(found) = self.fast_find(&key) {
            let old = std::mem::replace(&mut self.raw.item_mut(found).1, value);
            return (found, Some(old));
        }
        match self
            .raw
            .insert((key, value), |(a, _), (b, _)| a.cmp(b), self.duplicates)
        {
            Insertion::Linked(slot) => {
                if let Some(index) = self.index.as_mut() {
                    index.insert(self.raw.item(slot).0.clone(), slot);
                }
                (slot, None)
            }
            Insertion::Existing(slot, (_, value)) => {
                let old = std::mem::replace(&mut self.raw.item_mut(slot).1, value);
                (slot, Some(old))
            }
        }
    }

    /// Insert a key/value pair, returning the value it replaced.
    ///
    /// O(1) when the hash index already holds the key, O(log n) otherwise.
    ///
    /// ```
    /// use skiplist_lanes::SkipList;
    ///
    /// let mut sk = SkipList::new();
    /// assert_eq!(sk.insert(1, "one"), None);
    /// assert_eq!(sk.insert(1, "uno"), Some("one"));
    /// assert_eq!(sk.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.upsert(key, value).1
    }

    /// Like [`insert`](Self::insert), but returns the entry now holding the pair.
    pub fn set(&mut self, key: K, value: V) -> Entry<'_, K, V> {
        let (slot, _) = self.upsert(key, value);
        Entry::new(&self.raw, slot)
    }

    /// The entry for `key`, if any. With duplicate keys, the oldest one.
    pub fn get(&self, key: &K) -> Option<Entry<'_, K, V>> {
        self.entry(self.find(key))
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let slot = self.find(key)?;
        Some(&mut self.raw.item_mut(slot).1)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Remove `key` and hand back the pair. With duplicate keys, removes the
    /// oldest one.
    ///
    /// ```
    /// use skiplist_lanes::SkipList;
    ///
    /// let mut sk: SkipList<_, _> = (0..3).map(|i| (i, i)).collect();
    /// assert_eq!(sk.remove(&1), Some((1, 1)));
    /// assert_eq!(sk.remove(&1), None);
    /// assert_eq!(sk.len(), 2);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        if let Some(index) = &self.index {
            if !index.contains_key(key) {
                return None;
            }
        }
        let removed = self.raw.remove(|(k, _)| k.cmp(key))?;
        if let Some(index) = self.index.as_mut() {
            index.remove(&removed.0);
        }
        Some(removed)
    }

    /// Remove the smallest key in O(1).
    pub fn remove_first(&mut self) -> Option<(K, V)> {
        let removed = self.raw.remove_first()?;
        if let Some(index) = self.index.as_mut() {
            index.remove(&removed.0);
        }
        Some(removed)
    }

    /// Remove the largest key.
    pub fn remove_last(&mut self) -> Option<(K, V)> {
        let last = self.raw.last()?;
        let removed = self.raw.remove_at(last, |(a, _), (b, _)| a.cmp(b));
        if let Some(index) = self.index.as_mut() {
            index.remove(&removed.0);
        }
        Some(removed)
    }

    #[inline]
    pub fn first(&self) -> Option<Entry<'_, K, V>> {
        self.entry(self.raw.first())
    }

    #[inline]
    pub fn last(&self) -> Option<Entry<'_, K, V>> {
        self.entry(self.raw.last())
    }

    /// The entry at `key` or the closest one after it. Same as
    /// [`at_or_after`](Self::at_or_after).
    #[inline]
    pub fn search(&self, key: &K) -> Option<Entry<'_, K, V>> {
        self.at_or_after(key)
    }

    /// The entry at `key`, or the one with the smallest larger key.
    ///
    /// ```
    /// use skiplist_lanes::SkipList;
    ///
    /// let sk: SkipList<_, _> = vec![(10, ()), (20, ())].into_iter().collect();
    /// assert_eq!(sk.at_or_after(&10).map(|e| *e.key()), Some(10));
    /// assert_eq!(sk.at_or_after(&11).map(|e| *e.key()), Some(20));
    /// assert!(sk.at_or_after(&21).is_none());
    /// ```
    pub fn at_or_after(&self, key: &K) -> Option<Entry<'_, K, V>> {
        if let Some(found) = self.fast_find(key) {
            return self.entry(Some(found));
        }
        self.entry(self.raw.ceiling(|(k, _)| k.cmp(key)))
    }

    /// The entry with the smallest key strictly greater than `key`.
    pub fn after(&self, key: &K) -> Option<Entry<'_, K, V>> {
        if let Some(found) = self.fast_find(key) {
            return self.entry(self.raw.next(found));
        }
        self.entry(self.raw.strict_ceiling(|(k, _)| k.cmp(key)))
    }

    /// The entry at `key`, or the one with the largest smaller key.
    pub fn at_or_before(&self, key: &K) -> Option<Entry<'_, K, V>> {
        if let Some(found) = self.fast_find(key) {
            return self.entry(Some(found));
        }
        self.entry(self.raw.floor(|(k, _)| k.cmp(key)))
    }

    /// The entry with the largest key strictly smaller than `key`.
    pub fn before(&self, key: &K) -> Option<Entry<'_, K, V>> {
        if let Some(found) = self.fast_find(key) {
            return self.entry(self.raw.prev(found));
        }
        self.entry(self.raw.strict_floor(|(k, _)| k.cmp(key)))
    }

    /// Iterate over all pairs in key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter(Items::new(&self.raw))
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(Items::new(&self.raw))
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values(Items::new(&self.raw))
    }

    /// Iterate over pairs with `start <= key <= end`.
    pub fn range<'a>(&'a self, start: &K, end: &'a K) -> Range<'a, K, V> {
        Range::new(&self.raw, self.raw.ceiling(|(k, _)| k.cmp(start)), end)
    }

    /// Iterate over the pairs `inclusive_fn` calls [`RangeHint::InRange`].
    ///
    /// The closure has to be consistent with key order: every key it calls
    /// smaller must sort before every key it calls in range, and so on.
    pub fn range_with<F>(&self, inclusive_fn: F) -> RangeWith<'_, K, V, F>
    where
        F: Fn(&K) -> RangeHint,
    {
        RangeWith::new(&self.raw, inclusive_fn)
    }

    #[cfg(test)]
    fn ensure_invariants(&self) {
        let strict = self.duplicates == Duplicates::Replace;
        self.raw.check_invariants(|(a, _), (b, _)| a.cmp(b), strict);
        if let Some(index) = &self.index {
            assert_eq!(index.len(), self.len(), "hash index size");
            for (key, &slot) in index {
                assert!(self.raw.item(slot).0 == *key, "hash index points at the wrong node");
            }
        }
    }
}

impl<K: Ord + Hash + Clone, V> Extend<(K, V)> for SkipList<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord + Hash + Clone, V> FromIterator<(K, V)> for SkipList<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut sk = SkipList::new();
        sk.extend(iter);
        sk
    }
}

impl<'a, K: Ord + Hash + Clone, V> IntoIterator for &'a SkipList<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord + Hash + Clone, V: PartialEq> PartialEq for SkipList<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: fmt::Debug, V> fmt::Debug for SkipList<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "SkipList(len: {}, max_level: {}, p: {}), and lanes:",
            self.raw.len(),
            self.raw.max_level(),
            self.raw.probability()
        )?;
        self.raw.fmt_lanes::<K, _>(f, |(k, _)| k)
    }
}
