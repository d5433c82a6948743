//! The skiplist engine shared by [`SkipList`](crate::SkipList) and
//! [`SkipSet`](crate::SkipSet).
//!
//! Nodes live in a slot arena and link to each other by slot index:
//!
//! ```text
//! lane 2: head ------------------------> [10] ------------------------> ∅
//! lane 1: head --------> [4] ----------> [10] --------> [14] ---------> ∅
//! lane 0: head -> [2] -> [4] -> [6] -> [8] -> [10] -> [12] -> [14] -> ∅
//!         ∅    <- [2] <- [4] <- [6] <- [8] <- [10] <- [12] <- [14] <- last
//! ```
//!
//! Lane 0 plus the backward links form a doubly linked list of every node.
//! Ordering is supplied per call as a closure, so the engine never needs to
//! know whether it's holding key/value pairs or bare items.

use crate::config::Duplicates;
use crate::level::LevelSampler;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::sync::atomic::{self, AtomicU64};
use tracing::trace;

static NEXT_LIST_ID: AtomicU64 = AtomicU64::new(0);

/// A forward or backward reference. `None` is the header going forward and
/// "no predecessor" going backward.
pub(crate) type Link = Option<usize>;

type Lanes = SmallVec<[Link; 4]>;

/// Per-lane predecessors found by a descent. `path[level]` is the last node
/// visited on that lane, or `None` for the header.
pub(crate) type Path = SmallVec<[Link; 32]>;

/// Stable handle to a node.
///
/// Handles stay valid while the node is in its list. Once the node is removed,
/// the handle is stale and every lookup through it returns `None`, even after
/// its slot is reused. A handle never resolves in any list other than the one
/// that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) list: u64,
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

struct Node<T> {
    item: T,
    lanes: Lanes,
    prev: Link,
}

struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

/// Result of an insertion attempt.
pub(crate) enum Insertion<T> {
    /// A new node was linked at this slot.
    Linked(usize),
    /// An equal node already exists and the policy is [`Duplicates::Replace`].
    /// The rejected item is handed back for the caller to merge.
    Existing(usize, T),
}

pub(crate) struct RawList<T> {
    id: u64,
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    header: Vec<Link>,
    last: Link,
    len: usize,
    sampler: LevelSampler,
}

impl<T> RawList<T> {
    pub(crate) fn new(sampler: LevelSampler) -> Self {
        Self {
            id: NEXT_LIST_ID.fetch_add(1, atomic::Ordering::Relaxed),
            slots: Vec::new(),
            free: Vec::new(),
            header: vec![None; sampler.max_level()],
            last: None,
            len: 0,
            sampler,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn max_level(&self) -> usize {
        self.header.len()
    }

    #[inline]
    pub(crate) fn probability(&self) -> f64 {
        self.sampler.probability()
    }

    #[inline]
    fn node(&self, index: usize) -> &Node<T> {
        self.slots[index]
            .node
            .as_ref()
            .expect("link points at a vacant slot")
    }

    #[inline]
    fn node_mut(&mut self, index: usize) -> &mut Node<T> {
        self.slots[index]
            .node
            .as_mut()
            .expect("link points at a vacant slot")
    }

    #[inline]
    pub(crate) fn item(&self, index: usize) -> &T {
        &self.node(index).item
    }

    #[inline]
    pub(crate) fn item_mut(&mut self, index: usize) -> &mut T {
        &mut self.node_mut(index).item
    }

    #[inline]
    pub(crate) fn first(&self) -> Link {
        self.header[0]
    }

    #[inline]
    pub(crate) fn last(&self) -> Link {
        self.last
    }

    #[inline]
    pub(crate) fn next(&self, index: usize) -> Link {
        self.node(index).lanes[0]
    }

    #[inline]
    pub(crate) fn prev(&self, index: usize) -> Link {
        self.node(index).prev
    }

    /// Number of lanes the node occupies. Fixed for the node's lifetime.
    #[inline]
    pub(crate) fn level(&self, index: usize) -> usize {
        self.node(index).lanes.len()
    }

    pub(crate) fn id(&self, index: usize) -> NodeId {
        NodeId {
            list: self.id,
            index,
            generation: self.slots[index].generation,
        }
    }

    /// Maps a handle back to its slot if the node is still in the list.
    pub(crate) fn resolve(&self, id: NodeId) -> Option<usize> {
        if id.list != self.id {
            return None;
        }
        let slot = self.slots.get(id.index)?;
        if slot.generation == id.generation && slot.node.is_some() {
            Some(id.index)
        } else {
            None
        }
    }

    #[inline]
    fn forward(&self, cursor: Link, level: usize) -> Link {
        match cursor {
            None => self.header[level],
            Some(index) => self.node(index).lanes[level],
        }
    }

    #[inline]
    fn set_forward(&mut self, cursor: Link, level: usize, to: Link) {
        match cursor {
            None => self.header[level] = to,
            Some(index) => self.node_mut(index).lanes[level] = to,
        }
    }

    /// Lane-0 successor of a position, where `None` is the header.
    #[inline]
    pub(crate) fn successor(&self, cursor: Link) -> Link {
        self.forward(cursor, 0)
    }

    fn empty_path(&self) -> Path {
        SmallVec::from_elem(None, self.max_level())
    }

    /// Level-descending search. Starting at the header on the top lane, moves
    /// right while `advance` holds for the next node, drops a lane when it
    /// doesn't, and returns the rightmost node reached on lane 0.
    ///
    /// `advance` must hold for a prefix of the list and fail for the rest.
    fn descend<P>(&self, mut advance: P, mut path: Option<&mut Path>) -> Link
    where
        P: FnMut(&T) -> bool,
    {
        let mut cursor: Link = None;
        for level in (0..self.max_level()).rev() {
            while let Some(next) = self.forward(cursor, level) {
                if !advance(&self.node(next).item) {
                    break;
                }
                cursor = Some(next);
            }
            if let Some(path) = path.as_deref_mut() {
                path[level] = cursor;
            }
        }
        cursor
    }

    /// Rightmost node ordered strictly before the target.
    ///
    /// `cmp` orders a node's item against the target.
    pub(crate) fn strict_floor<C>(&self, mut cmp: C) -> Link
    where
        C: FnMut(&T) -> Ordering,
    {
        self.descend(|item| cmp(item) == Ordering::Less, None)
    }

    /// Rightmost node ordered at or before the target.
    pub(crate) fn floor<C>(&self, mut cmp: C) -> Link
    where
        C: FnMut(&T) -> Ordering,
    {
        self.descend(|item| cmp(item) != Ordering::Greater, None)
    }

    /// First node ordered at or after the target.
    pub(crate) fn ceiling<C>(&self, cmp: C) -> Link
    where
        C: FnMut(&T) -> Ordering,
    {
        self.successor(self.strict_floor(cmp))
    }

    /// First node ordered strictly after the target.
    pub(crate) fn strict_ceiling<C>(&self, cmp: C) -> Link
    where
        C: FnMut(&T) -> Ordering,
    {
        self.successor(self.floor(cmp))
    }

    /// Descends to the first node not ordered before the target and returns it
    /// if it compares equal. Predecessors are written to `path` if given.
    fn seek_equal<C>(&self, mut cmp: C, path: Option<&mut Path>) -> Link
    where
        C: FnMut(&T) -> Ordering,
    {
        // The last comparison made on lane 0 is against the node that stopped
        // the descent, so there is no need to compare it again.
        let mut last = Ordering::Less;
        let pred = self.descend(
            |item| {
                last = cmp(item);
                last == Ordering::Less
            },
            path,
        );
        match self.successor(pred) {
            Some(found) if last == Ordering::Equal => Some(found),
            _ => None,
        }
    }

    /// First node comparing equal to the target.
    pub(crate) fn find<C>(&self, cmp: C) -> Link
    where
        C: FnMut(&T) -> Ordering,
    {
        self.seek_equal(cmp, None)
    }

    /// Links `item` into the list, or reports the equal node that blocks it.
    ///
    /// `cmp(existing, new)` orders list items against the new one. Under
    /// [`Duplicates::Allow`] the new node goes after every equal node.
    pub(crate) fn insert<C>(&mut self, item: T, cmp: C, duplicates: Duplicates) -> Insertion<T>
    where
        C: Fn(&T, &T) -> Ordering,
    {
        let mut path = self.empty_path();
        match duplicates {
            Duplicates::Replace => {
                if let Some(existing) = self.seek_equal(|other| cmp(other, &item), Some(&mut path)) {
                    return Insertion::Existing(existing, item);
                }
            }
            Duplicates::Allow => {
                self.descend(
                    |other| cmp(other, &item) != Ordering::Greater,
                    Some(&mut path),
                );
            }
        }
        Insertion::Linked(self.link(item, &path))
    }

    /// Splices a new node in after the recorded predecessors.
    fn link(&mut self, item: T, path: &Path) -> usize {
        let level = self.sampler.sample();
        let lanes: Lanes = (0..level).map(|l| self.forward(path[l], l)).collect();
        let successor = lanes[0];
        let index = self.alloc(Node {
            item,
            lanes,
            prev: path[0],
        });
        for (l, &pred) in path.iter().take(level).enumerate() {
            self.set_forward(pred, l, Some(index));
        }
        match successor {
            Some(next) => self.node_mut(next).prev = Some(index),
            None => self.last = Some(index),
        }
        self.len += 1;
        trace!(index, level, "linked skiplist node");
        index
    }

    /// Removes the first node comparing equal to the target.
    pub(crate) fn remove<C>(&mut self, cmp: C) -> Option<T>
    where
        C: FnMut(&T) -> Ordering,
    {
        let mut path = self.empty_path();
        let found = self.seek_equal(cmp, Some(&mut path))?;
        Some(self.unlink(found, &path))
    }

    /// Removes the first node without a descent: it is the header's target on
    /// every lane it occupies.
    pub(crate) fn remove_first(&mut self) -> Option<T> {
        let first = self.header[0]?;
        for level in 0..self.level(first) {
            if self.header[level] == Some(first) {
                self.header[level] = self.node(first).lanes[level];
            }
        }
        Some(self.detach(first))
    }

    /// Removes exactly the node at `index`, even among nodes comparing equal.
    ///
    /// `cmp(existing, target)` orders list items against the node's item.
    pub(crate) fn remove_at<C>(&mut self, index: usize, cmp: C) -> T
    where
        C: Fn(&T, &T) -> Ordering,
    {
        if self.header[0] == Some(index) {
            if let Some(item) = self.remove_first() {
                return item;
            }
        }
        let level = self.level(index);
        let mut path = self.empty_path();
        let target = &self.node(index).item;
        let mut cursor: Link = None;
        for l in (0..self.max_level()).rev() {
            while let Some(next) = self.forward(cursor, l) {
                if next == index {
                    break;
                }
                // On lanes the node occupies, equal items ahead of it are
                // skipped until the node itself turns up.
                match cmp(&self.node(next).item, target) {
                    Ordering::Less => cursor = Some(next),
                    Ordering::Equal if l < level => cursor = Some(next),
                    _ => break,
                }
            }
            path[l] = cursor;
        }
        self.unlink(index, &path)
    }

    /// Routes every lane around the node, then detaches it.
    ///
    /// A comparator that breaks its own order can leave `path` short of the
    /// node on some lane. Such lanes fall back to the backward chain.
    fn unlink(&mut self, index: usize, path: &Path) -> T {
        for level in 0..self.level(index) {
            let pred = if self.forward(path[level], level) == Some(index) {
                path[level]
            } else {
                trace!(index, level, "descent missed node, walking back");
                self.lane_predecessor(index, level)
            };
            let next = self.node(index).lanes[level];
            self.set_forward(pred, level, next);
        }
        self.detach(index)
    }

    /// The nearest earlier node tall enough to reach `level`, or the header.
    fn lane_predecessor(&self, index: usize, level: usize) -> Link {
        let mut cursor = self.node(index).prev;
        while let Some(candidate) = cursor {
            if self.level(candidate) > level {
                break;
            }
            cursor = self.node(candidate).prev;
        }
        cursor
    }

    /// Repairs the backward chain around a node whose lanes are already
    /// bypassed and frees its slot.
    fn detach(&mut self, index: usize) -> T {
        let node = self.release(index);
        match node.lanes[0] {
            Some(next) => self.node_mut(next).prev = node.prev,
            None => self.last = node.prev,
        }
        self.len -= 1;
        node.item
    }

    fn alloc(&mut self, node: Node<T>) -> usize {
        match self.free.pop() {
            Some(index) => {
                self.slots[index].node = Some(node);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, index: usize) -> Node<T> {
        let slot = &mut self.slots[index];
        let node = slot.node.take().expect("released a vacant slot");
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        node
    }

    /// Drops every node. Outstanding handles become stale.
    pub(crate) fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index);
            }
        }
        self.header.iter_mut().for_each(|link| *link = None);
        self.last = None;
        self.len = 0;
    }

    /// Writes one row per non-empty lane, top lane first.
    pub(crate) fn fmt_lanes<D, P>(&self, f: &mut fmt::Formatter<'_>, project: P) -> fmt::Result
    where
        D: fmt::Debug + ?Sized,
        P: Fn(&T) -> &D,
    {
        for level in (0..self.max_level()).rev() {
            let mut cursor = self.header[level];
            if cursor.is_none() {
                continue;
            }
            write!(f, "[{}] head", level)?;
            while let Some(index) = cursor {
                write!(f, " -> {:?}", project(self.item(index)))?;
                cursor = self.node(index).lanes[level];
            }
            writeln!(f)?;
        }
        Ok(())
    }

    /// Panics unless every structural invariant holds. `strict` demands
    /// strictly ascending lanes (unique keys).
    #[cfg(test)]
    pub(crate) fn check_invariants<C>(&self, cmp: C, strict: bool)
    where
        C: Fn(&T, &T) -> Ordering,
    {
        // Lane 0 and the backward chain.
        let mut order = Vec::new();
        let mut prev: Link = None;
        let mut cursor = self.header[0];
        while let Some(index) = cursor {
            assert_eq!(self.node(index).prev, prev, "backward link of {}", index);
            let level = self.level(index);
            assert!(level >= 1 && level <= self.max_level());
            if let Some(p) = prev {
                let ord = cmp(self.item(p), self.item(index));
                if strict {
                    assert_eq!(ord, Ordering::Less, "lane 0 not strictly ascending");
                } else {
                    assert_ne!(ord, Ordering::Greater, "lane 0 not ascending");
                }
            }
            order.push(index);
            prev = cursor;
            cursor = self.node(index).lanes[0];
        }
        assert_eq!(self.last, prev, "last is not the final lane-0 node");
        assert_eq!(order.len(), self.len, "len disagrees with lane 0");
        let occupied = self.slots.iter().filter(|s| s.node.is_some()).count();
        assert_eq!(occupied, self.len, "unreachable nodes in the arena");

        // Every upper lane is exactly the subsequence of taller nodes.
        for level in 1..self.max_level() {
            let expected: Vec<usize> = order
                .iter()
                .copied()
                .filter(|&i| self.level(i) > level)
                .collect();
            let mut actual = Vec::new();
            let mut cursor = self.header[level];
            while let Some(index) = cursor {
                actual.push(index);
                cursor = self.node(index).lanes[level];
            }
            assert_eq!(actual, expected, "lane {} out of sync with lane 0", level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(max_level: usize) -> RawList<u32> {
        RawList::new(LevelSampler::new(5, max_level, 0.5))
    }

    fn add(raw: &mut RawList<u32>, item: u32, duplicates: Duplicates) -> usize {
        match raw.insert(item, |a, b| a.cmp(b), duplicates) {
            Insertion::Linked(index) | Insertion::Existing(index, _) => index,
        }
    }

    fn collect(raw: &RawList<u32>) -> Vec<u32> {
        let mut out = Vec::new();
        let mut cursor = raw.first();
        while let Some(index) = cursor {
            out.push(*raw.item(index));
            cursor = raw.next(index);
        }
        out
    }

    #[test]
    fn insert_keeps_invariants() {
        let mut raw = list(8);
        for i in &[10, 30, 50, 5, 0, 3, 40, 20] {
            add(&mut raw, *i, Duplicates::Replace);
            raw.check_invariants(|a, b| a.cmp(b), true);
        }
        assert_eq!(collect(&raw), vec![0, 3, 5, 10, 20, 30, 40, 50]);
    }

    #[test]
    fn replace_reports_existing() {
        let mut raw = list(8);
        let first = add(&mut raw, 7, Duplicates::Replace);
        match raw.insert(7, |a, b| a.cmp(b), Duplicates::Replace) {
            Insertion::Existing(index, item) => {
                assert_eq!(index, first);
                assert_eq!(item, 7);
            }
            Insertion::Linked(_) => panic!("duplicate was linked"),
        }
        assert_eq!(raw.len(), 1);
    }

    #[test]
    fn duplicates_follow_insertion_order() {
        let mut raw = list(6);
        let a = add(&mut raw, 1, Duplicates::Allow);
        let b = add(&mut raw, 1, Duplicates::Allow);
        let c = add(&mut raw, 1, Duplicates::Allow);
        raw.check_invariants(|a, b| a.cmp(b), false);
        assert_eq!(raw.first(), Some(a));
        assert_eq!(raw.next(a), Some(b));
        assert_eq!(raw.next(b), Some(c));
        assert_eq!(raw.last(), Some(c));
    }

    #[test]
    fn remove_at_picks_the_exact_node() {
        let mut raw = list(6);
        let ids: Vec<usize> = (0..20).map(|_| add(&mut raw, 4, Duplicates::Allow)).collect();
        for &index in ids.iter().skip(1).step_by(2) {
            assert_eq!(raw.remove_at(index, |a, b| a.cmp(b)), 4);
            raw.check_invariants(|a, b| a.cmp(b), false);
        }
        let mut cursor = raw.first();
        for &index in ids.iter().step_by(2) {
            assert_eq!(cursor, Some(index));
            cursor = raw.next(index);
        }
        assert_eq!(cursor, None);
    }

    #[test]
    fn remove_first_until_empty() {
        let mut raw = list(4);
        for i in 0..50 {
            add(&mut raw, i, Duplicates::Replace);
        }
        for i in 0..50 {
            assert_eq!(raw.remove_first(), Some(i));
            raw.check_invariants(|a, b| a.cmp(b), true);
        }
        assert_eq!(raw.remove_first(), None);
        assert_eq!(raw.first(), None);
        assert_eq!(raw.last(), None);
    }

    #[test]
    fn stale_handles_do_not_resolve() {
        let mut raw = list(4);
        let index = add(&mut raw, 1, Duplicates::Replace);
        let id = raw.id(index);
        assert_eq!(raw.resolve(id), Some(index));
        raw.remove(|item| item.cmp(&1));
        assert_eq!(raw.resolve(id), None);
        // The slot is reused, but the old handle stays dead.
        let reused = add(&mut raw, 2, Duplicates::Replace);
        assert_eq!(reused, index);
        assert_eq!(raw.resolve(id), None);
        assert_eq!(raw.resolve(raw.id(reused)), Some(reused));
    }

    #[test]
    fn clear_invalidates_everything() {
        let mut raw = list(4);
        let slot = add(&mut raw, 9, Duplicates::Replace);
        let id = raw.id(slot);
        raw.clear();
        raw.check_invariants(|a, b| a.cmp(b), true);
        assert_eq!(raw.resolve(id), None);
        add(&mut raw, 9, Duplicates::Replace);
        assert_eq!(collect(&raw), vec![9]);
        assert_eq!(raw.resolve(id), None);
    }

    #[test]
    fn single_lane_list() {
        let mut raw = list(1);
        for i in (0..30).rev() {
            add(&mut raw, i, Duplicates::Replace);
        }
        raw.check_invariants(|a, b| a.cmp(b), true);
        assert_eq!(raw.floor(|x| x.cmp(&15)).map(|i| *raw.item(i)), Some(15));
        assert_eq!(raw.strict_ceiling(|x| x.cmp(&15)).map(|i| *raw.item(i)), Some(16));
    }

    #[test]
    fn handles_are_tied_to_their_list() {
        let mut a = list(4);
        let mut b = list(4);
        let slot = add(&mut a, 100, Duplicates::Replace);
        let foreign = a.id(slot);
        add(&mut b, 7, Duplicates::Replace);
        assert_eq!(b.resolve(foreign), None);
        assert_eq!(a.resolve(foreign), Some(slot));
    }

    #[test]
    fn find_matches_only_equal_items() {
        let mut raw = list(8);
        for i in (0..40).map(|i| i * 2) {
            add(&mut raw, i, Duplicates::Replace);
        }
        for i in 0..80u32 {
            let found = raw.find(|x| x.cmp(&i)).map(|index| *raw.item(index));
            let expected = if i % 2 == 0 { Some(i) } else { None };
            assert_eq!(found, expected);
        }
    }

    #[test]
    fn inconsistent_comparator_keeps_links_intact() {
        let mut raw = list(6);
        let ids: Vec<usize> = (0..60).map(|i| add(&mut raw, i, Duplicates::Replace)).collect();
        // A reversed order sends every descent the wrong way, so the
        // predecessors come from the backward chain instead.
        for &index in ids.iter().skip(1).step_by(3) {
            let item = *raw.item(index);
            assert_eq!(raw.remove_at(index, |a, b| b.cmp(a)), item);
            raw.check_invariants(|a, b| a.cmp(b), true);
        }
        assert_eq!(raw.len(), 40);
        assert!(collect(&raw).iter().all(|i| i % 3 != 1));
    }
}
