//! Arena storage for heap nodes
//!
//! Nodes live in generational [`SlotMap`] slabs instead of individual heap
//! allocations. Every slab carries a process-unique [`ArenaId`], and a node is
//! addressed by a [`NodeRef`]: the slab it lives in plus its slot key. Ring
//! links (`left`/`right`/`parent`/`child`) and user handles are both plain
//! `NodeRef`s, so the structure needs no `unsafe` and no reference counting.
//!
//! # Merging
//!
//! A heap owns a table of slabs. Inserting always goes to the heap's *home*
//! slab; [`NodeArena::absorb`] moves another arena's slabs into this table
//! without touching a single node, which keeps `union` independent of the
//! number of elements. The smaller table is merged into the larger one.
//!
//! # Stale references
//!
//! Slot keys are generational and arena ids are never reused, so a `NodeRef`
//! whose node was removed, or which was minted by an unrelated heap, resolves
//! to `None` through [`NodeArena::get`]. Indexing with such a reference panics.

use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Slot key inside a single slab
    pub struct NodeKey;
}

/// Identifier of one slab, unique for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaId(u64);

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(0);

impl ArenaId {
    fn fresh() -> Self {
        ArenaId(NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Stable address of a node: its slab and its slot inside that slab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    arena: ArenaId,
    key: NodeKey,
}

impl NodeRef {
    /// The slab this node was allocated in
    pub fn arena(&self) -> ArenaId {
        self.arena
    }
}

/// A table of node slabs owned by one heap
#[derive(Debug)]
pub struct NodeArena<N> {
    home: ArenaId,
    slabs: FxHashMap<ArenaId, SlotMap<NodeKey, N>>,
}

impl<N> Default for NodeArena<N> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<N> NodeArena<N> {
    /// Creates an arena with an empty home slab
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an arena whose home slab can hold `capacity` nodes without reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        let home = ArenaId::fresh();
        let mut slabs = FxHashMap::default();
        slabs.insert(home, SlotMap::with_capacity_and_key(capacity));
        Self { home, slabs }
    }

    /// Id of the slab new nodes are allocated in
    pub fn home(&self) -> ArenaId {
        self.home
    }

    /// Number of slabs currently in the table
    pub fn slab_count(&self) -> usize {
        self.slabs.len()
    }

    /// Total number of live nodes across all slabs
    pub fn node_count(&self) -> usize {
        self.slabs.values().map(SlotMap::len).sum()
    }

    /// Allocates a node in the home slab.
    ///
    /// The closure receives the node's own address so that self-referencing
    /// links (a singleton ring) can be set up before the node is stored.
    pub fn insert_with(&mut self, f: impl FnOnce(NodeRef) -> N) -> NodeRef {
        let arena = self.home;
        let slab = self
            .slabs
            .entry(arena)
            .or_insert_with(SlotMap::with_key);
        let key = slab.insert_with_key(|key| f(NodeRef { arena, key }));
        NodeRef { arena, key }
    }

    /// Removes a node, dropping its slab if that was the slab's last node
    /// and the slab is not the home slab.
    pub fn remove(&mut self, node: NodeRef) -> Option<N> {
        let slab = self.slabs.get_mut(&node.arena)?;
        let removed = slab.remove(node.key)?;
        if slab.is_empty() && node.arena != self.home {
            self.slabs.remove(&node.arena);
        }
        Some(removed)
    }

    /// Returns true if `node` refers to a live node of this arena
    pub fn contains(&self, node: NodeRef) -> bool {
        self.get(node).is_some()
    }

    pub fn get(&self, node: NodeRef) -> Option<&N> {
        self.slabs.get(&node.arena)?.get(node.key)
    }

    pub fn get_mut(&mut self, node: NodeRef) -> Option<&mut N> {
        self.slabs.get_mut(&node.arena)?.get_mut(node.key)
    }

    /// Takes ownership of every slab of `other`.
    ///
    /// Costs O(number of slabs in the smaller table); nodes are not visited,
    /// so every `NodeRef` minted by `other` stays valid in `self`.
    pub fn absorb(&mut self, mut other: NodeArena<N>) {
        if other.slabs.len() > self.slabs.len() {
            std::mem::swap(&mut self.slabs, &mut other.slabs);
        }
        for (id, slab) in other.slabs {
            if !slab.is_empty() || id == self.home {
                self.slabs.insert(id, slab);
            }
        }
    }
}

impl<N> Index<NodeRef> for NodeArena<N> {
    type Output = N;

    fn index(&self, node: NodeRef) -> &N {
        match self.get(node) {
            Some(n) => n,
            None => panic!("dangling node reference {node:?}"),
        }
    }
}

impl<N> IndexMut<NodeRef> for NodeArena<N> {
    fn index_mut(&mut self, node: NodeRef) -> &mut N {
        match self.get_mut(node) {
            Some(n) => n,
            None => panic!("dangling node reference {node:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut arena: NodeArena<i32> = NodeArena::new();

        let r = arena.insert_with(|_| 42);
        assert_eq!(arena.get(r), Some(&42));
        assert_eq!(r.arena(), arena.home());

        arena[r] = 100;
        assert_eq!(arena[r], 100);
        assert_eq!(arena.node_count(), 1);
    }

    #[test]
    fn test_insert_with_sees_own_address() {
        let mut arena: NodeArena<Option<NodeRef>> = NodeArena::new();
        let r = arena.insert_with(Some);
        assert_eq!(arena[r], Some(r));
    }

    #[test]
    fn test_removed_reference_is_stale() {
        let mut arena: NodeArena<i32> = NodeArena::new();
        let r = arena.insert_with(|_| 1);

        assert_eq!(arena.remove(r), Some(1));
        assert!(!arena.contains(r));
        assert_eq!(arena.remove(r), None);

        // A reused slot carries a new generation.
        let r2 = arena.insert_with(|_| 2);
        assert!(!arena.contains(r));
        assert_eq!(arena.get(r2), Some(&2));
    }

    #[test]
    fn test_foreign_reference_is_stale() {
        let mut a: NodeArena<i32> = NodeArena::new();
        let mut b: NodeArena<i32> = NodeArena::new();
        let ra = a.insert_with(|_| 1);
        let _rb = b.insert_with(|_| 2);

        assert_ne!(a.home(), b.home());
        assert!(!b.contains(ra));
    }

    #[test]
    fn test_absorb_keeps_references_valid() {
        let mut a: NodeArena<i32> = NodeArena::new();
        let mut b: NodeArena<i32> = NodeArena::new();
        let ra = a.insert_with(|_| 1);
        let rb = b.insert_with(|_| 2);
        let home = a.home();

        a.absorb(b);
        assert_eq!(a.home(), home);
        assert_eq!(a[ra], 1);
        assert_eq!(a[rb], 2);
        assert_eq!(a.slab_count(), 2);

        // New nodes still land in the home slab.
        let rc = a.insert_with(|_| 3);
        assert_eq!(rc.arena(), home);
    }

    #[test]
    fn test_absorbed_slab_dropped_when_empty() {
        let mut a: NodeArena<i32> = NodeArena::new();
        let mut b: NodeArena<i32> = NodeArena::new();
        let rb = b.insert_with(|_| 2);

        a.absorb(b);
        assert_eq!(a.slab_count(), 2);
        a.remove(rb);
        assert_eq!(a.slab_count(), 1);
        assert_eq!(a.node_count(), 0);
    }

    #[test]
    fn test_absorb_into_smaller_table() {
        let mut a: NodeArena<i32> = NodeArena::new();
        let mut big: NodeArena<i32> = NodeArena::new();
        for _ in 0..3 {
            let mut donor: NodeArena<i32> = NodeArena::new();
            donor.insert_with(|_| 7);
            big.absorb(donor);
        }
        let home = a.home();
        let ra = a.insert_with(|_| 1);

        a.absorb(big);
        assert_eq!(a.home(), home);
        assert_eq!(a.slab_count(), 5);
        assert_eq!(a.node_count(), 4);
        assert_eq!(a[ra], 1);
    }

    #[test]
    #[should_panic(expected = "dangling node reference")]
    fn test_index_stale_panics() {
        let mut arena: NodeArena<i32> = NodeArena::new();
        let r = arena.insert_with(|_| 1);
        arena.remove(r);
        let _ = arena[r];
    }
}
