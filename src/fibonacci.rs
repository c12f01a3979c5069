//! Fibonacci Heap implementation
//!
//! A Fibonacci heap is a data structure for priority queue operations with:
//! - O(1) amortized insert, decrease_key, and union
//! - O(log n) amortized extract_min and delete
//!
//! The structure consists of a collection of heap-ordered trees. Roots are linked
//! in a circular doubly linked list, and so are the children of every node. The
//! heap maintains the minimum root.
//!
//! Nodes are stored in a [`NodeArena`]; every link is a [`NodeRef`] rather than
//! a pointer, and handles are validated on every use, so a stale handle yields
//! [`HeapError::InvalidHandle`] instead of undefined behavior.

use std::fmt;

use log::{debug, trace, warn};

use crate::rank::{self, Rank};
use crate::storage::{NodeArena, NodeRef};
use crate::traits::{DecreaseKeyHeap, Handle, Heap, HeapError, MinKey};

/// Handle to an element in a Fibonacci heap
///
/// A handle stays valid until its element is extracted or deleted, the heap is
/// cleared, or the heap is dropped. After a [`FibonacciHeap::union`] the donor's
/// handles are valid on the receiving heap.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FibonacciHandle {
    node: NodeRef,
}

impl Handle for FibonacciHandle {}

struct Node<T, P> {
    item: T,
    priority: P,
    parent: Option<NodeRef>,
    child: Option<NodeRef>,
    left: NodeRef,
    right: NodeRef,
    degree: Rank,
    marked: bool,
}

impl<T, P> Node<T, P> {
    /// A node forming its own one-element ring
    fn singleton(this: NodeRef, priority: P, item: T) -> Self {
        Node {
            item,
            priority,
            parent: None,
            child: None,
            left: this,
            right: this,
            degree: 0,
            marked: false,
        }
    }
}

/// Fibonacci Heap
///
/// # Example
///
/// ```rust
/// use fibonacci_forest::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// let handle = heap.insert(5, "item");
/// heap.insert(3, "other");
/// heap.decrease_key(&handle, 1).unwrap();
/// assert_eq!(heap.minimum(), Some((&1, &"item")));
/// assert_eq!(heap.extract_min(), Some((1, "item")));
/// ```
pub struct FibonacciHeap<T, P: Ord> {
    nodes: NodeArena<Node<T, P>>,
    min: Option<NodeRef>,
    len: usize,
}

impl<T, P: Ord> Default for FibonacciHeap<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P: Ord> FibonacciHeap<T, P> {
    /// Creates an empty heap
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty heap with room for `capacity` elements before reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: NodeArena::with_capacity(capacity),
            min: None,
            len: 0,
        }
    }

    /// Returns the number of elements in the heap
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the heap holds no elements
    pub fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    /// Inserts an element next to the current minimum root
    ///
    /// No consolidation happens here.
    ///
    /// # Time Complexity
    /// O(1)
    pub fn insert(&mut self, priority: P, item: T) -> FibonacciHandle {
        let node = self
            .nodes
            .insert_with(|this| Node::singleton(this, priority, item));
        self.add_to_root_list(node);
        self.len += 1;
        FibonacciHandle { node }
    }

    /// Moves every element of `other` into this heap
    ///
    /// The two root lists are spliced at one point each; neither is walked.
    /// On equal minimum keys this heap's minimum is kept. Handles issued by
    /// `other` remain usable on `self`.
    ///
    /// # Time Complexity
    /// O(1) in the number of elements
    pub fn union(&mut self, other: Self) {
        let FibonacciHeap {
            nodes,
            min: other_min,
            len: other_len,
        } = other;

        self.nodes.absorb(nodes);
        debug!(
            "union: {} + {} elements, {} slabs",
            self.len,
            other_len,
            self.nodes.slab_count()
        );

        let Some(other_min) = other_min else {
            return;
        };
        match self.min {
            None => self.min = Some(other_min),
            Some(self_min) => {
                self.splice_rings(self_min, other_min);
                if self.nodes[other_min].priority < self.nodes[self_min].priority {
                    self.min = Some(other_min);
                }
            }
        }
        self.len += other_len;
    }

    /// Returns the minimum priority and its item without removing it
    ///
    /// # Time Complexity
    /// O(1)
    pub fn minimum(&self) -> Option<(&P, &T)> {
        self.min.map(|min| {
            let node = &self.nodes[min];
            (&node.priority, &node.item)
        })
    }

    /// Returns the handle of the current minimum element
    pub fn minimum_handle(&self) -> Option<FibonacciHandle> {
        self.min.map(|node| FibonacciHandle { node })
    }

    /// Removes and returns the element with the smallest priority
    ///
    /// The minimum's children are promoted to the root list and the roots are
    /// then consolidated until no two share a degree.
    ///
    /// # Time Complexity
    /// O(log n) amortized
    pub fn extract_min(&mut self) -> Option<(P, T)> {
        let min = self.min?;
        Some(self.remove_min_root(min))
    }

    /// Lowers the priority of the element behind `handle`
    ///
    /// If the new priority breaks heap order with the parent, the element is
    /// cut to the root list and marked ancestors follow it (cascading cut).
    ///
    /// # Errors
    /// - [`HeapError::InvalidHandle`] if the element is no longer in this heap
    /// - [`HeapError::PriorityNotDecreased`] if `new_priority` is not strictly
    ///   smaller than the current priority; the stored priority is untouched
    ///
    /// # Time Complexity
    /// O(1) amortized
    pub fn decrease_key(
        &mut self,
        handle: &FibonacciHandle,
        new_priority: P,
    ) -> Result<(), HeapError> {
        let x = handle.node;
        let node = self.nodes.get_mut(x).ok_or(HeapError::InvalidHandle)?;
        if new_priority >= node.priority {
            return Err(HeapError::PriorityNotDecreased);
        }
        node.priority = new_priority;
        self.restore_heap_order(x, false);
        Ok(())
    }

    /// Removes the element behind `handle`, returning it with the priority it
    /// had before removal
    ///
    /// The element's priority is first decreased to [`MinKey::MIN_KEY`], which
    /// makes it the minimum root, and then the minimum is extracted.
    ///
    /// # Errors
    /// - [`HeapError::InvalidHandle`] if the element is no longer in this heap
    /// - [`HeapError::KeyAtMinimum`] if its priority already equals
    ///   `P::MIN_KEY`; the heap is left unchanged
    ///
    /// # Time Complexity
    /// O(log n) amortized
    pub fn delete(&mut self, handle: &FibonacciHandle) -> Result<(P, T), HeapError>
    where
        P: MinKey,
    {
        let x = handle.node;
        let node = self.nodes.get_mut(x).ok_or(HeapError::InvalidHandle)?;
        if node.priority <= P::MIN_KEY {
            return Err(HeapError::KeyAtMinimum);
        }
        let original = std::mem::replace(&mut node.priority, P::MIN_KEY);
        self.restore_heap_order(x, true);
        let (_, item) = self.remove_min_root(x);
        Ok((original, item))
    }

    /// Drops every element and invalidates all outstanding handles
    pub fn clear(&mut self) {
        debug!("clear: dropping {} elements", self.len);
        self.nodes = NodeArena::new();
        self.min = None;
        self.len = 0;
    }

    /// Returns the priority and item behind `handle`, if it is still in the heap
    pub fn get(&self, handle: &FibonacciHandle) -> Option<(&P, &T)> {
        self.nodes
            .get(handle.node)
            .map(|node| (&node.priority, &node.item))
    }

    pub fn priority(&self, handle: &FibonacciHandle) -> Option<&P> {
        self.get(handle).map(|(priority, _)| priority)
    }

    pub fn item(&self, handle: &FibonacciHandle) -> Option<&T> {
        self.get(handle).map(|(_, item)| item)
    }

    /// Returns true if `handle` refers to an element of this heap
    pub fn contains(&self, handle: &FibonacciHandle) -> bool {
        self.nodes.contains(handle.node)
    }

    /// Adaptor that displays only the keys of the heap's forest
    pub fn key_dump(&self) -> KeyDump<'_, T, P> {
        KeyDump { heap: self }
    }

    // ------------------------------------------------------------------
    // Ring primitives
    // ------------------------------------------------------------------

    /// Inserts the singleton `node` into `anchor`'s ring, right of `anchor`
    fn insert_after(&mut self, anchor: NodeRef, node: NodeRef) {
        let right = self.nodes[anchor].right;
        self.nodes[node].left = anchor;
        self.nodes[node].right = right;
        self.nodes[right].left = node;
        self.nodes[anchor].right = node;
    }

    /// Takes `node` out of its ring and makes it a singleton.
    ///
    /// Returns a surviving ring member, or `None` if `node` was alone.
    fn unlink(&mut self, node: NodeRef) -> Option<NodeRef> {
        let Node { left, right, .. } = self.nodes[node];
        self.nodes[node].left = node;
        self.nodes[node].right = node;
        if right == node {
            return None;
        }
        self.nodes[left].right = right;
        self.nodes[right].left = left;
        Some(right)
    }

    /// Joins the rings containing `a` and `b` into one ring
    fn splice_rings(&mut self, a: NodeRef, b: NodeRef) {
        let a_right = self.nodes[a].right;
        let b_left = self.nodes[b].left;
        self.nodes[a].right = b;
        self.nodes[b].left = a;
        self.nodes[b_left].right = a_right;
        self.nodes[a_right].left = b_left;
    }

    /// Snapshot of the ring starting at `start`, in `right` order
    fn ring(&self, start: NodeRef) -> Vec<NodeRef> {
        let mut members = vec![start];
        let mut current = self.nodes[start].right;
        while current != start {
            members.push(current);
            current = self.nodes[current].right;
        }
        members
    }

    /// Adds a singleton to the root list, updating `min` on a strictly smaller key
    fn add_to_root_list(&mut self, node: NodeRef) {
        match self.min {
            Some(min) => {
                self.insert_after(min, node);
                if self.nodes[node].priority < self.nodes[min].priority {
                    self.min = Some(node);
                }
            }
            None => self.min = Some(node),
        }
    }

    // ------------------------------------------------------------------
    // Extract-min and consolidation
    // ------------------------------------------------------------------

    /// Removes `min`, which must be the current minimum root
    fn remove_min_root(&mut self, min: NodeRef) -> (P, T) {
        debug_assert_eq!(self.min, Some(min));

        if let Some(child) = self.nodes[min].child.take() {
            let mut current = child;
            loop {
                let node = &mut self.nodes[current];
                node.parent = None;
                node.marked = false;
                current = node.right;
                if current == child {
                    break;
                }
            }
            self.nodes[min].degree = 0;
            self.splice_rings(min, child);
        }

        self.len -= 1;
        match self.unlink(min) {
            None => self.min = None,
            Some(survivor) => {
                self.min = Some(survivor);
                self.consolidate(survivor);
            }
        }

        match self.nodes.remove(min) {
            Some(node) => (node.priority, node.item),
            None => panic!("minimum root {min:?} missing from arena"),
        }
    }

    /// Links roots of equal degree until every degree occurs at most once,
    /// then points `min` at the smallest surviving root.
    fn consolidate(&mut self, start: NodeRef) {
        let roots = self.ring(start);
        let mut table: Vec<Option<NodeRef>> = vec![None; rank::degree_bound(self.len)];
        let root_count = roots.len();

        for root in roots {
            let mut x = root;
            let mut degree = self.nodes[x].degree as usize;
            loop {
                if degree >= table.len() {
                    table.resize(degree + 1, None);
                }
                let Some(mut y) = table[degree].take() else {
                    break;
                };
                // The earlier root keeps parenthood on equal keys.
                if self.nodes[y].priority <= self.nodes[x].priority {
                    std::mem::swap(&mut x, &mut y);
                }
                self.link(y, x);
                degree += 1;
            }
            table[degree] = Some(x);
        }

        let mut min: Option<NodeRef> = None;
        for root in table.into_iter().flatten() {
            match min {
                Some(m) if self.nodes[m].priority <= self.nodes[root].priority => {}
                _ => min = Some(root),
            }
        }
        self.min = min;

        trace!(
            "consolidate: {} roots -> {} trees, len {}",
            root_count,
            self.min.map_or(0, |m| self.ring(m).len()),
            self.len
        );
    }

    /// Makes root `child` a child of root `parent`; requires
    /// `priority(parent) <= priority(child)`.
    fn link(&mut self, child: NodeRef, parent: NodeRef) {
        self.unlink(child);
        match self.nodes[parent].child {
            Some(first) => self.insert_after(first, child),
            None => self.nodes[parent].child = Some(child),
        }
        let parent_node = &mut self.nodes[parent];
        parent_node.degree = rank::checked_increment(parent_node.degree);

        let child_node = &mut self.nodes[child];
        child_node.parent = Some(parent);
        child_node.marked = false;
    }

    // ------------------------------------------------------------------
    // Decrease-key support
    // ------------------------------------------------------------------

    /// Re-establishes heap order after `node`'s priority was lowered.
    ///
    /// With `force`, the node is cut even when it ties with its parent and
    /// becomes `min` even when it ties with the current minimum.
    fn restore_heap_order(&mut self, node: NodeRef, force: bool) {
        if let Some(parent) = self.nodes[node].parent {
            if force || self.nodes[node].priority < self.nodes[parent].priority {
                self.cut(node, parent);
                self.cascading_cut(parent);
            }
        }

        if self.nodes[node].parent.is_some() {
            return;
        }
        if let Some(min) = self.min {
            if force || self.nodes[node].priority <= self.nodes[min].priority {
                self.min = Some(node);
            }
        }
    }

    /// Moves `node` from `parent`'s child ring to the root list
    fn cut(&mut self, node: NodeRef, parent: NodeRef) {
        let survivor = self.unlink(node);
        let parent_node = &mut self.nodes[parent];
        if parent_node.child == Some(node) {
            parent_node.child = survivor;
        }
        parent_node.degree = rank::saturating_decrement(parent_node.degree);

        let cut_node = &mut self.nodes[node];
        cut_node.parent = None;
        cut_node.marked = false;

        // The heap holds at least `node`'s ancestors' root, so `min` is set.
        if let Some(min) = self.min {
            self.insert_after(min, node);
        }
    }

    /// Walks up from `node`, cutting marked ancestors until an unmarked one
    /// (which gets marked) or a root is reached
    fn cascading_cut(&mut self, mut node: NodeRef) {
        let mut cuts = 0usize;
        while let Some(parent) = self.nodes[node].parent {
            if !self.nodes[node].marked {
                self.nodes[node].marked = true;
                break;
            }
            self.cut(node, parent);
            cuts += 1;
            node = parent;
        }
        if cuts > 0 {
            trace!("cascading cut promoted {} marked ancestors", cuts);
        }
    }

    // ------------------------------------------------------------------
    // Invariant checking
    // ------------------------------------------------------------------

    /// Checks every structural invariant of the forest.
    ///
    /// Verifies ring symmetry, parent/child/degree consistency, heap order,
    /// that roots are unmarked, that `min` is a root holding the smallest key
    /// and that `len` matches the number of reachable and stored nodes. The
    /// first violation found is logged at `warn` level.
    pub fn verify_internal_structure(&self) -> bool {
        match self.check_structure() {
            Ok(()) => true,
            Err(violation) => {
                warn!("fibonacci heap invariant violated: {}", violation);
                false
            }
        }
    }

    fn check_structure(&self) -> Result<(), String> {
        let Some(min) = self.min else {
            if self.len != 0 {
                return Err(format!("no minimum but len is {}", self.len));
            }
            return Ok(());
        };
        if self.nodes.get(min).is_none() {
            return Err("minimum is not a live node".to_string());
        }
        if self.nodes[min].parent.is_some() {
            return Err("minimum is not a root".to_string());
        }

        let mut seen = 0usize;
        let mut stack: Vec<(NodeRef, Option<NodeRef>)> = vec![(min, None)];
        while let Some((start, parent)) = stack.pop() {
            let ring = self.check_ring(start)?;
            if let Some(p) = parent {
                let degree = self.nodes[p].degree as usize;
                if ring.len() != degree {
                    return Err(format!(
                        "degree {} but child ring has {} nodes",
                        degree,
                        ring.len()
                    ));
                }
            }
            for &member in &ring {
                let node = &self.nodes[member];
                seen += 1;
                if node.parent != parent {
                    return Err(format!("{member:?} has a wrong parent link"));
                }
                match parent {
                    None => {
                        if node.marked {
                            return Err(format!("root {member:?} is marked"));
                        }
                        if node.priority < self.nodes[min].priority {
                            return Err(format!("root {member:?} is below the minimum"));
                        }
                    }
                    Some(p) => {
                        if node.priority < self.nodes[p].priority {
                            return Err(format!("{member:?} is below its parent"));
                        }
                    }
                }
                match node.child {
                    Some(child) => stack.push((child, Some(member))),
                    None if node.degree != 0 => {
                        return Err(format!("{member:?} has degree {} but no child", node.degree));
                    }
                    None => {}
                }
            }
        }

        if seen != self.len {
            return Err(format!("len is {} but {} nodes are reachable", self.len, seen));
        }
        if self.nodes.node_count() != self.len {
            return Err(format!(
                "len is {} but the arena stores {} nodes",
                self.len,
                self.nodes.node_count()
            ));
        }
        Ok(())
    }

    /// Walks one ring, checking `left`/`right` symmetry
    fn check_ring(&self, start: NodeRef) -> Result<Vec<NodeRef>, String> {
        let mut members = Vec::new();
        let mut current = start;
        loop {
            let Some(node) = self.nodes.get(current) else {
                return Err(format!("ring link to dead node {current:?}"));
            };
            if self.nodes.get(node.right).map(|r| r.left) != Some(current) {
                return Err(format!("{current:?} and its right neighbor disagree"));
            }
            members.push(current);
            if members.len() > self.len {
                return Err("ring longer than the heap".to_string());
            }
            current = node.right;
            if current == start {
                return Ok(members);
            }
        }
    }

    // ------------------------------------------------------------------
    // Diagnostic dump
    // ------------------------------------------------------------------

    fn fmt_forest(
        &self,
        f: &mut fmt::Formatter<'_>,
        fmt_node: &dyn Fn(&Node<T, P>, &mut fmt::Formatter<'_>) -> fmt::Result,
    ) -> fmt::Result {
        f.write_str("FibonacciHeap{[")?;
        if let Some(min) = self.min {
            self.fmt_ring(f, min, fmt_node)?;
        }
        write!(f, "], size={}}}", self.len)
    }

    fn fmt_ring(
        &self,
        f: &mut fmt::Formatter<'_>,
        start: NodeRef,
        fmt_node: &dyn Fn(&Node<T, P>, &mut fmt::Formatter<'_>) -> fmt::Result,
    ) -> fmt::Result {
        for (i, member) in self.ring(start).into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let node = &self.nodes[member];
            if node.parent.is_none() {
                f.write_str(if Some(member) == self.min { "Min" } else { "Root" })?;
            }
            fmt_node(node, f)?;
            if let Some(child) = node.child {
                f.write_str(":[")?;
                self.fmt_ring(f, child, fmt_node)?;
                f.write_str("]")?;
            }
        }
        Ok(())
    }
}

/// Full diagnostic dump: every node with item, key, degree and mark, nested by tree
impl<T: fmt::Debug, P: Ord + fmt::Debug> fmt::Debug for FibonacciHeap<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_forest(f, &|node, f| {
            write!(
                f,
                "Node{{item={:?}, key={:?}, degree={}, marked={}}}",
                node.item, node.priority, node.degree, node.marked
            )
        })
    }
}

/// Key-only view of a heap's forest, see [`FibonacciHeap::key_dump`]
pub struct KeyDump<'a, T, P: Ord> {
    heap: &'a FibonacciHeap<T, P>,
}

impl<T, P: Ord + fmt::Display> fmt::Display for KeyDump<'_, T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.heap
            .fmt_forest(f, &|node, f| write!(f, "{{{}}}", node.priority))
    }
}

impl<T, P: Ord> Heap<T, P> for FibonacciHeap<T, P> {
    fn new() -> Self {
        FibonacciHeap::new()
    }

    fn is_empty(&self) -> bool {
        FibonacciHeap::is_empty(self)
    }

    fn len(&self) -> usize {
        FibonacciHeap::len(self)
    }

    fn push(&mut self, priority: P, item: T) {
        self.insert(priority, item);
    }

    fn peek(&self) -> Option<(&P, &T)> {
        self.minimum()
    }

    fn pop(&mut self) -> Option<(P, T)> {
        self.extract_min()
    }

    fn merge(&mut self, other: Self) {
        self.union(other);
    }
}

impl<T, P: Ord> DecreaseKeyHeap<T, P> for FibonacciHeap<T, P> {
    type Handle = FibonacciHandle;

    fn push_with_handle(&mut self, priority: P, item: T) -> Self::Handle {
        self.insert(priority, item)
    }

    fn decrease_key(&mut self, handle: &Self::Handle, new_priority: P) -> Result<(), HeapError> {
        FibonacciHeap::decrease_key(self, handle, new_priority)
    }
}

impl<T, P: Ord> Extend<(P, T)> for FibonacciHeap<T, P> {
    fn extend<I: IntoIterator<Item = (P, T)>>(&mut self, iter: I) {
        for (priority, item) in iter {
            self.insert(priority, item);
        }
    }
}

impl<T, P: Ord> FromIterator<(P, T)> for FibonacciHeap<T, P> {
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut heap = Self::with_capacity(iter.size_hint().0);
        heap.extend(iter);
        heap
    }
}
