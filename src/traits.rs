//! Common traits for heap data structures
//!
//! This module provides a two-tier trait hierarchy for heap/priority queue data structures:
//!
//! - [`Heap`]: Base trait for simple heaps without `decrease_key` support
//! - [`DecreaseKeyHeap`]: Extended trait adding `decrease_key` and handle-based operations
//!
//! The base [`Heap`] trait is compatible with Rust's standard heap API patterns,
//! while [`DecreaseKeyHeap`] adds the advanced operations needed for algorithms
//! like Dijkstra's shortest path.

use std::fmt;
use std::hash::Hash;

use thiserror::Error;

/// Error type for heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeapError {
    /// The new priority is not less than the current priority
    #[error("new priority is not less than current priority")]
    PriorityNotDecreased,
    /// The handle is no longer valid (element was removed, or belongs to another heap)
    #[error("handle is no longer valid (element was removed)")]
    InvalidHandle,
    /// `delete` was asked to remove an element whose priority is already the
    /// smallest representable value, so it cannot be decreased any further
    #[error("priority is already the minimum representable key")]
    KeyAtMinimum,
}

/// A handle to an element in the heap, used for decrease_key operations
///
/// This is an opaque type that identifies a specific element in the heap.
/// Handles are plain copyable identifiers; the heap validates them on every use.
pub trait Handle: Copy + Eq + Hash + fmt::Debug {}

/// Key types with a smallest representable value.
///
/// [`FibonacciHeap::delete`](crate::fibonacci::FibonacciHeap::delete) drives
/// the doomed element down to this key before extracting it.
pub trait MinKey: Ord {
    /// The smallest value of the type
    const MIN_KEY: Self;
}

macro_rules! impl_min_key {
    ($($t:ty),* $(,)?) => {
        $(
            impl MinKey for $t {
                const MIN_KEY: Self = <$t>::MIN;
            }
        )*
    };
}

impl_min_key!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl MinKey for char {
    const MIN_KEY: Self = '\0';
}

/// Base trait for heap/priority queue data structures
///
/// This trait provides a simple API similar to Rust's `BinaryHeap`:
/// - `push` inserts an element (returns `()`)
/// - `pop` removes and returns the minimum
/// - `peek` returns the minimum without removing it
///
/// Unlike `BinaryHeap` which stores values directly (using `Ord`), these heaps
/// store (priority, item) pairs to separate the ordering key from the data.
///
/// # Example
///
/// ```rust
/// use fibonacci_forest::Heap;
/// use fibonacci_forest::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// heap.push(3, "three");
/// heap.push(1, "one");
/// heap.push(2, "two");
///
/// assert_eq!(heap.peek(), Some((&1, &"one")));
/// assert_eq!(heap.pop(), Some((1, "one")));
/// ```
pub trait Heap<T, P: Ord> {
    /// Creates a new empty heap
    fn new() -> Self;

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool;

    /// Returns the number of elements in the heap
    fn len(&self) -> usize;

    /// Inserts an element with the given priority
    fn push(&mut self, priority: P, item: T);

    /// Returns the minimum priority and associated item without removing it
    ///
    /// Note that `BinaryHeap` is a max-heap, while these heaps are min-heaps.
    fn peek(&self) -> Option<(&P, &T)>;

    /// Removes and returns the minimum priority and associated item
    fn pop(&mut self) -> Option<(P, T)>;

    /// Merges another heap into this one, consuming the other heap
    fn merge(&mut self, other: Self);
}

/// Extended heap trait with `decrease_key` support
///
/// # Example
///
/// ```rust
/// use fibonacci_forest::{DecreaseKeyHeap, Heap};
/// use fibonacci_forest::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// let handle = heap.push_with_handle(10, "item");
/// heap.decrease_key(&handle, 5).unwrap();
/// assert_eq!(heap.peek(), Some((&5, &"item")));
/// ```
pub trait DecreaseKeyHeap<T, P: Ord>: Heap<T, P> {
    /// The handle type for this heap, used to reference elements for decrease_key
    type Handle: Handle;

    /// Inserts an element with the given priority, returning a handle
    fn push_with_handle(&mut self, priority: P, item: T) -> Self::Handle;

    /// Decreases the priority of an element identified by the handle
    ///
    /// # Errors
    /// Returns `HeapError::PriorityNotDecreased` if the new priority is not
    /// less than the current priority, and `HeapError::InvalidHandle` if the
    /// element is no longer in this heap. Neither error mutates the heap.
    fn decrease_key(&mut self, handle: &Self::Handle, new_priority: P) -> Result<(), HeapError>;
}
