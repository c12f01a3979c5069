//! Fibonacci Heap for Rust
//!
//! This crate provides a mergeable priority queue, the Fibonacci heap, with
//! efficient `decrease_key` support:
//!
//! - O(1) amortized `insert`, `decrease_key` and `union`
//! - O(log n) amortized `extract_min` and `delete`
//!
//! Nodes live in a generational arena ([`storage`]), so element handles are
//! checked on every use: a handle whose element was extracted, deleted or
//! cleared yields [`HeapError::InvalidHandle`] instead of touching freed memory.
//!
//! # Example
//!
//! ```rust
//! use fibonacci_forest::fibonacci::FibonacciHeap;
//!
//! let mut heap = FibonacciHeap::new();
//! let handle1 = heap.insert(5, "item1");
//! let _handle2 = heap.insert(3, "item2");
//! heap.decrease_key(&handle1, 1).unwrap();
//! assert_eq!(heap.minimum(), Some((&1, &"item1")));
//! ```

pub mod fibonacci;
pub mod rank;
pub mod storage;
pub mod traits;

// Re-export the main types for convenience
pub use fibonacci::{FibonacciHandle, FibonacciHeap};
pub use traits::{DecreaseKeyHeap, Heap, HeapError, MinKey};
