//! Degree type and bounds for Fibonacci heap nodes.
//!
//! # Why u8?
//!
//! A node's degree in a Fibonacci heap holding `n` elements never exceeds
//! `⌊log_φ(n)⌋` (φ = golden ratio). For `n = 2⁶⁴` that is about 92, so a `u8`
//! covers every heap that fits in memory, and saves 7 bytes per node compared
//! to `usize` on 64-bit systems.
//!
//! # Runtime Checks
//!
//! The [`checked_increment`] function provides a safe way to increase a degree,
//! panicking if the limit is exceeded (which would indicate a bug, since it's
//! mathematically impossible with valid heap operations).

/// Type alias for node degree.
pub type Rank = u8;

/// Maximum valid rank value.
pub const MAX_RANK: Rank = u8::MAX;

/// The golden ratio φ = (1 + √5) / 2.
pub const PHI: f64 = 1.618_033_988_749_895;

/// Safely increment a rank value, panicking on overflow.
///
/// # Panics
///
/// Panics if `rank == MAX_RANK`. This should never happen in practice since
/// it would require a heap with more than φ²⁵⁵ elements.
///
/// # Example
///
/// ```rust
/// use fibonacci_forest::rank::{checked_increment, Rank};
///
/// let rank: Rank = 5;
/// assert_eq!(checked_increment(rank), 6);
/// ```
#[inline]
pub fn checked_increment(rank: Rank) -> Rank {
    rank.checked_add(1).expect(
        "rank overflow: this should be impossible since max degree is log_φ(n) \
         and u8::MAX (255) supports heaps with up to φ²⁵⁵ elements",
    )
}

/// Safely decrement a rank value, returning 0 if already at minimum.
#[inline]
pub fn saturating_decrement(rank: Rank) -> Rank {
    rank.saturating_sub(1)
}

/// Number of degree-table slots consolidation needs for a heap of `len` nodes.
///
/// Degrees range over `0..=⌊log_φ(len)⌋`; one spare slot absorbs floating
/// point rounding at exact powers of φ.
///
/// ```rust
/// use fibonacci_forest::rank::degree_bound;
///
/// assert_eq!(degree_bound(1), 2);
/// assert!(degree_bound(1_000_000) < 32);
/// ```
#[inline]
pub fn degree_bound(len: usize) -> usize {
    if len <= 1 {
        return 2;
    }
    ((len as f64).ln() / PHI.ln()).floor() as usize + 2
}
