//! # Pool Error Types
//!
//! Errors surfaced by the explicit (non-aliasing) allocation path.

use thiserror::Error;

/// Errors that can occur when allocating from a `SlotPool`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// Every row up to the capacity is live and the free list is empty.
    #[error("pool full: capacity {capacity}")]
    PoolFull {
        /// Hard upper bound of simultaneous rows.
        capacity: usize,
    },

    /// The slot addressed the reserved tombstone row.
    #[error("slot 0 is the reserved tombstone row")]
    Tombstone,

    /// The slot is outside the pool's capacity.
    #[error("slot {slot} out of range for capacity {capacity}")]
    OutOfRange {
        /// Offending slot index.
        slot: u32,
        /// Pool capacity.
        capacity: usize,
    },
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
