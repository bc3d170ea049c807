//! # TESSERA Core
//!
//! Slot-based Structure-of-Arrays foundation designed for:
//! - Fixed-capacity entity kinds (no growth during gameplay)
//! - Swap-free deletion via free-list recycling
//! - Deterministic fixed-timestep simulation
//!
//! ## Architecture Rules
//!
//! 1. **No heap allocations in hot path** - pools and columns are pre-allocated
//! 2. **Data-oriented design** - one contiguous array per attribute, indexed by slot
//! 3. **Silent degradation** - overflowed allocations alias the tombstone row
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_core::{Column, SlotPool};
//!
//! let mut pool = SlotPool::with_tombstone(4096);
//! let mut health: Column<f32> = Column::new(4096);
//!
//! let slot = pool.allocate();
//! health.set(slot, 100.0);
//! pool.free(&[slot]);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod math;
pub mod pool;
pub mod storage;
pub mod timer;

pub use error::{PoolError, PoolResult};
pub use math::{Rect, Vec2};
pub use pool::{Slot, SlotPool, SOA_LIMIT, TOMBSTONE_COUNT};
pub use storage::{Column, Component};
pub use timer::{CatchUpPolicy, FixedTimestep};
