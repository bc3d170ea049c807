//! # Slot Pool
//!
//! Dense row allocator shared by every column of one entity kind.
//!
//! A pool tracks:
//! - `count`: the high-water mark of the dense region
//! - `free_slots`: recycled rows below `count`, reused LIFO
//! - `is_occupied`: one bit per row, so a double free is a no-op
//!
//! Every row in `[0, count)` is either occupied or on the free list.
//! Row 0 of a tombstone pool is permanently occupied and absorbs
//! overflowed allocations.

use bit_vec::BitVec;

use crate::error::{PoolError, PoolResult};

/// Hard upper bound on simultaneous rows per entity kind.
pub const SOA_LIMIT: usize = 4096;

/// Rows reserved at the start of a tombstone pool.
pub const TOMBSTONE_COUNT: usize = 1;

/// Row index into every column of one entity kind.
///
/// A slot is only meaningful for the pool it came from, and only until
/// it is freed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Slot(u32);

impl Slot {
    /// The reserved sentinel row.
    pub const TOMBSTONE: Self = Self(0);

    /// Creates a slot from a raw row index.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw row index.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the row index for column access.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Checks if this is the sentinel row.
    #[inline]
    #[must_use]
    pub const fn is_tombstone(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Slot {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// Fixed-capacity slot allocator with free-list recycling.
///
/// All memory is reserved at construction; neither `allocate` nor `free`
/// touches the heap afterwards.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool = SlotPool::with_tombstone(SOA_LIMIT);
/// let a = pool.allocate();   // Slot(1)
/// let b = pool.allocate();   // Slot(2)
/// pool.free(&[a]);
/// assert_eq!(pool.allocate(), a);
/// ```
#[derive(Clone, Debug)]
pub struct SlotPool {
    /// High-water mark of the dense region.
    count: usize,
    /// Recycled rows, most-recently freed last.
    free_slots: Vec<Slot>,
    /// One bit per row.
    occupied: BitVec,
    /// Rows that are never handed out nor released.
    reserved: usize,
    /// Maximum number of rows.
    capacity: usize,
    /// Allocations that aliased the sentinel row.
    overflow_count: u64,
}

impl SlotPool {
    /// Creates a pool whose row 0 is a permanently occupied tombstone.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of rows, tombstone included
    ///
    /// # Panics
    ///
    /// Panics if capacity does not exceed the tombstone row, or if a row
    /// index would not fit in a [`Slot`].
    #[must_use]
    pub fn with_tombstone(capacity: usize) -> Self {
        assert!(
            capacity > TOMBSTONE_COUNT,
            "Capacity must leave room past the tombstone"
        );
        Self::with_reserved(capacity, TOMBSTONE_COUNT)
    }

    /// Creates a pool without a tombstone, for buffers rebuilt every frame.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero, or if a row index would not fit in a
    /// [`Slot`].
    #[must_use]
    pub fn ephemeral(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        Self::with_reserved(capacity, 0)
    }

    fn with_reserved(capacity: usize, reserved: usize) -> Self {
        assert!(
            u32::try_from(capacity - 1).is_ok(),
            "Capacity must fit the slot index range"
        );
        let mut occupied = BitVec::from_elem(capacity, false);
        for row in 0..reserved {
            occupied.set(row, true);
        }

        Self {
            count: reserved,
            free_slots: Vec::with_capacity(capacity),
            occupied,
            reserved,
            capacity,
            overflow_count: 0,
        }
    }

    /// Allocates a row.
    ///
    /// Reuses the most recently freed row, otherwise extends the dense
    /// region. At capacity the sentinel row 0 is returned and the overflow
    /// counter is bumped; callers that need to know use [`Self::try_allocate`].
    pub fn allocate(&mut self) -> Slot {
        if let Some(slot) = self.free_slots.pop() {
            self.occupied.set(slot.index(), true);
            return slot;
        }

        if self.count < self.capacity {
            let slot = Slot(self.count as u32);
            self.occupied.set(self.count, true);
            self.count += 1;
            return slot;
        }

        self.overflow_count += 1;
        tracing::trace!(
            "Slot pool full (capacity {}), aliasing row 0",
            self.capacity
        );
        Slot::TOMBSTONE
    }

    /// Allocates a row, or reports that the pool is full.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::PoolFull`] when no row is available.
    pub fn try_allocate(&mut self) -> PoolResult<Slot> {
        if self.is_full() {
            return Err(PoolError::PoolFull {
                capacity: self.capacity,
            });
        }
        Ok(self.allocate())
    }

    /// Releases a batch of rows.
    ///
    /// Rows that are not occupied (already freed, never allocated, out of
    /// range) and reserved rows are skipped, so duplicates in `slots` are
    /// harmless. Releasing the last row shrinks the dense region instead
    /// of growing the free list.
    ///
    /// # Returns
    ///
    /// The number of rows actually released.
    pub fn free(&mut self, slots: &[Slot]) -> usize {
        let mut released = 0;

        for &slot in slots {
            let row = slot.index();
            if row < self.reserved || !self.is_occupied(slot) {
                continue;
            }

            self.occupied.set(row, false);
            if row + 1 == self.count {
                self.count -= 1;
            } else {
                self.free_slots.push(slot);
            }
            released += 1;
        }

        released
    }

    /// Resets to the freshly constructed state. The overflow counter is kept.
    pub fn clear(&mut self) {
        for row in self.reserved..self.count {
            self.occupied.set(row, false);
        }
        self.free_slots.clear();
        self.count = self.reserved;
    }

    /// Checks that `slot` addresses a row callers may act on.
    ///
    /// # Errors
    ///
    /// [`PoolError::Tombstone`] for a reserved row,
    /// [`PoolError::OutOfRange`] past the capacity.
    pub fn validate(&self, slot: Slot) -> PoolResult<()> {
        if slot.index() >= self.capacity {
            return Err(PoolError::OutOfRange {
                slot: slot.raw(),
                capacity: self.capacity,
            });
        }
        if slot.index() < self.reserved {
            return Err(PoolError::Tombstone);
        }
        Ok(())
    }

    /// High-water mark: rows systems iterate over.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Occupied rows, excluding reserved ones.
    #[inline]
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.count - self.reserved - self.free_slots.len()
    }

    /// Recycled rows in reuse order (last is reused first).
    #[inline]
    #[must_use]
    pub fn free_slots(&self) -> &[Slot] {
        &self.free_slots
    }

    /// Checks the occupancy bit of a row. Out of range is unoccupied.
    #[inline]
    #[must_use]
    pub fn is_occupied(&self, slot: Slot) -> bool {
        self.occupied.get(slot.index()).unwrap_or(false)
    }

    /// Maximum number of rows.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of reserved rows at the start of the pool.
    #[inline]
    #[must_use]
    pub const fn reserved(&self) -> usize {
        self.reserved
    }

    /// Checks if the next `allocate` would alias the sentinel row.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.free_slots.is_empty() && self.count >= self.capacity
    }

    /// Number of allocations that aliased the sentinel row.
    #[inline]
    #[must_use]
    pub const fn overflow_count(&self) -> u64 {
        self.overflow_count
    }

    /// Iterates over occupied, non-reserved rows in ascending order.
    pub fn live_slots(&self) -> impl Iterator<Item = Slot> + '_ {
        (self.reserved..self.count)
            .filter(|&row| self.occupied[row])
            .map(|row| Slot(row as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tombstone_pool_creation() {
        let pool = SlotPool::with_tombstone(16);
        assert_eq!(pool.count(), 1);
        assert_eq!(pool.live_count(), 0);
        assert!(pool.is_occupied(Slot::TOMBSTONE));
        assert!(pool.free_slots().is_empty());
    }

    #[test]
    fn test_allocate_bumps_count() {
        let mut pool = SlotPool::with_tombstone(16);
        assert_eq!(pool.allocate(), Slot::new(1));
        assert_eq!(pool.allocate(), Slot::new(2));
        assert_eq!(pool.count(), 3);
        assert_eq!(pool.live_count(), 2);
    }

    #[test]
    fn test_free_reuses_lifo() {
        let mut pool = SlotPool::with_tombstone(16);
        let a = pool.allocate();
        let b = pool.allocate();
        let _c = pool.allocate();

        assert_eq!(pool.free(&[a, b]), 2);
        assert_eq!(pool.free_slots(), &[a, b]);

        assert_eq!(pool.allocate(), b);
        assert_eq!(pool.allocate(), a);
        assert_eq!(pool.count(), 4);
    }

    #[test]
    fn test_free_last_row_shrinks() {
        let mut pool = SlotPool::with_tombstone(16);
        let _a = pool.allocate();
        let b = pool.allocate();

        pool.free(&[b]);
        assert_eq!(pool.count(), 2);
        assert!(pool.free_slots().is_empty());
        assert!(!pool.is_occupied(b));
        assert_eq!(pool.allocate(), b);
    }

    #[test]
    fn test_double_free_is_noop() {
        let mut pool = SlotPool::with_tombstone(16);
        let a = pool.allocate();
        let _b = pool.allocate();

        assert_eq!(pool.free(&[a, a]), 1);
        assert_eq!(pool.free_slots(), &[a]);
        assert_eq!(pool.free(&[a]), 0);
        assert_eq!(pool.free_slots(), &[a]);
    }

    #[test]
    fn test_double_free_on_shrink_path() {
        let mut pool = SlotPool::with_tombstone(16);
        let a = pool.allocate();
        let b = pool.allocate();

        pool.free(&[a]);
        // b shrinks the region, a is still on the free list below count.
        assert_eq!(pool.free(&[b, b]), 1);
        assert_eq!(pool.count(), 2);
        assert_eq!(pool.free_slots(), &[a]);
    }

    #[test]
    fn test_tombstone_never_released() {
        let mut pool = SlotPool::with_tombstone(16);
        assert_eq!(pool.free(&[Slot::TOMBSTONE]), 0);
        assert!(pool.is_occupied(Slot::TOMBSTONE));
        assert_eq!(pool.count(), 1);
    }

    #[test]
    fn test_overflow_aliases_tombstone() {
        let mut pool = SlotPool::with_tombstone(3);
        assert_eq!(pool.allocate(), Slot::new(1));
        assert_eq!(pool.allocate(), Slot::new(2));
        assert!(pool.is_full());

        assert_eq!(pool.allocate(), Slot::TOMBSTONE);
        assert_eq!(pool.overflow_count(), 1);
        assert_eq!(pool.count(), 3);
    }

    #[test]
    fn test_try_allocate_reports_full() {
        let mut pool = SlotPool::with_tombstone(2);
        assert_eq!(pool.try_allocate(), Ok(Slot::new(1)));
        assert_eq!(pool.try_allocate(), Err(PoolError::PoolFull { capacity: 2 }));
        assert_eq!(pool.overflow_count(), 0);
    }

    #[test]
    fn test_clear_resets() {
        let mut pool = SlotPool::with_tombstone(16);
        let a = pool.allocate();
        let _b = pool.allocate();
        pool.free(&[a]);

        pool.clear();
        assert_eq!(pool.count(), 1);
        assert!(pool.free_slots().is_empty());
        assert!(!pool.is_occupied(a));
        assert!(pool.is_occupied(Slot::TOMBSTONE));
    }

    #[test]
    fn test_ephemeral_pool_starts_at_zero() {
        let mut pool = SlotPool::ephemeral(4);
        assert_eq!(pool.count(), 0);
        assert_eq!(pool.allocate(), Slot::new(0));
        assert_eq!(pool.allocate(), Slot::new(1));
        pool.clear();
        assert_eq!(pool.count(), 0);
        assert_eq!(pool.allocate(), Slot::new(0));
    }

    #[test]
    fn test_validate() {
        let pool = SlotPool::with_tombstone(8);
        assert_eq!(pool.validate(Slot::new(3)), Ok(()));
        assert_eq!(pool.validate(Slot::TOMBSTONE), Err(PoolError::Tombstone));
        assert_eq!(
            pool.validate(Slot::new(8)),
            Err(PoolError::OutOfRange { slot: 8, capacity: 8 })
        );
    }

    #[test]
    fn test_live_slots_skips_free() {
        let mut pool = SlotPool::with_tombstone(16);
        let a = pool.allocate();
        let b = pool.allocate();
        let c = pool.allocate();
        pool.free(&[b]);

        let live: Vec<Slot> = pool.live_slots().collect();
        assert_eq!(live, vec![a, c]);
    }

    #[test]
    fn test_free_out_of_range_ignored() {
        let mut pool = SlotPool::with_tombstone(4);
        assert_eq!(pool.free(&[Slot::new(100)]), 0);
        assert_eq!(pool.count(), 1);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    #[should_panic(expected = "slot index range")]
    fn test_capacity_past_u32_rejected() {
        let _ = SlotPool::with_tombstone(u32::MAX as usize + 2);
    }
}
