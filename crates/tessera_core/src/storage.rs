//! # Component Columns
//!
//! One pre-allocated, fixed-capacity array per attribute, indexed by [`Slot`].
//!
//! - All rows are allocated at creation
//! - Access is O(1) via slot index
//! - Systems iterate `as_slice()[..count]` contiguously

use std::ops::{Index, IndexMut};

use bytemuck::{Pod, Zeroable};

use crate::pool::Slot;

/// Marker trait for column element types.
///
/// Elements must be:
/// - `Pod`: Plain old data, no heap ownership
/// - `Zeroable`: Freed rows are zeroed
/// - `Default`: Value used for pre-allocation
pub trait Component: Copy + Pod + Zeroable + Default + Send + Sync + 'static {}

impl<T> Component for T where T: Copy + Pod + Zeroable + Default + Send + Sync + 'static {}

/// Fixed-capacity array of one attribute.
///
/// # Example
///
/// ```rust,ignore
/// let mut health: Column<f32> = Column::new(SOA_LIMIT);
/// health.set(slot, 100.0);
/// ```
#[derive(Clone, Debug)]
pub struct Column<T: Component> {
    data: Box<[T]>,
}

impl<T: Component> Column<T> {
    /// Creates a column with every row at `T::default()`.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        Self {
            data: vec![T::default(); capacity].into_boxed_slice(),
        }
    }

    /// Returns the capacity of this column.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Gets the value at a row, or None if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, slot: Slot) -> Option<&T> {
        self.data.get(slot.index())
    }

    /// Gets the value at a row mutably, or None if out of bounds.
    #[inline]
    pub fn get_mut(&mut self, slot: Slot) -> Option<&mut T> {
        self.data.get_mut(slot.index())
    }

    /// Overwrites a row.
    ///
    /// # Returns
    ///
    /// `true` if the value was written, `false` if the slot was out of bounds.
    #[inline]
    pub fn set(&mut self, slot: Slot, value: T) -> bool {
        if let Some(row) = self.data.get_mut(slot.index()) {
            *row = value;
            true
        } else {
            false
        }
    }

    /// Writes all-zero bytes to a row.
    #[inline]
    pub fn zero(&mut self, slot: Slot) {
        if let Some(row) = self.data.get_mut(slot.index()) {
            *row = T::zeroed();
        }
    }

    /// Returns every row.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns every row mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Resets every row to `T::default()`.
    pub fn clear(&mut self) {
        self.data.fill(T::default());
    }
}

impl<T: Component> Index<Slot> for Column<T> {
    type Output = T;

    #[inline]
    fn index(&self, slot: Slot) -> &T {
        &self.data[slot.index()]
    }
}

impl<T: Component> IndexMut<Slot> for Column<T> {
    #[inline]
    fn index_mut(&mut self, slot: Slot) -> &mut T {
        &mut self.data[slot.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_creation() {
        let column: Column<f32> = Column::new(1000);
        assert_eq!(column.capacity(), 1000);
        assert!(column.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_column_get_set() {
        let mut column: Column<[f32; 2]> = Column::new(100);
        assert!(column.set(Slot::new(50), [1.0, 2.0]));
        assert_eq!(column.get(Slot::new(50)), Some(&[1.0, 2.0]));
        assert_eq!(column[Slot::new(50)], [1.0, 2.0]);
    }

    #[test]
    fn test_column_bounds() {
        let mut column: Column<u32> = Column::new(100);
        assert!(column.get(Slot::new(100)).is_none());
        assert!(column.get(Slot::new(99)).is_some());
        assert!(!column.set(Slot::new(100), 7));
    }

    #[test]
    fn test_column_zero_and_clear() {
        let mut column: Column<u32> = Column::new(4);
        column.set(Slot::new(1), 9);
        column.set(Slot::new(2), 9);

        column.zero(Slot::new(1));
        assert_eq!(column[Slot::new(1)], 0);

        column.clear();
        assert!(column.as_slice().iter().all(|&v| v == 0));
    }
}
