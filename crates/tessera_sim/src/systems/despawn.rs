//! Removal predicates.
//!
//! Both scans are single-pass and write a compacted slot list into a
//! caller-owned buffer, cleared first. The caller frees the returned slots
//! through the owning kind before the next allocation.

use std::ops::Range;

use tessera_core::Slot;

use crate::components::{Destination2, Health, Position2};

/// Reach distance used by the shooter for bullets.
pub const DEFAULT_REACH_DISTANCE: f32 = 10.0;

/// Rows whose distance to their destination is below `reach_distance`.
pub fn destination_reached_slots(
    position: &[Position2],
    destination: &[Destination2],
    rows: Range<usize>,
    reach_distance: f32,
    out: &mut Vec<Slot>,
) {
    out.clear();
    for e in rows {
        let distance = position[e].to_vec2().distance(destination[e].to_vec2());
        if distance < reach_distance {
            out.push(Slot::new(e as u32));
        }
    }
}

/// Rows with health at or below zero.
pub fn dead_slots(health: &[Health], rows: Range<usize>, out: &mut Vec<Slot>) {
    out.clear();
    for e in rows {
        if health[e].val <= 0.0 {
            out.push(Slot::new(e as u32));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_reached() {
        let position = [
            Position2::new(0.0, 0.0),
            Position2::new(0.0, 0.0),
            Position2::new(5.0, 5.0),
        ];
        let destination = [
            Destination2::new(0.0, 0.0),
            Destination2::new(10.0, 0.0),
            Destination2::new(9.0, 8.0),
        ];
        let mut out = vec![Slot::new(99)];

        destination_reached_slots(&position, &destination, 1..3, 10.0, &mut out);

        // Exactly at the reach distance is not reached.
        assert_eq!(out, vec![Slot::new(2)]);
    }

    #[test]
    fn test_dead_slots() {
        let health = [
            Health { val: 0.0 },
            Health { val: 0.0 },
            Health { val: 1.0 },
            Health { val: -5.0 },
        ];
        let mut out = Vec::new();
        dead_slots(&health, 1..4, &mut out);
        assert_eq!(out, vec![Slot::new(1), Slot::new(3)]);
    }

    #[test]
    fn test_empty_rows() {
        let mut out = vec![Slot::new(1)];
        dead_slots(&[], 0..0, &mut out);
        assert!(out.is_empty());
    }
}
