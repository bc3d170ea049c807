//! Movement intent: pursuit, straight-line flight and conversion to velocity.

use std::ops::Range;

use tessera_core::{Slot, Vec2};

use crate::components::{Movement2, Position2, Rotation, Speed, Velocity2};

/// Adds `normalize(movement) * speed` to velocity. Zero intent adds nothing.
pub fn movement_to_velocity(
    movement: &[Movement2],
    speed: &[Speed],
    velocity: &mut [Velocity2],
    rows: Range<usize>,
) {
    for e in rows {
        let dir = movement[e].to_vec2().normalize_or_zero();
        let s = speed[e].val;
        velocity[e].x += dir.x * s;
        velocity[e].y += dir.y * s;
    }
}

/// Bang-bang pursuit of one target row.
///
/// Each axis of the follower's intent becomes `-1` or `+1` toward the
/// target; an axis on which the follower is level with the target keeps
/// its previous intent. Does nothing if `target_slot` is out of range.
pub fn follow_one_target(
    movement: &mut [Movement2],
    position: &[Position2],
    rows: Range<usize>,
    target_position: &[Position2],
    target_slot: Slot,
) {
    let Some(target) = target_position.get(target_slot.index()).copied() else {
        return;
    };

    for f in rows {
        let follower = position[f];
        movement[f].x = chase_axis(follower.x, target.x, movement[f].x);
        movement[f].y = chase_axis(follower.y, target.y, movement[f].y);
    }
}

#[inline]
fn chase_axis(follower: f32, target: f32, current: f32) -> f32 {
    if follower > target {
        -1.0
    } else if follower < target {
        1.0
    } else {
        current
    }
}

/// Sets intent to the unit vector of each row's rotation.
pub fn forward_movement_from_rotation(
    movement: &mut [Movement2],
    rotation: &[Rotation],
    rows: Range<usize>,
) {
    for (intent, rot) in movement[rows.clone()].iter_mut().zip(&rotation[rows]) {
        *intent = Vec2::from_angle(rot.rad).into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_normalized_then_scaled() {
        let movement = [Movement2::new(1.0, 1.0), Movement2::new(0.0, 0.0)];
        let speed = [Speed { val: 10.0 }, Speed { val: 10.0 }];
        let mut velocity = [Velocity2::default(); 2];

        movement_to_velocity(&movement, &speed, &mut velocity, 0..2);

        let expected = 10.0 / 2.0_f32.sqrt();
        assert!((velocity[0].x - expected).abs() < 1e-5);
        assert!((velocity[0].y - expected).abs() < 1e-5);
        assert!(velocity[1].is_zero());
    }

    #[test]
    fn test_movement_accumulates_into_velocity() {
        let movement = [Movement2::new(2.0, 0.0)];
        let speed = [Speed { val: 3.0 }];
        let mut velocity = [Velocity2::new(1.0, 1.0)];
        movement_to_velocity(&movement, &speed, &mut velocity, 0..1);
        assert_eq!(velocity[0], Velocity2::new(4.0, 1.0));
    }

    #[test]
    fn test_follow_sets_unit_axes() {
        let target = [Position2::default(), Position2::new(100.0, 50.0)];
        let position = [
            Position2::default(),
            Position2::new(0.0, 80.0),
            Position2::new(200.0, 10.0),
        ];
        let mut movement = [Movement2::default(); 3];

        follow_one_target(&mut movement, &position, 1..3, &target, Slot::new(1));

        assert_eq!(movement[1], Movement2::new(1.0, -1.0));
        assert_eq!(movement[2], Movement2::new(-1.0, 1.0));
        assert_eq!(movement[0], Movement2::default());
    }

    #[test]
    fn test_follow_tie_keeps_intent() {
        let target = [Position2::new(5.0, 5.0)];
        let position = [Position2::new(5.0, 0.0)];
        let mut movement = [Movement2::new(0.25, 0.0)];

        follow_one_target(&mut movement, &position, 0..1, &target, Slot::new(0));

        assert_eq!(movement[0], Movement2::new(0.25, 1.0));
    }

    #[test]
    fn test_follow_missing_target_is_noop() {
        let position = [Position2::new(5.0, 0.0)];
        let mut movement = [Movement2::new(0.5, 0.5)];
        follow_one_target(&mut movement, &position, 0..1, &[], Slot::new(3));
        assert_eq!(movement[0], Movement2::new(0.5, 0.5));
    }

    #[test]
    fn test_forward_from_rotation() {
        let rotation = [Rotation {
            rad: std::f32::consts::PI,
        }];
        let mut movement = [Movement2::default()];
        forward_movement_from_rotation(&mut movement, &rotation, 0..1);
        assert!((movement[0].x + 1.0).abs() < 1e-6);
        assert!(movement[0].y.abs() < 1e-6);
    }
}
