//! Velocity reset and Euler integration.

use std::ops::Range;

use crate::components::{Position2, Velocity2};

/// Zeroes velocity on every row. Velocity is rebuilt from intent each step.
pub fn reset_velocity(velocity: &mut [Velocity2], rows: Range<usize>) {
    velocity[rows].fill(Velocity2::default());
}

/// `position += velocity * dt` on every row.
pub fn apply_forwards_velocity(
    position: &mut [Position2],
    velocity: &[Velocity2],
    rows: Range<usize>,
    dt: f32,
) {
    for (pos, vel) in position[rows.clone()].iter_mut().zip(&velocity[rows]) {
        pos.x += vel.x * dt;
        pos.y += vel.y * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_velocity_only_touches_rows() {
        let mut velocity = vec![Velocity2::new(1.0, 1.0); 4];
        reset_velocity(&mut velocity, 1..3);
        assert_eq!(velocity[0], Velocity2::new(1.0, 1.0));
        assert!(velocity[1].is_zero());
        assert!(velocity[2].is_zero());
        assert_eq!(velocity[3], Velocity2::new(1.0, 1.0));
    }

    #[test]
    fn test_forwards_velocity() {
        let mut position = vec![Position2::new(0.0, 0.0); 2];
        let velocity = vec![Velocity2::new(10.0, -4.0); 2];
        apply_forwards_velocity(&mut position, &velocity, 0..2, 0.5);
        assert_eq!(position[1], Position2::new(5.0, -2.0));
    }

    #[test]
    fn test_integration_is_linear_in_steps() {
        let velocity = vec![Velocity2::new(3.25, -7.5)];
        let dt = 1.0 / 60.0;

        let mut stepped = vec![Position2::new(1.0, 2.0)];
        for _ in 0..120 {
            apply_forwards_velocity(&mut stepped, &velocity, 0..1, dt);
        }

        let mut once = vec![Position2::new(1.0, 2.0)];
        apply_forwards_velocity(&mut once, &velocity, 0..1, dt * 120.0);

        assert!((stepped[0].x - once[0].x).abs() < 1e-3);
        assert!((stepped[0].y - once[0].y).abs() < 1e-3);
    }
}
