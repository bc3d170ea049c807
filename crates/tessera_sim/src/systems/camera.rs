//! 2D camera helpers.

use std::ops::Range;

use tessera_core::Vec2;

use crate::components::Position2;

/// Top-left world corner of a viewport centred on `center`.
#[must_use]
pub fn camera_center_offset(viewport: Vec2, center: Vec2) -> Vec2 {
    Vec2::new(center.x - viewport.x / 2.0, center.y - viewport.y / 2.0)
}

/// Converts world positions to screen space in place.
pub fn apply_camera_2d(position: &mut [Position2], rows: Range<usize>, camera: Vec2) {
    for p in &mut position[rows] {
        p.x -= camera.x;
        p.y -= camera.y;
    }
}
