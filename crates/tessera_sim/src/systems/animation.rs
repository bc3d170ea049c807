//! Frame-based sprite animation.

use std::ops::Range;

use crate::components::{Animation, Clip, Velocity2};

/// Frame id to sheet rectangle lookup.
#[derive(Clone, Debug, Default)]
pub struct Tileset {
    clips: Vec<Option<Clip>>,
}

impl Tileset {
    /// Empty tileset, every frame unknown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tileset of a uniform sheet, frames numbered row-major from 0.
    #[must_use]
    pub fn from_grid(columns: u16, rows: u16, tile_w: u16, tile_h: u16) -> Self {
        let frames = (usize::from(columns) * usize::from(rows)).min(usize::from(u8::MAX) + 1);
        let clips = (0..frames)
            .map(|i| {
                let col = (i % usize::from(columns)) as u16;
                let row = (i / usize::from(columns)) as u16;
                Some(Clip::new(col * tile_w, row * tile_h, tile_w, tile_h))
            })
            .collect();
        Self { clips }
    }

    /// Assigns a rectangle to a frame id.
    pub fn insert(&mut self, frame: u8, clip: Clip) {
        let i = usize::from(frame);
        if self.clips.len() <= i {
            self.clips.resize(i + 1, None);
        }
        self.clips[i] = Some(clip);
    }

    /// Rectangle of a frame, if known.
    #[inline]
    #[must_use]
    pub fn clip(&self, frame: u8) -> Option<Clip> {
        self.clips.get(usize::from(frame)).copied().flatten()
    }
}

/// Advances the walk cycle of rows that are moving.
///
/// Elapsed time grows only while velocity is non-zero. Once it exceeds the
/// frame time it resets and the frame advances, wrapping from the last
/// frame back to the first.
pub fn progress_animation_if_moving(
    animation: &mut [Animation],
    velocity: &[Velocity2],
    rows: Range<usize>,
    dt: f32,
) {
    for (anim, vel) in animation[rows.clone()].iter_mut().zip(&velocity[rows]) {
        if !vel.is_zero() {
            anim.frame_elapsed += dt;
        }
        if anim.frame_elapsed > anim.frame_time {
            anim.frame_elapsed = 0.0;
            anim.current_frame = anim.current_frame.wrapping_add(1);
            if anim.current_frame > anim.end_frame || anim.current_frame < anim.begin_frame {
                anim.current_frame = anim.begin_frame;
            }
        }
    }
}

/// Copies each row's current frame rectangle into its clip. Unknown
/// frames leave the clip untouched.
pub fn fetch_tileset_animation(
    animation: &[Animation],
    clip: &mut [Clip],
    rows: Range<usize>,
    tileset: &Tileset,
) {
    for (anim, out) in animation[rows.clone()].iter().zip(&mut clip[rows]) {
        if let Some(c) = tileset.clip(anim.current_frame) {
            *out = c;
        }
    }
}
