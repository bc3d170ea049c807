//! # Component Schemas
//!
//! The one canonical set of 2D attributes. Every entity kind composes its
//! columns from these; all of them are plain `Pod` data so freed rows can
//! be zeroed byte-wise.

use bytemuck::{Pod, Zeroable};
use tessera_core::Vec2;

macro_rules! planar_component {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
        #[repr(C)]
        pub struct $name {
            /// X component.
            pub x: f32,
            /// Y component.
            pub y: f32,
        }

        impl $name {
            /// Creates a new value.
            #[inline]
            #[must_use]
            pub const fn new(x: f32, y: f32) -> Self {
                Self { x, y }
            }

            /// Views this value as a vector.
            #[inline]
            #[must_use]
            pub const fn to_vec2(self) -> Vec2 {
                Vec2::new(self.x, self.y)
            }

            /// Checks if both components are zero.
            #[inline]
            #[must_use]
            pub fn is_zero(self) -> bool {
                self.x == 0.0 && self.y == 0.0
            }
        }

        impl From<Vec2> for $name {
            #[inline]
            fn from(v: Vec2) -> Self {
                Self::new(v.x, v.y)
            }
        }
    };
}

planar_component!(
    /// World-space anchor of an entity.
    Position2
);
planar_component!(
    /// Units per second, recomputed from intent every step.
    Velocity2
);
planar_component!(
    /// Movement intent: a direction, normalized when converted to velocity.
    Movement2
);
planar_component!(
    /// Aim point a bullet travels toward.
    Destination2
);

/// Width and height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Size2 {
    /// Width.
    pub w: f32,
    /// Height.
    pub h: f32,
}

impl Size2 {
    /// Creates a new size.
    #[must_use]
    pub const fn new(w: f32, h: f32) -> Self {
        Self { w, h }
    }
}

/// Scalar speed in units per second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Speed {
    /// Value.
    pub val: f32,
}

/// Facing angle in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Rotation {
    /// Radians.
    pub rad: f32,
}

/// Hit points. May go negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Health {
    /// Value.
    pub val: f32,
}

/// Damage dealt on hit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Damage {
    /// Value.
    pub val: f32,
}

/// Looping sprite animation over an inclusive frame range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Animation {
    /// First frame of the loop.
    pub begin_frame: u8,
    /// Last frame of the loop (inclusive).
    pub end_frame: u8,
    /// Frame shown now.
    pub current_frame: u8,
    /// Padding for alignment.
    pub _padding: u8,
    /// Seconds spent on the current frame.
    pub frame_elapsed: f32,
    /// Seconds per frame.
    pub frame_time: f32,
}

impl Animation {
    /// Creates an animation positioned on its first frame.
    #[must_use]
    pub const fn new(begin_frame: u8, end_frame: u8, frame_time: f32) -> Self {
        Self {
            begin_frame,
            end_frame,
            current_frame: begin_frame,
            _padding: 0,
            frame_elapsed: 0.0,
            frame_time,
        }
    }

    /// Single still frame.
    #[must_use]
    pub const fn still(frame: u8) -> Self {
        Self::new(frame, frame, 0.0)
    }

    /// Same loop, rewound to the first frame.
    #[must_use]
    pub const fn rewound(self) -> Self {
        Self::new(self.begin_frame, self.end_frame, self.frame_time)
    }
}

/// Source rectangle in the sprite sheet, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Clip {
    /// Left.
    pub x: u16,
    /// Top.
    pub y: u16,
    /// Width.
    pub w: u16,
    /// Height.
    pub h: u16,
}

impl Clip {
    /// Creates a new clip.
    #[must_use]
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }
}

/// RGBA tint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Opaque white (no tint).
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Creates a new color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Normalized texture coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct TexCoord {
    /// Horizontal.
    pub s: f32,
    /// Vertical.
    pub t: f32,
}
