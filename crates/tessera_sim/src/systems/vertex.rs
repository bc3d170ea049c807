//! Sprite quads for the per-frame vertex buffer.

use tessera_core::{Slot, Vec2};

use crate::components::{Color, TexCoord};
use crate::entities::{SpriteColumns, VertexBuffer};

/// Vertices emitted per sprite (two triangles).
pub const VERTICES_PER_SPRITE: usize = 6;

/// Appends two triangles per sprite row.
///
/// The quad is anchored bottom-centre on the sprite position and rotated
/// about its centre when the kind carries a non-zero rotation. Texture
/// coordinates are the clip divided by `texture_size`. Rows the
/// occupancy view does not hold are skipped. Stops once the buffer cannot
/// fit another sprite.
///
/// # Returns
///
/// The number of sprites written.
pub fn make_sprite_vertices(
    sprites: &SpriteColumns<'_>,
    vertices: &mut VertexBuffer,
    texture_size: Vec2,
) -> usize {
    let mut written = 0;

    for e in sprites.rows.clone() {
        if sprites
            .occupancy
            .is_some_and(|pool| !pool.is_occupied(Slot::new(e as u32)))
        {
            continue;
        }
        if vertices.remaining() < VERTICES_PER_SPRITE {
            tracing::trace!("Vertex buffer full, {} sprites written", written);
            break;
        }

        let size = sprites.size[e];
        let (w, h) = (size.w, size.h);
        let x = sprites.position[e].x - w * 0.5;
        let y = sprites.position[e].y - h;

        let mut p0 = Vec2::new(x, y);
        let mut p1 = Vec2::new(x, y + h);
        let mut p2 = Vec2::new(x + w, y);
        let mut p3 = Vec2::new(x + w, y + h);

        let rad = sprites.rotation.map_or(0.0, |r| r[e].rad);
        if rad != 0.0 {
            let origin = Vec2::new(x + w * 0.5, y + h * 0.5);
            p0 = p0.rotate_about(origin, rad);
            p1 = p1.rotate_about(origin, rad);
            p2 = p2.rotate_about(origin, rad);
            p3 = p3.rotate_about(origin, rad);
        }

        let clip = sprites.clip[e];
        let s1 = f32::from(clip.x) / texture_size.x;
        let t1 = f32::from(clip.y) / texture_size.y;
        let s2 = s1 + f32::from(clip.w) / texture_size.x;
        let t2 = t1 + f32::from(clip.h) / texture_size.y;

        let color = sprites.color.map_or(Color::WHITE, |c| c[e]);

        let quad = [
            (p0, TexCoord { s: s1, t: t1 }),
            (p1, TexCoord { s: s1, t: t2 }),
            (p2, TexCoord { s: s2, t: t1 }),
            (p1, TexCoord { s: s1, t: t2 }),
            (p3, TexCoord { s: s2, t: t2 }),
            (p2, TexCoord { s: s2, t: t1 }),
        ];
        for (position, texcoord) in quad {
            vertices.push(position, texcoord, color);
        }
        written += 1;
    }

    written
}
