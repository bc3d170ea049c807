//! # Tile Terrain
//!
//! Layered tile grids and the derived per-cell walking-speed buffer used
//! for terrain collision. A cell's speed is the minimum over its layers
//! (1.0 where no layer has a tile); 0.0 blocks movement entirely.

use tessera_core::{Slot, Vec2};

use crate::components::{Position2, Velocity2};

/// Tile identifier, an index into a [`TileProperties`] table.
pub type TileId = u8;

/// Number of distinct tile ids.
pub const TILE_ID_COUNT: usize = 256;

/// Walking-speed multiplier per tile id.
#[derive(Clone, Debug)]
pub struct TileProperties {
    walking_speed: Box<[f32; TILE_ID_COUNT]>,
}

impl Default for TileProperties {
    fn default() -> Self {
        Self {
            walking_speed: Box::new([1.0; TILE_ID_COUNT]),
        }
    }
}

impl TileProperties {
    /// Table where every tile is walkable at full speed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one tile's multiplier, builder style.
    #[must_use]
    pub fn with(mut self, tile: TileId, walking_speed: f32) -> Self {
        self.set(tile, walking_speed);
        self
    }

    /// Sets one tile's multiplier.
    pub fn set(&mut self, tile: TileId, walking_speed: f32) {
        self.walking_speed[usize::from(tile)] = walking_speed;
    }

    /// Multiplier of a tile.
    #[inline]
    #[must_use]
    pub fn walking_speed(&self, tile: TileId) -> f32 {
        self.walking_speed[usize::from(tile)]
    }
}

/// Row-major layered tile grid.
#[derive(Clone, Debug)]
pub struct Tilemap {
    width: u32,
    height: u32,
    layers: Vec<Vec<Option<TileId>>>,
    collision: Vec<f32>,
}

impl Tilemap {
    /// Builds a map from layers of `width * height` cells.
    ///
    /// # Returns
    ///
    /// `None` if any layer has the wrong number of cells. The collision
    /// buffer starts fully walkable until [`Self::rebuild_collision_buffer`].
    #[must_use]
    pub fn from_layers(width: u32, height: u32, layers: Vec<Vec<Option<TileId>>>) -> Option<Self> {
        let cells = width as usize * height as usize;
        if layers.iter().any(|layer| layer.len() != cells) {
            return None;
        }
        Some(Self {
            width,
            height,
            layers,
            collision: vec![1.0; cells],
        })
    }

    /// Recomputes every cell's walking speed as the minimum over its layers.
    pub fn rebuild_collision_buffer(&mut self, properties: &TileProperties) {
        self.collision.fill(1.0);
        for layer in &self.layers {
            for (speed, tile) in self.collision.iter_mut().zip(layer) {
                if let Some(tile) = *tile {
                    *speed = speed.min(properties.walking_speed(tile));
                }
            }
        }
    }

    /// Walking speed at a tile coordinate; 0.0 off the map.
    #[inline]
    #[must_use]
    pub fn walking_speed_at(&self, tile_x: i32, tile_y: i32) -> f32 {
        self.offset(tile_x, tile_y)
            .map_or(0.0, |offset| self.collision[offset])
    }

    /// Tile of one layer at a coordinate.
    #[must_use]
    pub fn tile(&self, layer: usize, tile_x: i32, tile_y: i32) -> Option<TileId> {
        let offset = self.offset(tile_x, tile_y)?;
        self.layers.get(layer)?.get(offset).copied().flatten()
    }

    fn offset(&self, tile_x: i32, tile_y: i32) -> Option<usize> {
        let x = u32::try_from(tile_x).ok()?;
        let y = u32::try_from(tile_y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Width in tiles.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in tiles.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of layers.
    #[inline]
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Derived walking-speed buffer, row-major.
    #[inline]
    #[must_use]
    pub fn collision_buffer(&self) -> &[f32] {
        &self.collision
    }
}

/// World position of a tile's origin corner.
#[must_use]
pub fn tile_position_to_position(tile_x: i32, tile_y: i32, tile_size: Vec2) -> Vec2 {
    Vec2::new(tile_x as f32 * tile_size.x, tile_y as f32 * tile_size.y)
}

/// Scales one row's velocity by the walking speed of the tile it would
/// occupy after the next integration step.
pub fn multiply_velocity_by_future_tile_speed(
    position: &[Position2],
    velocity: &mut [Velocity2],
    slot: Slot,
    tilemap: &Tilemap,
    tile_size: Vec2,
    dt: f32,
) {
    let e = slot.index();
    let (Some(pos), Some(vel)) = (position.get(e), velocity.get_mut(e)) else {
        return;
    };

    let future_x = pos.x + vel.x * dt;
    let future_y = pos.y + vel.y * dt;
    let tile_x = (future_x / tile_size.x).floor() as i32;
    let tile_y = (future_y / tile_size.y).floor() as i32;

    let speed = tilemap.walking_speed_at(tile_x, tile_y);
    vel.x *= speed;
    vel.y *= speed;
}
