//! # Entity Kinds
//!
//! Each kind owns one [`SlotPool`] and the columns indexed by it. The pool
//! and its columns are created, mutated and dropped together.
//!
//! Construction goes through a plain descriptor; destruction zeroes the
//! fields that would let a released row collide, move or deal damage
//! before handing the slot back to the pool.

use std::ops::Range;

use tessera_core::{Column, PoolResult, Slot, SlotPool, Vec2};

use crate::components::{
    Animation, Clip, Color, Damage, Destination2, Health, Movement2, Position2, Rotation, Size2,
    Speed, TexCoord, Velocity2,
};

/// Read-only view of the columns a sprite is built from.
#[derive(Clone, Debug)]
pub struct SpriteColumns<'a> {
    /// Anchor positions.
    pub position: &'a [Position2],
    /// Sprite sizes.
    pub size: &'a [Size2],
    /// Sheet rectangles.
    pub clip: &'a [Clip],
    /// Rotation about the sprite centre, if the kind has one.
    pub rotation: Option<&'a [Rotation]>,
    /// Tint, if the kind has one. Defaults to white.
    pub color: Option<&'a [Color]>,
    /// Rows to emit.
    pub rows: Range<usize>,
    /// Allocator of the kind; rows it does not hold are skipped.
    pub occupancy: Option<&'a SlotPool>,
}

// =============================================================================
// CHARACTER
// =============================================================================

/// Descriptor for a player or monster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacterDesc {
    /// Spawn position.
    pub position: Vec2,
    /// Sprite and hitbox size.
    pub size: Size2,
    /// Units per second at full intent.
    pub speed: f32,
    /// Starting hit points.
    pub health: f32,
    /// Contact damage.
    pub damage: f32,
    /// Walk cycle.
    pub animation: Animation,
    /// Tint.
    pub color: Color,
}

impl Default for CharacterDesc {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            size: Size2::new(32.0, 32.0),
            speed: 0.0,
            health: 100.0,
            damage: 0.0,
            animation: Animation::still(0),
            color: Color::WHITE,
        }
    }
}

/// Characters: the player and monsters, one pool each.
#[derive(Clone, Debug)]
pub struct Character {
    pool: SlotPool,
    /// Anchor position.
    pub position: Column<Position2>,
    /// Hitbox and sprite size.
    pub size: Column<Size2>,
    /// Per-step velocity.
    pub velocity: Column<Velocity2>,
    /// Scalar speed.
    pub speed: Column<Speed>,
    /// Movement intent.
    pub movement: Column<Movement2>,
    /// Walk cycle state.
    pub animation: Column<Animation>,
    /// Current sheet rectangle.
    pub clip: Column<Clip>,
    /// Hit points.
    pub health: Column<Health>,
    /// Contact damage.
    pub damage: Column<Damage>,
    /// Tint.
    pub color: Column<Color>,
}

impl Character {
    /// Creates an empty kind with a tombstone row.
    ///
    /// # Panics
    ///
    /// Panics if capacity leaves no room past the tombstone.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            pool: SlotPool::with_tombstone(capacity),
            position: Column::new(capacity),
            size: Column::new(capacity),
            velocity: Column::new(capacity),
            speed: Column::new(capacity),
            movement: Column::new(capacity),
            animation: Column::new(capacity),
            clip: Column::new(capacity),
            health: Column::new(capacity),
            damage: Column::new(capacity),
            color: Column::new(capacity),
        }
    }

    /// Spawns a character. At capacity the descriptor lands on the tombstone
    /// row and [`Slot::TOMBSTONE`] is returned.
    pub fn spawn(&mut self, desc: &CharacterDesc) -> Slot {
        let slot = self.pool.allocate();
        self.write(slot, desc);
        slot
    }

    /// Spawns a character, or reports that the kind is full.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::PoolFull` at capacity.
    pub fn try_spawn(&mut self, desc: &CharacterDesc) -> PoolResult<Slot> {
        let slot = self.pool.try_allocate()?;
        self.write(slot, desc);
        Ok(slot)
    }

    fn write(&mut self, slot: Slot, desc: &CharacterDesc) {
        self.position.set(slot, desc.position.into());
        self.size.set(slot, desc.size);
        self.velocity.set(slot, Velocity2::default());
        self.speed.set(slot, Speed { val: desc.speed });
        self.movement.set(slot, Movement2::default());
        self.animation.set(slot, desc.animation.rewound());
        self.clip.set(slot, Clip::default());
        self.health.set(slot, Health { val: desc.health });
        self.damage.set(slot, Damage { val: desc.damage });
        self.color.set(slot, desc.color);
    }

    /// Releases a batch of characters.
    ///
    /// # Returns
    ///
    /// The number of rows actually released.
    pub fn free(&mut self, slots: &[Slot]) -> usize {
        for &slot in slots {
            if self.pool.validate(slot).is_ok() && self.pool.is_occupied(slot) {
                self.size.zero(slot);
                self.damage.zero(slot);
                self.speed.zero(slot);
                self.velocity.zero(slot);
                self.movement.zero(slot);
            }
        }
        self.pool.free(slots)
    }

    /// High-water mark of the dense region.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> usize {
        self.pool.count()
    }

    /// Rows systems iterate over, tombstone excluded.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> Range<usize> {
        self.pool.reserved()..self.pool.count()
    }

    /// The slot allocator.
    #[inline]
    #[must_use]
    pub const fn pool(&self) -> &SlotPool {
        &self.pool
    }

    /// Sprite view of every row.
    #[must_use]
    pub fn sprites(&self) -> SpriteColumns<'_> {
        SpriteColumns {
            position: self.position.as_slice(),
            size: self.size.as_slice(),
            clip: self.clip.as_slice(),
            rotation: None,
            color: Some(self.color.as_slice()),
            rows: self.rows(),
            occupancy: Some(&self.pool),
        }
    }
}

// =============================================================================
// BULLET
// =============================================================================

/// Descriptor for a projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulletDesc {
    /// Muzzle position.
    pub position: Vec2,
    /// Aim point.
    pub destination: Vec2,
    /// Sprite size.
    pub size: Size2,
    /// Units per second.
    pub speed: f32,
    /// Damage on hit.
    pub damage: f32,
    /// Flight animation.
    pub animation: Animation,
}

/// Projectiles travelling in a straight line toward their destination.
#[derive(Clone, Debug)]
pub struct Bullet {
    pool: SlotPool,
    /// Current point.
    pub position: Column<Position2>,
    /// Sprite size.
    pub size: Column<Size2>,
    /// Per-step velocity.
    pub velocity: Column<Velocity2>,
    /// Launch angle.
    pub rotation: Column<Rotation>,
    /// Aim point.
    pub destination: Column<Destination2>,
    /// Scalar speed.
    pub speed: Column<Speed>,
    /// Movement intent.
    pub movement: Column<Movement2>,
    /// Flight animation.
    pub animation: Column<Animation>,
    /// Current sheet rectangle.
    pub clip: Column<Clip>,
    /// Damage on hit.
    pub damage: Column<Damage>,
}

impl Bullet {
    /// Creates an empty kind with a tombstone row.
    ///
    /// # Panics
    ///
    /// Panics if capacity leaves no room past the tombstone.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            pool: SlotPool::with_tombstone(capacity),
            position: Column::new(capacity),
            size: Column::new(capacity),
            velocity: Column::new(capacity),
            rotation: Column::new(capacity),
            destination: Column::new(capacity),
            speed: Column::new(capacity),
            movement: Column::new(capacity),
            animation: Column::new(capacity),
            clip: Column::new(capacity),
            damage: Column::new(capacity),
        }
    }

    /// Spawns a bullet facing its destination. At capacity the descriptor
    /// lands on the tombstone row and [`Slot::TOMBSTONE`] is returned.
    pub fn spawn(&mut self, desc: &BulletDesc) -> Slot {
        let slot = self.pool.allocate();
        self.write(slot, desc);
        slot
    }

    /// Spawns a bullet, or reports that the kind is full.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::PoolFull` at capacity.
    pub fn try_spawn(&mut self, desc: &BulletDesc) -> PoolResult<Slot> {
        let slot = self.pool.try_allocate()?;
        self.write(slot, desc);
        Ok(slot)
    }

    fn write(&mut self, slot: Slot, desc: &BulletDesc) {
        self.position.set(slot, desc.position.into());
        self.size.set(slot, desc.size);
        self.velocity.set(slot, Velocity2::default());
        self.rotation.set(
            slot,
            Rotation {
                rad: desc.destination.angle_from(desc.position),
            },
        );
        self.destination.set(slot, desc.destination.into());
        self.speed.set(slot, Speed { val: desc.speed });
        self.movement.set(slot, Movement2::default());
        self.animation.set(slot, desc.animation.rewound());
        self.clip.set(slot, Clip::default());
        self.damage.set(slot, Damage { val: desc.damage });
    }

    /// Releases a batch of bullets.
    ///
    /// # Returns
    ///
    /// The number of rows actually released.
    pub fn free(&mut self, slots: &[Slot]) -> usize {
        for &slot in slots {
            if self.pool.validate(slot).is_ok() && self.pool.is_occupied(slot) {
                self.size.zero(slot);
                self.damage.zero(slot);
                self.speed.zero(slot);
                self.velocity.zero(slot);
                self.movement.zero(slot);
            }
        }
        self.pool.free(slots)
    }

    /// High-water mark of the dense region.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> usize {
        self.pool.count()
    }

    /// Rows systems iterate over, tombstone excluded.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> Range<usize> {
        self.pool.reserved()..self.pool.count()
    }

    /// The slot allocator.
    #[inline]
    #[must_use]
    pub const fn pool(&self) -> &SlotPool {
        &self.pool
    }

    /// Sprite view of every row.
    #[must_use]
    pub fn sprites(&self) -> SpriteColumns<'_> {
        SpriteColumns {
            position: self.position.as_slice(),
            size: self.size.as_slice(),
            clip: self.clip.as_slice(),
            rotation: Some(self.rotation.as_slice()),
            color: None,
            rows: self.rows(),
            occupancy: Some(&self.pool),
        }
    }
}

// =============================================================================
// VERTEX BUFFER
// =============================================================================

/// Per-frame sprite geometry. Fully rebuilt every frame, never freed row
/// by row.
#[derive(Clone, Debug)]
pub struct VertexBuffer {
    pool: SlotPool,
    /// Screen-space corner.
    pub position: Column<Position2>,
    /// Texture coordinate.
    pub texcoord: Column<TexCoord>,
    /// Tint.
    pub color: Column<Color>,
}

impl VertexBuffer {
    /// Creates an empty buffer starting at row 0.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            pool: SlotPool::ephemeral(capacity),
            position: Column::new(capacity),
            texcoord: Column::new(capacity),
            color: Column::new(capacity),
        }
    }

    /// Appends one vertex. Returns `None` when the buffer is full.
    pub fn push(&mut self, position: Vec2, texcoord: TexCoord, color: Color) -> Option<Slot> {
        let slot = self.pool.try_allocate().ok()?;
        self.position.set(slot, position.into());
        self.texcoord.set(slot, texcoord);
        self.color.set(slot, color);
        Some(slot)
    }

    /// Drops every vertex.
    pub fn clear(&mut self) {
        self.pool.clear();
    }

    /// Number of vertices written this frame.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> usize {
        self.pool.count()
    }

    /// Vertices that still fit.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.pool.capacity() - self.pool.count()
    }

    /// The slot allocator.
    #[inline]
    #[must_use]
    pub const fn pool(&self) -> &SlotPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monster() -> CharacterDesc {
        CharacterDesc {
            position: Vec2::new(10.0, 20.0),
            speed: 200.0,
            health: 100.0,
            damage: 5.0,
            animation: Animation::new(2, 4, 0.1),
            ..CharacterDesc::default()
        }
    }

    #[test]
    fn test_character_spawn_writes_every_column() {
        let mut chars = Character::new(8);
        let slot = chars.spawn(&monster());

        assert_eq!(slot, Slot::new(1));
        assert_eq!(chars.position[slot], Position2::new(10.0, 20.0));
        assert_eq!(chars.size[slot], Size2::new(32.0, 32.0));
        assert_eq!(chars.speed[slot].val, 200.0);
        assert_eq!(chars.health[slot].val, 100.0);
        assert_eq!(chars.damage[slot].val, 5.0);
        assert_eq!(chars.animation[slot].current_frame, 2);
        assert_eq!(chars.rows(), 1..2);
    }

    #[test]
    fn test_character_free_zeroes_dangerous_fields() {
        let mut chars = Character::new(8);
        let a = chars.spawn(&monster());
        let _b = chars.spawn(&monster());

        assert_eq!(chars.free(&[a]), 1);
        assert_eq!(chars.size[a], Size2::default());
        assert_eq!(chars.damage[a], Damage::default());
        assert_eq!(chars.speed[a], Speed::default());
        assert!(!chars.pool().is_occupied(a));
    }

    #[test]
    fn test_character_free_keeps_tombstone() {
        let mut chars = Character::new(8);
        chars.size.set(Slot::TOMBSTONE, Size2::new(1.0, 1.0));
        assert_eq!(chars.free(&[Slot::TOMBSTONE]), 0);
        assert_eq!(chars.size[Slot::TOMBSTONE], Size2::new(1.0, 1.0));
    }

    #[test]
    fn test_character_try_spawn_full() {
        let mut chars = Character::new(2);
        assert!(chars.try_spawn(&monster()).is_ok());
        assert!(chars.try_spawn(&monster()).is_err());
        assert_eq!(chars.spawn(&monster()), Slot::TOMBSTONE);
        assert_eq!(chars.pool().overflow_count(), 1);
    }

    #[test]
    fn test_bullet_rotation_faces_destination() {
        let mut bullets = Bullet::new(8);
        let slot = bullets.spawn(&BulletDesc {
            position: Vec2::new(0.0, 0.0),
            destination: Vec2::new(0.0, 50.0),
            size: Size2::new(8.0, 8.0),
            speed: 600.0,
            damage: 50.0,
            animation: Animation::still(0),
        });

        let rad = bullets.rotation[slot].rad;
        assert!((rad - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(bullets.destination[slot], Destination2::new(0.0, 50.0));
    }

    #[test]
    fn test_bullet_free_stops_the_row() {
        let mut bullets = Bullet::new(8);
        let desc = BulletDesc {
            position: Vec2::new(0.0, 0.0),
            destination: Vec2::new(100.0, 0.0),
            size: Size2::new(8.0, 8.0),
            speed: 600.0,
            damage: 50.0,
            animation: Animation::still(0),
        };
        let a = bullets.spawn(&desc);
        let _b = bullets.spawn(&desc);

        assert_eq!(bullets.free(&[a]), 1);
        assert_eq!(bullets.speed[a], Speed::default());
        assert_eq!(bullets.damage[a], Damage::default());
        assert_eq!(bullets.size[a], Size2::default());
        // Hole inside the dense region, still iterated.
        assert_eq!(bullets.rows(), 1..3);
    }

    #[test]
    fn test_vertex_buffer_clear_and_capacity() {
        let mut vertices = VertexBuffer::new(2);
        assert_eq!(
            vertices.push(Vec2::ZERO, TexCoord::default(), Color::WHITE),
            Some(Slot::new(0))
        );
        assert!(vertices
            .push(Vec2::ZERO, TexCoord::default(), Color::WHITE)
            .is_some());
        assert!(vertices
            .push(Vec2::ZERO, TexCoord::default(), Color::WHITE)
            .is_none());
        assert_eq!(vertices.remaining(), 0);

        vertices.clear();
        assert_eq!(vertices.count(), 0);
        assert_eq!(vertices.remaining(), 2);
    }
}
