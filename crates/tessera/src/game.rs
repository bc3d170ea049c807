//! # TESSERA Game
//!
//! Owns every entity kind and runs the fixed-order systems pass once per
//! simulation step:
//!
//! ```text
//! Step:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. INTENT                                                           │
//! │    ├─ Reset velocities (player, monsters, bullets)                  │
//! │    ├─ Monsters chase the player                                     │
//! │    └─ Bullets fly along their rotation                              │
//! │                                                                     │
//! │ 2. MOTION                                                           │
//! │    ├─ Intent × speed → velocity                                     │
//! │    ├─ Player velocity × future tile speed                           │
//! │    └─ Integrate positions                                           │
//! │                                                                     │
//! │ 3. ANIMATION                                                        │
//! │    ├─ Walk cycles advance while moving                              │
//! │    └─ Frame → sheet clip                                            │
//! │                                                                     │
//! │ 4. DESPAWN                                                          │
//! │    ├─ Bullets at their destination → free                           │
//! │    └─ Monsters at or below zero health → free                       │
//! │                                                                     │
//! │ 5. COLLISION                                                        │
//! │    ├─ Monsters vs bullets                                           │
//! │    ├─ Apply damage                                                  │
//! │    └─ Free bullets that hit                                         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A monster brought to zero health in step 5 is removed by step 4 of the
//! next pass.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use tessera_core::{FixedTimestep, Rect, Slot, Vec2, TOMBSTONE_COUNT};
use tessera_sim::components::{Color, Movement2, Size2};
use tessera_sim::systems::{self, CollisionDetector, ProjectileColumns, TargetColumns, Tilemap};
use tessera_sim::{Bullet, BulletDesc, Character, CharacterDesc, Collisions, VertexBuffer};

use crate::config::GameConfig;
use crate::error::GameResult;
use crate::events::{
    EntityKind, EventBus, EventReceiver, GameEvent, InputEvent, Key, PointerButton,
};
use crate::level::Level;

/// Lifetime counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GameStats {
    /// Systems passes run.
    pub steps: u64,
    /// Monsters spawned, level monsters included.
    pub monsters_spawned: u64,
    /// Monsters despawned at zero health.
    pub monsters_killed: u64,
    /// Bullets spawned.
    pub bullets_fired: u64,
    /// Bullets consumed by a hit.
    pub bullets_hit: u64,
    /// Bullets that reached their destination.
    pub bullets_expired: u64,
    /// Spawns that found their pool full.
    pub overflows: u64,
    /// Events dropped on a full channel.
    pub events_dropped: u64,
}

/// Movement keys currently held.
#[derive(Clone, Copy, Debug, Default)]
struct HeldKeys {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

impl HeldKeys {
    fn set(&mut self, key: Key, held: bool) {
        match key {
            Key::Left => self.left = held,
            Key::Right => self.right = held,
            Key::Up => self.up = held,
            Key::Down => self.down = held,
            Key::SpawnWave => {}
        }
    }

    /// Left beats right, up beats down.
    fn intent(self) -> Movement2 {
        let axis = |neg: bool, pos: bool| {
            if neg {
                -1.0
            } else if pos {
                1.0
            } else {
                0.0
            }
        };
        Movement2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// The top-down shooter simulation.
pub struct Game {
    config: GameConfig,
    level: Level,
    timer: FixedTimestep,

    player: Character,
    player_slot: Slot,
    monsters: Character,
    bullets: Bullet,
    vertices: VertexBuffer,

    detector: CollisionDetector,
    collisions: Collisions,
    despawn: Vec<Slot>,

    held: HeldKeys,
    camera: Vec2,
    rng: ChaCha8Rng,
    events: EventBus,
    stats: GameStats,
}

impl Game {
    /// Creates a game from a validated configuration and a loaded level.
    ///
    /// The player spawns at the level's start tile; every level monster is
    /// spawned in layout order.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidConfig` if the configuration fails
    /// validation.
    pub fn new(config: GameConfig, level: Level) -> GameResult<Self> {
        config.validate()?;

        let mut player = Character::new(TOMBSTONE_COUNT + 1);
        let tile_size = Vec2::new(config.world.tile_size, config.world.tile_size);
        let start = systems::tile_position_to_position(
            level.player_start.0,
            level.player_start.1,
            tile_size,
        );
        let player_slot = player.try_spawn(&CharacterDesc {
            position: start,
            size: Size2::new(tile_size.x, tile_size.y),
            speed: config.player.speed,
            health: config.player.health,
            damage: 0.0,
            animation: level.player_animation,
            color: Color::WHITE,
        })?;

        let mut game = Self {
            timer: FixedTimestep::from_rate(config.timing.tick_rate, config.timing.policy()),
            player,
            player_slot,
            monsters: Character::new(config.capacity.monsters),
            bullets: Bullet::new(config.capacity.bullets),
            vertices: VertexBuffer::new(config.capacity.vertices),
            detector: CollisionDetector::new(config.collision.strategy),
            collisions: Collisions::with_capacity(config.capacity.bullets),
            despawn: Vec::with_capacity(config.capacity.monsters.max(config.capacity.bullets)),
            held: HeldKeys::default(),
            camera: Vec2::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.world.seed),
            events: EventBus::new(config.events.capacity),
            stats: GameStats::default(),
            config,
            level,
        };

        let spawns = game.level.monster_spawns.clone();
        for (tx, ty) in spawns {
            let position = systems::tile_position_to_position(tx, ty, game.tile_size());
            if game.spawn_monster(position).is_none() {
                break;
            }
        }

        tracing::info!(
            "Game ready: {} monsters, {:?} collision, {} Hz",
            game.monsters.pool().live_count(),
            game.detector.strategy(),
            game.config.timing.tick_rate
        );
        Ok(game)
    }

    // =========================================================================
    // FRAME DRIVER
    // =========================================================================

    /// Feeds host frame time and runs every step it pays for, then centres
    /// the camera on the player.
    ///
    /// # Returns
    ///
    /// The number of steps run.
    pub fn tick(&mut self, dt_seconds: f64, viewport: Vec2) -> usize {
        let clamped_before = self.timer.clamped_time();
        self.timer.tick(dt_seconds);
        let clamped = self.timer.clamped_time() - clamped_before;
        if !clamped.is_zero() {
            tracing::debug!("Simulation behind, dropped {:?} of frame time", clamped);
        }

        let mut steps = 0;
        while self.timer.consume_step() {
            self.step(self.timer.delta_seconds());
            steps += 1;
        }

        if let Some(center) = self.player_position() {
            self.camera = systems::camera_center_offset(viewport, center);
        }
        steps
    }

    /// Runs exactly one systems pass of `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let tile_size = self.tile_size();
        let player_rows = self.player.rows();
        let monster_rows = self.monsters.rows();
        let bullet_rows = self.bullets.rows();

        // Intent
        systems::reset_velocity(self.player.velocity.as_mut_slice(), player_rows.clone());
        systems::reset_velocity(self.monsters.velocity.as_mut_slice(), monster_rows.clone());
        systems::reset_velocity(self.bullets.velocity.as_mut_slice(), bullet_rows.clone());
        systems::follow_one_target(
            self.monsters.movement.as_mut_slice(),
            self.monsters.position.as_slice(),
            monster_rows.clone(),
            self.player.position.as_slice(),
            self.player_slot,
        );
        systems::forward_movement_from_rotation(
            self.bullets.movement.as_mut_slice(),
            self.bullets.rotation.as_slice(),
            bullet_rows.clone(),
        );

        // Motion
        systems::movement_to_velocity(
            self.player.movement.as_slice(),
            self.player.speed.as_slice(),
            self.player.velocity.as_mut_slice(),
            player_rows.clone(),
        );
        systems::movement_to_velocity(
            self.monsters.movement.as_slice(),
            self.monsters.speed.as_slice(),
            self.monsters.velocity.as_mut_slice(),
            monster_rows.clone(),
        );
        systems::movement_to_velocity(
            self.bullets.movement.as_slice(),
            self.bullets.speed.as_slice(),
            self.bullets.velocity.as_mut_slice(),
            bullet_rows.clone(),
        );
        systems::multiply_velocity_by_future_tile_speed(
            self.player.position.as_slice(),
            self.player.velocity.as_mut_slice(),
            self.player_slot,
            &self.level.tilemap,
            tile_size,
            dt,
        );
        systems::apply_forwards_velocity(
            self.player.position.as_mut_slice(),
            self.player.velocity.as_slice(),
            player_rows.clone(),
            dt,
        );
        systems::apply_forwards_velocity(
            self.monsters.position.as_mut_slice(),
            self.monsters.velocity.as_slice(),
            monster_rows.clone(),
            dt,
        );
        systems::apply_forwards_velocity(
            self.bullets.position.as_mut_slice(),
            self.bullets.velocity.as_slice(),
            bullet_rows.clone(),
            dt,
        );

        // Animation
        systems::progress_animation_if_moving(
            self.player.animation.as_mut_slice(),
            self.player.velocity.as_slice(),
            player_rows.clone(),
            dt,
        );
        systems::progress_animation_if_moving(
            self.monsters.animation.as_mut_slice(),
            self.monsters.velocity.as_slice(),
            monster_rows.clone(),
            dt,
        );
        let tileset = &self.level.tileset;
        systems::fetch_tileset_animation(
            self.player.animation.as_slice(),
            self.player.clip.as_mut_slice(),
            player_rows,
            tileset,
        );
        systems::fetch_tileset_animation(
            self.monsters.animation.as_slice(),
            self.monsters.clip.as_mut_slice(),
            monster_rows.clone(),
            tileset,
        );
        systems::fetch_tileset_animation(
            self.bullets.animation.as_slice(),
            self.bullets.clip.as_mut_slice(),
            bullet_rows.clone(),
            tileset,
        );

        // Despawn
        systems::destination_reached_slots(
            self.bullets.position.as_slice(),
            self.bullets.destination.as_slice(),
            bullet_rows,
            self.config.bullet.reach_distance,
            &mut self.despawn,
        );
        for &slot in &self.despawn {
            if self.bullets.pool().is_occupied(slot) {
                self.stats.bullets_expired += 1;
                self.events.send(GameEvent::BulletExpired { slot });
            }
        }
        self.bullets.free(&self.despawn);

        systems::dead_slots(self.monsters.health.as_slice(), monster_rows, &mut self.despawn);
        for &slot in &self.despawn {
            if self.monsters.pool().is_occupied(slot) {
                self.stats.monsters_killed += 1;
                self.events.send(GameEvent::MonsterKilled {
                    slot,
                    position: self.monsters.position[slot].to_vec2(),
                });
            }
        }
        self.monsters.free(&self.despawn);

        // Collision, over the rows that survived despawn
        self.detector.detect(
            TargetColumns {
                position: self.monsters.position.as_slice(),
                size: self.monsters.size.as_slice(),
                rows: self.monsters.rows(),
            },
            ProjectileColumns {
                position: self.bullets.position.as_slice(),
                rows: self.bullets.rows(),
            },
            &mut self.collisions,
        );
        let bullets = &self.bullets;
        self.collisions
            .retain_projectiles(|bullet| bullets.pool().is_occupied(bullet));
        systems::apply_damage(
            self.monsters.health.as_mut_slice(),
            self.bullets.damage.as_slice(),
            &self.collisions,
        );

        self.despawn.clear();
        for (monster, bullet) in self.collisions.pairs() {
            self.stats.bullets_hit += 1;
            self.events.send(GameEvent::BulletHit {
                bullet,
                monster,
                damage: self.bullets.damage[bullet].val,
            });
            self.despawn.push(bullet);
        }
        self.bullets.free(&self.despawn);

        self.stats.steps += 1;
    }

    // =========================================================================
    // INPUT
    // =========================================================================

    /// Applies one host input event.
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(Key::SpawnWave) => {
                let side = self.config.world.wave_area;
                let area = Rect::new(0.0, 0.0, side, side);
                self.spawn_monster_wave(area, self.config.world.wave_size);
            }
            InputEvent::KeyDown(key) => {
                self.held.set(key, true);
                self.apply_player_intent();
            }
            InputEvent::KeyUp(key) => {
                self.held.set(key, false);
                self.apply_player_intent();
            }
            InputEvent::PointerDown { button, x, y } => {
                let world = self.camera + Vec2::new(x, y);
                let count = match button {
                    PointerButton::Primary => 1,
                    PointerButton::Secondary => self.config.bullet.volley,
                };
                self.fire_bullets(world, count);
            }
        }
    }

    fn apply_player_intent(&mut self) {
        if let Err(err) = self.player.pool().validate(self.player_slot) {
            tracing::trace!("Input ignored: {}", err);
            return;
        }
        self.player.movement[self.player_slot] = self.held.intent();
    }

    /// Fires `count` bullets from the player toward a world point, each
    /// offset diagonally by the volley spacing.
    ///
    /// # Returns
    ///
    /// The number of bullets spawned. Stops at the first overflow.
    pub fn fire_bullets(&mut self, target: Vec2, count: usize) -> usize {
        let Some(origin) = self.player_position() else {
            return 0;
        };
        let tile = self.config.world.tile_size;
        let spacing = self.config.bullet.volley_spacing;

        for i in 0..count {
            let offset = i as f32 * spacing;
            let position = origin + Vec2::new(offset, offset);
            let slot = self.bullets.spawn(&BulletDesc {
                position,
                destination: target,
                size: Size2::new(tile, tile),
                speed: self.config.bullet.speed,
                damage: self.config.bullet.damage,
                animation: self.level.bullet_animation,
            });
            if slot.is_tombstone() {
                self.overflowed(EntityKind::Bullet);
                return i;
            }
            self.stats.bullets_fired += 1;
            self.events.send(GameEvent::BulletFired {
                slot,
                position,
                destination: target,
            });
        }
        count
    }

    /// Spawns `count` monsters at seeded random points inside `area`.
    ///
    /// # Returns
    ///
    /// The number of monsters spawned. Zero for a degenerate area; stops at
    /// the first overflow.
    pub fn spawn_monster_wave(&mut self, area: Rect, count: usize) -> usize {
        if area.is_degenerate() || !(area.x.is_finite() && area.y.is_finite()) {
            return 0;
        }
        for i in 0..count {
            let x = area.x + self.rng.gen::<f32>() * area.w;
            let y = area.y + self.rng.gen::<f32>() * area.h;
            if self.spawn_monster(Vec2::new(x, y)).is_none() {
                return i;
            }
        }
        tracing::debug!("Spawned wave of {}", count);
        count
    }

    fn spawn_monster(&mut self, position: Vec2) -> Option<Slot> {
        let tile = self.config.world.tile_size;
        let slot = self.monsters.spawn(&CharacterDesc {
            position,
            size: Size2::new(tile, tile),
            speed: self.config.monster.speed,
            health: self.config.monster.health,
            damage: 0.0,
            animation: self.level.monster_animation,
            color: Color::WHITE,
        });
        if slot.is_tombstone() {
            self.overflowed(EntityKind::Monster);
            return None;
        }
        self.stats.monsters_spawned += 1;
        self.events.send(GameEvent::MonsterSpawned { slot, position });
        Some(slot)
    }

    fn overflowed(&mut self, kind: EntityKind) {
        tracing::warn!("{:?} pool full, spawn aliased onto the tombstone row", kind);
        self.stats.overflows += 1;
        self.events.send(GameEvent::PoolOverflow { kind });
    }

    // =========================================================================
    // RENDER OUTPUT
    // =========================================================================

    /// Rebuilds the vertex buffer from every sprite, in screen space.
    ///
    /// # Returns
    ///
    /// The number of sprites written.
    pub fn build_vertices(&mut self, texture_size: Vec2) -> usize {
        self.vertices.clear();
        let vertices = &mut self.vertices;
        let sprites = systems::make_sprite_vertices(&self.player.sprites(), vertices, texture_size)
            + systems::make_sprite_vertices(&self.monsters.sprites(), vertices, texture_size)
            + systems::make_sprite_vertices(&self.bullets.sprites(), vertices, texture_size);
        let written = 0..self.vertices.count();
        systems::apply_camera_2d(self.vertices.position.as_mut_slice(), written, self.camera);
        sprites
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    fn tile_size(&self) -> Vec2 {
        Vec2::new(self.config.world.tile_size, self.config.world.tile_size)
    }

    fn player_position(&self) -> Option<Vec2> {
        self.player.pool().validate(self.player_slot).ok()?;
        self.player.position.get(self.player_slot).map(|p| p.to_vec2())
    }

    /// The player kind.
    #[must_use]
    pub const fn player(&self) -> &Character {
        &self.player
    }

    /// Row of the player in [`Self::player`].
    #[must_use]
    pub const fn player_slot(&self) -> Slot {
        self.player_slot
    }

    /// The monster kind.
    #[must_use]
    pub const fn monsters(&self) -> &Character {
        &self.monsters
    }

    /// The bullet kind.
    #[must_use]
    pub const fn bullets(&self) -> &Bullet {
        &self.bullets
    }

    /// Top-left world corner of the last viewport.
    #[must_use]
    pub const fn camera(&self) -> Vec2 {
        self.camera
    }

    /// Terrain.
    #[must_use]
    pub const fn tilemap(&self) -> &Tilemap {
        &self.level.tilemap
    }

    /// The loaded level.
    #[must_use]
    pub const fn level(&self) -> &Level {
        &self.level
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The fixed-step driver.
    #[must_use]
    pub const fn timer(&self) -> &FixedTimestep {
        &self.timer
    }

    /// Vertices of the last [`Self::build_vertices`].
    #[must_use]
    pub const fn vertices(&self) -> &VertexBuffer {
        &self.vertices
    }

    /// Lifetime counters.
    #[must_use]
    pub fn stats(&self) -> GameStats {
        GameStats {
            events_dropped: self.events.dropped(),
            ..self.stats
        }
    }

    /// A handle on the outbound event channel.
    #[must_use]
    pub fn events(&self) -> EventReceiver {
        self.events.receiver()
    }
}
