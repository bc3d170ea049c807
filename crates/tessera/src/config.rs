//! # Game Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an
//! empty document is a valid configuration:
//!
//! ```toml
//! [timing]
//! tick_rate = 60
//! catch_up = "capped"
//! catch_up_multiplier = 2
//!
//! [collision]
//! strategy = "spatial_hash"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tessera_core::{CatchUpPolicy, SOA_LIMIT, TOMBSTONE_COUNT};
use tessera_sim::systems::{DEFAULT_REACH_DISTANCE, VERTICES_PER_SPRITE};
use tessera_sim::CollisionStrategy;

use crate::error::{GameError, GameResult};

/// Complete game configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Fixed-step rate and catch-up behaviour.
    pub timing: TimingConfig,
    /// Pool limits per entity kind.
    pub capacity: CapacityConfig,
    /// Player archetype.
    pub player: PlayerConfig,
    /// Monster archetype.
    pub monster: MonsterConfig,
    /// Bullet archetype and volley shape.
    pub bullet: BulletConfig,
    /// Collision scan selection.
    pub collision: CollisionConfig,
    /// World geometry and wave spawning.
    pub world: WorldConfig,
    /// Outbound event channel.
    pub events: EventsConfig,
}

/// How far behind the simulation may fall before time is dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatchUpMode {
    /// Run every owed step.
    Uncapped,
    /// Clamp owed time to `catch_up_multiplier` steps.
    #[default]
    Capped,
}

/// `[timing]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Steps per second.
    pub tick_rate: u32,
    /// Catch-up mode.
    pub catch_up: CatchUpMode,
    /// Most steps owed at once in capped mode.
    pub catch_up_multiplier: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            catch_up: CatchUpMode::Capped,
            catch_up_multiplier: 2,
        }
    }
}

impl TimingConfig {
    /// Resolved catch-up policy for the timestep driver.
    #[must_use]
    pub const fn policy(&self) -> CatchUpPolicy {
        match self.catch_up {
            CatchUpMode::Uncapped => CatchUpPolicy::Uncapped,
            CatchUpMode::Capped => CatchUpPolicy::Capped {
                multiplier: self.catch_up_multiplier,
            },
        }
    }
}

/// `[capacity]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapacityConfig {
    /// Monster pool rows, tombstone included.
    pub monsters: usize,
    /// Bullet pool rows, tombstone included.
    pub bullets: usize,
    /// Vertex buffer rows.
    pub vertices: usize,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            monsters: SOA_LIMIT,
            bullets: SOA_LIMIT,
            vertices: 2 * SOA_LIMIT * VERTICES_PER_SPRITE,
        }
    }
}

/// `[player]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Units per second.
    pub speed: f32,
    /// Starting health.
    pub health: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 500.0,
            health: 100.0,
        }
    }
}

/// `[monster]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonsterConfig {
    /// Units per second.
    pub speed: f32,
    /// Starting health.
    pub health: f32,
}

impl Default for MonsterConfig {
    fn default() -> Self {
        Self {
            speed: 250.0,
            health: 100.0,
        }
    }
}

/// `[bullet]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BulletConfig {
    /// Units per second.
    pub speed: f32,
    /// Health removed per hit.
    pub damage: f32,
    /// Distance to the destination at which a bullet expires.
    pub reach_distance: f32,
    /// Bullets per secondary-pointer volley.
    pub volley: usize,
    /// Diagonal offset between volley bullets, in world units.
    pub volley_spacing: f32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            speed: 1000.0,
            damage: 50.0,
            reach_distance: DEFAULT_REACH_DISTANCE,
            volley: 10,
            volley_spacing: 5.0,
        }
    }
}

/// `[collision]`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollisionConfig {
    /// Scan used for monsters against bullets.
    pub strategy: CollisionStrategy,
}

/// `[world]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Edge length of one tile in world units. Entities share it as size.
    pub tile_size: f32,
    /// Seed for wave spawning.
    pub seed: u64,
    /// Monsters per wave.
    pub wave_size: usize,
    /// Edge of the square, anchored at the origin, waves spawn in.
    pub wave_area: f32,
    /// Sprite sheet size in pixels.
    pub texture_size: [f32; 2],
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tile_size: 32.0,
            seed: 0x7E55_E7A0,
            wave_size: 10,
            wave_area: 1024.0,
            texture_size: [112.0, 8.0],
        }
    }
}

/// `[events]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventsConfig {
    /// Events in flight before new ones are dropped.
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

impl GameConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`GameError::Parse`] on malformed TOML or unknown keys,
    /// [`GameError::InvalidConfig`] if a value is out of range.
    pub fn from_toml_str(source: &str) -> GameResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`GameError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> GameResult<()> {
        let timing = &self.timing;
        if timing.tick_rate == 0 {
            return Err(invalid("timing.tick_rate must be positive"));
        }
        if timing.catch_up == CatchUpMode::Capped && timing.catch_up_multiplier == 0 {
            return Err(invalid("timing.catch_up_multiplier must be positive"));
        }

        let capacity = &self.capacity;
        if capacity.monsters <= TOMBSTONE_COUNT || capacity.bullets <= TOMBSTONE_COUNT {
            return Err(invalid("capacity.monsters and capacity.bullets must exceed 1"));
        }
        if capacity.monsters > SOA_LIMIT || capacity.bullets > SOA_LIMIT {
            return Err(GameError::InvalidConfig(format!(
                "capacity.monsters and capacity.bullets must not exceed {SOA_LIMIT}"
            )));
        }
        if capacity.vertices < VERTICES_PER_SPRITE {
            return Err(invalid("capacity.vertices must hold at least one sprite"));
        }

        for (name, value) in [
            ("player.speed", self.player.speed),
            ("player.health", self.player.health),
            ("monster.speed", self.monster.speed),
            ("monster.health", self.monster.health),
            ("bullet.speed", self.bullet.speed),
            ("bullet.damage", self.bullet.damage),
            ("bullet.reach_distance", self.bullet.reach_distance),
            ("bullet.volley_spacing", self.bullet.volley_spacing),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(GameError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }

        let world = &self.world;
        if !(world.tile_size.is_finite() && world.tile_size > 0.0) {
            return Err(invalid("world.tile_size must be finite and positive"));
        }
        if !(world.wave_area.is_finite() && world.wave_area > 0.0) {
            return Err(invalid("world.wave_area must be finite and positive"));
        }
        if world.texture_size.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
            return Err(invalid("world.texture_size must be finite and positive"));
        }

        if self.events.capacity == 0 {
            return Err(invalid("events.capacity must be positive"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> GameError {
    GameError::InvalidConfig(message.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = GameConfig::from_toml_str("").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.timing.policy(), CatchUpPolicy::Capped { multiplier: 2 });
        assert_eq!(config.collision.strategy, CollisionStrategy::SpatialHash);
    }

    #[test]
    fn test_partial_sections() {
        let config = GameConfig::from_toml_str(
            r#"
            [timing]
            catch_up = "uncapped"

            [collision]
            strategy = "parallel"

            [bullet]
            damage = 105.0
            "#,
        )
        .unwrap();
        assert_eq!(config.timing.policy(), CatchUpPolicy::Uncapped);
        assert_eq!(config.timing.tick_rate, 60);
        assert_eq!(config.collision.strategy, CollisionStrategy::Parallel);
        assert_eq!(config.bullet.damage, 105.0);
        assert_eq!(config.bullet.speed, 1000.0);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = GameConfig::from_toml_str("[timing]\nrate = 30\n").unwrap_err();
        assert!(matches!(err, GameError::Parse(_)));
    }

    #[test]
    fn test_out_of_range_rejected() {
        for source in [
            "[timing]\ntick_rate = 0\n",
            "[capacity]\nmonsters = 1\n",
            "[capacity]\nmonsters = 100000\n",
            "[capacity]\nbullets = 4097\n",
            "[world]\ntile_size = 0.0\n",
            "[player]\nspeed = -1.0\n",
            "[events]\ncapacity = 0\n",
        ] {
            let err = GameConfig::from_toml_str(source).unwrap_err();
            assert!(matches!(err, GameError::InvalidConfig(_)), "{source}");
        }
    }

    #[test]
    fn test_capacity_limit_is_inclusive() {
        let config = GameConfig::from_toml_str("[capacity]\nmonsters = 4096\nbullets = 4096\n")
            .unwrap();
        assert_eq!(config.capacity.monsters, SOA_LIMIT);
    }

    #[test]
    fn test_missing_file() {
        let err = GameConfig::load("/nonexistent/tessera.toml").unwrap_err();
        assert!(matches!(err, GameError::Io(_)));
    }
}
