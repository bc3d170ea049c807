//! # TESSERA Sim
//!
//! Entity kinds and the gameplay systems that run over them:
//! - Characters and bullets, each one slot pool plus its columns
//! - Movement, terrain, animation and despawn passes
//! - Projectile collision (naive, spatial hash, parallel)
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_sim::{systems, Character};
//!
//! let mut monsters = Character::new(4096);
//! let rows = monsters.rows();
//! systems::reset_velocity(monsters.velocity.as_mut_slice(), rows.clone());
//! systems::apply_forwards_velocity(
//!     monsters.position.as_mut_slice(),
//!     monsters.velocity.as_slice(),
//!     rows,
//!     1.0 / 60.0,
//! );
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod components;
pub mod entities;
pub mod systems;

pub use components::{
    Animation, Clip, Color, Damage, Destination2, Health, Movement2, Position2, Rotation, Size2,
    Speed, TexCoord, Velocity2,
};
pub use entities::{Bullet, BulletDesc, Character, CharacterDesc, SpriteColumns, VertexBuffer};
pub use systems::{CollisionStrategy, Collisions};
