//! # Gameplay Systems
//!
//! Free functions over component slices. Each takes the columns it reads
//! and writes plus the row range to process; none of them allocate once
//! their output buffers are warm.

pub mod animation;
pub mod camera;
pub mod collision;
pub mod despawn;
pub mod movement;
pub mod physics;
pub mod tilemap;
pub mod vertex;

pub use animation::{fetch_tileset_animation, progress_animation_if_moving, Tileset};
pub use camera::{apply_camera_2d, camera_center_offset};
pub use collision::{
    apply_damage, detect_collisions, detect_collisions_parallel, CollisionDetector,
    CollisionStrategy, Collisions, ProjectileColumns, SpatialHash, TargetColumns,
};
pub use despawn::{dead_slots, destination_reached_slots, DEFAULT_REACH_DISTANCE};
pub use movement::{follow_one_target, forward_movement_from_rotation, movement_to_velocity};
pub use physics::{apply_forwards_velocity, reset_velocity};
pub use tilemap::{
    multiply_velocity_by_future_tile_speed, tile_position_to_position, TileId, TileProperties,
    Tilemap,
};
pub use vertex::{make_sprite_vertices, VERTICES_PER_SPRITE};
