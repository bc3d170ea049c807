//! End-to-end runs of the shooter through its public surface.

use tessera::config::CatchUpMode;
use tessera::core::{Rect, Vec2};
use tessera::events::EntityKind;
use tessera::level::demo_tile_properties;
use tessera::sim::CollisionStrategy;
use tessera::{Game, GameConfig, GameEvent, InputEvent, Key, Legend, Level, PointerButton};

const DT: f32 = 1.0 / 60.0;
const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

// Player at tile (2, 2), monster at tile (6, 2).
const ARENA: &str = "\
##########
#........#
#.P...M..#
#........#
##########";

fn arena() -> Level {
    Level::from_ascii(&[ARENA], &Legend::demo(), demo_tile_properties()).unwrap()
}

/// Monsters hold still so shots are predictable.
fn still_monsters() -> GameConfig {
    let mut config = GameConfig::default();
    config.monster.speed = 0.0;
    config
}

fn player_position(game: &Game) -> Vec2 {
    game.player().position[game.player_slot()].to_vec2()
}

#[test]
fn uncapped_catch_up_runs_every_owed_step() {
    let mut config = GameConfig::default();
    config.timing.catch_up = CatchUpMode::Uncapped;
    let mut game = Game::new(config, arena()).unwrap();

    assert_eq!(game.tick(10.0, VIEWPORT), 600);
    assert_eq!(game.stats().steps, 600);
}

#[test]
fn capped_catch_up_runs_two_steps() {
    let mut game = Game::new(GameConfig::default(), arena()).unwrap();

    assert_eq!(game.tick(10.0, VIEWPORT), 2);
    assert_eq!(game.tick(0.0, VIEWPORT), 0);
    assert!(game.timer().clamped_time().as_secs_f64() > 9.9);
}

#[test]
fn level_spawns_player_and_monsters() {
    let game = Game::new(GameConfig::default(), arena()).unwrap();

    assert_eq!(player_position(&game), Vec2::new(64.0, 64.0));
    assert_eq!(game.monsters().pool().live_count(), 1);
    assert_eq!(game.monsters().position.as_slice()[1].to_vec2(), Vec2::new(192.0, 64.0));

    let events = game.events().drain();
    assert!(matches!(events.as_slice(), [GameEvent::MonsterSpawned { .. }]));
}

#[test]
fn held_keys_drive_the_player() {
    let mut game = Game::new(still_monsters(), arena()).unwrap();

    game.handle_event(InputEvent::KeyDown(Key::Right));
    game.step(DT);
    let moved = player_position(&game);
    assert!((moved.x - (64.0 + 500.0 * DT)).abs() < 1e-3);
    assert_eq!(moved.y, 64.0);

    // Left wins while both are held.
    game.handle_event(InputEvent::KeyDown(Key::Left));
    game.step(DT);
    assert!(player_position(&game).x < moved.x);

    game.handle_event(InputEvent::KeyUp(Key::Left));
    game.handle_event(InputEvent::KeyUp(Key::Right));
    let before = player_position(&game);
    game.step(DT);
    assert_eq!(player_position(&game), before);
}

#[test]
fn walls_stop_the_player() {
    let mut game = Game::new(still_monsters(), arena()).unwrap();

    game.handle_event(InputEvent::KeyDown(Key::Left));
    for _ in 0..120 {
        game.step(DT);
    }
    let p = player_position(&game);
    assert!(p.x >= 32.0, "walked into the wall: {p:?}");
    assert!(p.x < 64.0);
}

#[test]
fn pointer_shot_kills_monster() {
    let mut config = still_monsters();
    config.bullet.damage = 100.0;
    let mut game = Game::new(config, arena()).unwrap();
    let events = game.events();
    let _ = events.drain();

    // Centre the camera: world = camera + screen.
    game.tick(0.0, VIEWPORT);
    let camera = game.camera();
    assert_eq!(camera, Vec2::new(64.0 - 400.0, 64.0 - 300.0));

    // Aim at the monster's centre.
    let aim = Vec2::new(208.0, 80.0) - camera;
    game.handle_event(InputEvent::PointerDown {
        button: PointerButton::Primary,
        x: aim.x,
        y: aim.y,
    });
    assert_eq!(game.bullets().pool().live_count(), 1);

    for _ in 0..12 {
        game.step(DT);
    }

    let stats = game.stats();
    assert_eq!(stats.bullets_fired, 1);
    assert_eq!(stats.bullets_hit, 1);
    assert_eq!(stats.bullets_expired, 0);
    assert_eq!(stats.monsters_killed, 1);
    assert_eq!(game.monsters().pool().live_count(), 0);
    assert_eq!(game.bullets().pool().live_count(), 0);

    assert!(matches!(
        events.drain().as_slice(),
        [
            GameEvent::BulletFired { .. },
            GameEvent::BulletHit { .. },
            GameEvent::MonsterKilled { .. },
        ]
    ));
}

#[test]
fn missed_bullet_expires_at_destination() {
    let mut game = Game::new(still_monsters(), arena()).unwrap();
    let events = game.events();
    let _ = events.drain();

    // Straight down, away from the monster.
    assert_eq!(game.fire_bullets(Vec2::new(64.0, 160.0), 1), 1);
    for _ in 0..10 {
        game.step(DT);
    }

    assert_eq!(game.bullets().pool().live_count(), 0);
    assert_eq!(game.stats().bullets_expired, 1);
    assert_eq!(game.monsters().health.as_slice()[1].val, 100.0);
    assert!(events
        .drain()
        .iter()
        .any(|e| matches!(e, GameEvent::BulletExpired { .. })));
}

#[test]
fn secondary_pointer_fires_offset_volley() {
    let mut game = Game::new(still_monsters(), arena()).unwrap();

    game.handle_event(InputEvent::PointerDown {
        button: PointerButton::Secondary,
        x: 0.0,
        y: 0.0,
    });

    assert_eq!(game.stats().bullets_fired, 10);
    let position = game.bullets().position.as_slice();
    for i in 0..10usize {
        let offset = i as f32 * 5.0;
        assert_eq!(position[i + 1].to_vec2(), Vec2::new(64.0 + offset, 64.0 + offset));
    }
}

#[test]
fn full_bullet_pool_overflows_once() {
    let mut config = still_monsters();
    config.capacity.bullets = 3;
    let mut game = Game::new(config, arena()).unwrap();
    let events = game.events();
    let _ = events.drain();

    assert_eq!(game.fire_bullets(Vec2::new(500.0, 500.0), 5), 2);
    assert_eq!(game.bullets().pool().live_count(), 2);
    assert_eq!(game.stats().overflows, 1);
    assert!(events
        .drain()
        .contains(&GameEvent::PoolOverflow { kind: EntityKind::Bullet }));

    // The aliased write landed on row 0, outside the simulated rows.
    for _ in 0..5 {
        game.step(DT);
    }
    assert_eq!(game.bullets().pool().overflow_count(), 1);
    assert_eq!(game.bullets().rows(), 1..3);
}

#[test]
fn waves_are_seeded() {
    let mut a = Game::new(still_monsters(), arena()).unwrap();
    let mut b = Game::new(still_monsters(), arena()).unwrap();
    let area = Rect::new(0.0, 0.0, 256.0, 128.0);

    assert_eq!(a.spawn_monster_wave(area, 10), 10);
    assert_eq!(b.spawn_monster_wave(area, 10), 10);
    assert_eq!(a.monsters().position.as_slice(), b.monsters().position.as_slice());

    for p in &a.monsters().position.as_slice()[2..12] {
        assert!(p.x >= 0.0 && p.x < 256.0);
        assert!(p.y >= 0.0 && p.y < 128.0);
    }

    let mut config = still_monsters();
    config.world.seed ^= 1;
    let mut c = Game::new(config, arena()).unwrap();
    c.spawn_monster_wave(area, 10);
    assert_ne!(a.monsters().position.as_slice(), c.monsters().position.as_slice());

    assert_eq!(a.spawn_monster_wave(Rect::new(0.0, 0.0, 0.0, 10.0), 10), 0);
}

#[test]
fn spawn_wave_key_uses_config() {
    let mut config = still_monsters();
    config.world.wave_size = 4;
    let mut game = Game::new(config, arena()).unwrap();

    game.handle_event(InputEvent::KeyDown(Key::SpawnWave));
    assert_eq!(game.monsters().pool().live_count(), 5);
    assert_eq!(game.stats().monsters_spawned, 5);
}

#[test]
fn monsters_chase_the_player() {
    let mut game = Game::new(GameConfig::default(), arena()).unwrap();
    let start = game.monsters().position.as_slice()[1].to_vec2();

    game.step(DT);
    let after = game.monsters().position.as_slice()[1].to_vec2();
    // Level on y, so only x moves, toward the player.
    assert!(after.x < start.x);
    assert_eq!(after.y, start.y);
}

#[test]
fn vertices_are_in_screen_space() {
    let mut game = Game::new(still_monsters(), arena()).unwrap();
    game.tick(0.0, VIEWPORT);

    let sprites = game.build_vertices(Vec2::new(112.0, 8.0));
    assert_eq!(sprites, 2);
    assert_eq!(game.vertices().count(), 12);

    // Player quad corner: (x - w/2, y - h) minus the camera.
    let camera = game.camera();
    let corner = game.vertices().position.as_slice()[0].to_vec2();
    assert_eq!(corner, Vec2::new(48.0, 32.0) - camera);

    // Rebuilt from scratch each frame.
    game.build_vertices(Vec2::new(112.0, 8.0));
    assert_eq!(game.vertices().count(), 12);
}

#[test]
fn killed_monster_leaves_no_sprite() {
    let mut config = still_monsters();
    config.bullet.damage = 100.0;
    let mut game = Game::new(config, arena()).unwrap();
    // Two more monsters off the bullet's path, so the kill leaves a hole.
    assert_eq!(game.spawn_monster_wave(Rect::new(280.0, 130.0, 16.0, 16.0), 2), 2);

    assert_eq!(game.fire_bullets(Vec2::new(208.0, 80.0), 1), 1);
    for _ in 0..12 {
        game.step(DT);
    }
    assert_eq!(game.stats().monsters_killed, 1);
    assert_eq!(game.monsters().rows(), 1..4);
    assert_eq!(game.monsters().pool().live_count(), 2);

    game.tick(0.0, VIEWPORT);
    assert_eq!(game.build_vertices(Vec2::new(112.0, 8.0)), 3);
    assert_eq!(game.vertices().count(), 18);
}

#[test]
fn strategies_agree_on_a_long_run() {
    let run = |strategy| {
        let mut config = GameConfig::default();
        config.collision.strategy = strategy;
        let mut game = Game::new(config, arena()).unwrap();
        game.spawn_monster_wave(Rect::new(32.0, 32.0, 256.0, 96.0), 40);
        for frame in 0..600u32 {
            if frame % 12 == 0 {
                game.fire_bullets(Vec2::new(160.0 + (frame % 96) as f32, 80.0), 10);
            }
            game.step(DT);
        }
        (
            game.stats(),
            game.monsters().health.as_slice().to_vec(),
        )
    };

    let naive = run(CollisionStrategy::Naive);
    assert!(naive.0.bullets_hit > 0);
    assert_eq!(run(CollisionStrategy::SpatialHash), naive);
    assert_eq!(run(CollisionStrategy::Parallel), naive);
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = GameConfig::default();
    config.timing.tick_rate = 0;
    assert!(Game::new(config, arena()).is_err());
}
