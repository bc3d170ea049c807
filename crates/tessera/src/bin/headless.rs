//! # TESSERA Headless
//!
//! Runs the demo level with scripted input and no window, then reports
//! the lifetime counters.
//!
//! ```bash
//! # Ten simulated seconds with default settings
//! ./tessera_headless
//!
//! # Custom config, thirty seconds
//! RUST_LOG=tessera=debug ./tessera_headless tessera.toml 30
//! ```

use tessera::core::Vec2;
use tessera::{Game, GameConfig, GameResult, InputEvent, Key, Level, PointerButton};
use tracing_subscriber::EnvFilter;

/// Host frame length fed to the driver.
const FRAME_SECONDS: f64 = 1.0 / 144.0;

/// Screen size the camera centres on.
const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

fn main() -> GameResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tessera=info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let seconds = args
        .next()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(10.0);

    let mut game = Game::new(config, Level::demo()?)?;
    let events = game.events();
    let texture_size = Vec2::from_array(game.config().world.texture_size);

    let frames = (seconds / FRAME_SECONDS) as u64;
    tracing::info!("Simulating {} frames ({} s)", frames, seconds);

    for frame in 0..frames {
        for input in script(frame) {
            game.handle_event(input);
        }
        game.tick(FRAME_SECONDS, VIEWPORT);
        game.build_vertices(texture_size);

        for event in events.drain() {
            tracing::debug!("{:?}", event);
        }
    }

    let stats = game.stats();
    tracing::info!(
        "{} steps, {} monsters killed of {}, {} bullets fired ({} hit, {} expired)",
        stats.steps,
        stats.monsters_killed,
        stats.monsters_spawned,
        stats.bullets_fired,
        stats.bullets_hit,
        stats.bullets_expired
    );
    if stats.overflows > 0 || stats.events_dropped > 0 {
        tracing::warn!(
            "{} pool overflows, {} events dropped",
            stats.overflows,
            stats.events_dropped
        );
    }
    Ok(())
}

/// Scripted input: strafe left and right while firing, with a new wave
/// every five seconds.
fn script(frame: u64) -> Vec<InputEvent> {
    let mut inputs = Vec::new();
    match frame % 288 {
        0 => inputs.extend([InputEvent::KeyDown(Key::Right), InputEvent::KeyUp(Key::Left)]),
        144 => inputs.extend([InputEvent::KeyUp(Key::Right), InputEvent::KeyDown(Key::Left)]),
        _ => {}
    }
    if frame % 36 == 0 {
        inputs.push(InputEvent::PointerDown {
            button: if frame % 180 == 0 {
                PointerButton::Secondary
            } else {
                PointerButton::Primary
            },
            x: VIEWPORT.x - 40.0,
            y: VIEWPORT.y / 2.0,
        });
    }
    if frame % 720 == 0 {
        inputs.push(InputEvent::KeyDown(Key::SpawnWave));
    }
    inputs
}
