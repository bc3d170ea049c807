//! # TESSERA
//!
//! The top-down shooter, built on the foundation and gameplay crates.
//!
//! ```text
//! ┌───────────────┐     ┌───────────────┐     ┌───────────────┐
//! │ tessera_core  │────>│ tessera_sim   │────>│ tessera       │
//! │               │     │               │     │               │
//! │ • Slot pools  │     │ • Components  │     │ • Game        │
//! │ • Columns     │     │ • Entity kinds│     │ • Config      │
//! │ • Timestep    │     │ • Systems     │     │ • Levels      │
//! └───────────────┘     └───────────────┘     │ • Events      │
//!                                             └───────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML configuration
//! - `events`: Host input and outbound game events
//! - `game`: Simulation state and the systems pass
//! - `level`: ASCII level loading

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod events;
pub mod game;
pub mod level;

// Re-export the foundation crates
pub use tessera_core as core;
pub use tessera_sim as sim;

// Re-export commonly used types
pub use config::GameConfig;
pub use error::{GameError, GameResult};
pub use events::{EventBus, EventReceiver, GameEvent, InputEvent, Key, PointerButton};
pub use game::{Game, GameStats};
pub use level::{Legend, Level};
