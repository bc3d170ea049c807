//! # Game Error Types
//!
//! Failures of startup work: configuration, level loading and explicit
//! spawns. The per-step systems never fail.

use thiserror::Error;

use tessera_core::PoolError;

/// Errors that can occur while setting up or driving a game.
#[derive(Error, Debug)]
pub enum GameError {
    /// Reading a file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid TOML for `GameConfig`.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but holds unusable values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The level layout could not be turned into a tilemap.
    #[error("invalid level: {0}")]
    InvalidLevel(String),

    /// An explicit spawn hit a full pool.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
