//! # TESSERA Events
//!
//! Two directions:
//! - [`InputEvent`]s flow from the host into [`crate::Game::handle_event`]
//! - [`GameEvent`]s flow out of the simulation over a bounded channel to
//!   audio, UI or logging consumers
//!
//! ```text
//! ┌──────────┐  InputEvent  ┌──────────┐  GameEvent  ┌───────────┐
//! │   Host   │─────────────>│   Game   │────────────>│ Consumers │
//! └──────────┘              └──────────┘  (bounded)  └───────────┘
//! ```
//!
//! The outbound side never blocks the step. A full channel drops the event
//! and bumps [`EventBus::dropped`].

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tessera_core::{Slot, Vec2};

// =============================================================================
// INPUT
// =============================================================================

/// Keys the simulation reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Move left.
    Left,
    /// Move right.
    Right,
    /// Move up (negative y).
    Up,
    /// Move down (positive y).
    Down,
    /// Spawn one wave of monsters.
    SpawnWave,
}

/// Pointer buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Fires a single bullet.
    Primary,
    /// Fires a volley.
    Secondary,
}

/// Host input, already translated from the windowing layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// A key went down.
    KeyDown(Key),
    /// A key went up.
    KeyUp(Key),
    /// A pointer button was pressed at a screen position.
    PointerDown {
        /// Button pressed.
        button: PointerButton,
        /// Screen x.
        x: f32,
        /// Screen y.
        y: f32,
    },
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Entity kinds, as named in events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Monster characters.
    Monster,
    /// Bullets.
    Bullet,
}

/// Events emitted by the simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    /// A monster entered the world.
    MonsterSpawned {
        /// Its row.
        slot: Slot,
        /// Spawn position.
        position: Vec2,
    },

    /// A monster's health dropped to zero and it was despawned.
    MonsterKilled {
        /// Its former row.
        slot: Slot,
        /// Position of death.
        position: Vec2,
    },

    /// A bullet was fired.
    BulletFired {
        /// Its row.
        slot: Slot,
        /// Spawn position.
        position: Vec2,
        /// Aim point.
        destination: Vec2,
    },

    /// A bullet struck a monster and was consumed.
    BulletHit {
        /// Bullet row.
        bullet: Slot,
        /// Monster row.
        monster: Slot,
        /// Damage dealt.
        damage: f32,
    },

    /// A bullet reached its destination without hitting anything.
    BulletExpired {
        /// Its former row.
        slot: Slot,
    },

    /// A spawn found its pool full and was written onto the tombstone row.
    PoolOverflow {
        /// Kind whose pool overflowed.
        kind: EntityKind,
    },
}

/// Bounded outbound event channel.
pub struct EventBus {
    sender: Sender<GameEvent>,
    receiver: Receiver<GameEvent>,
    dropped: u64,
}

impl EventBus {
    /// Creates a bus holding at most `capacity` undelivered events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            dropped: 0,
        }
    }

    /// Sends an event without blocking.
    ///
    /// Returns `false` and counts the event as dropped if the channel is
    /// full.
    #[inline]
    pub fn send(&mut self, event: GameEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {
                self.dropped += 1;
                tracing::trace!("Event channel full, dropped {:?}", event);
                false
            }
        }
    }

    /// Creates a receiver handle (clone for multiple consumers).
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }

    /// Events dropped because the channel was full.
    #[inline]
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Handle for receiving events.
#[derive(Clone)]
pub struct EventReceiver {
    receiver: Receiver<GameEvent>,
}

impl EventReceiver {
    /// Receives all pending events (non-blocking).
    #[must_use]
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Receives one event (non-blocking).
    #[inline]
    #[must_use]
    pub fn try_recv(&self) -> Option<GameEvent> {
        self.receiver.try_recv().ok()
    }

    /// Number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Checks if there are pending events.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }
}
