//! # Fixed-Timestep Driver
//!
//! Accumulates variable frame time and hands out constant simulation steps.
//!
//! ## Design
//!
//! The driver must:
//! - Emit zero, one or many steps per host frame
//! - Keep time as integer nanoseconds so `floor(T * rate)` steps are exact
//! - Optionally bound catch-up after a stall
//!
//! ```rust,ignore
//! let mut timer = FixedTimestep::from_rate(60, CatchUpPolicy::Uncapped);
//! timer.tick(frame_dt);
//! while timer.consume_step() {
//!     step(timer.delta_seconds());
//! }
//! ```

use std::time::Duration;

/// What to do with accumulated time that exceeds a few steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatchUpPolicy {
    /// Run every owed step, however many.
    Uncapped,
    /// Clamp accumulated time to `multiplier` step intervals on every tick.
    Capped {
        /// Maximum steps owed at once.
        multiplier: u32,
    },
}

impl Default for CatchUpPolicy {
    fn default() -> Self {
        Self::Capped { multiplier: 2 }
    }
}

/// Fixed-step accumulator.
#[derive(Clone, Debug)]
pub struct FixedTimestep {
    /// Constant step length.
    interval: Duration,
    /// Time owed to the simulation.
    accumulated: Duration,
    /// Interval of the last consumed step.
    last_step_delta: Duration,
    /// Catch-up policy.
    policy: CatchUpPolicy,
    /// Total steps consumed.
    steps_taken: u64,
    /// Total time discarded by the catch-up clamp.
    clamped: Duration,
}

impl FixedTimestep {
    /// Creates a driver with an explicit step interval.
    ///
    /// # Panics
    ///
    /// Panics if the interval is zero.
    #[must_use]
    pub fn new(interval: Duration, policy: CatchUpPolicy) -> Self {
        assert!(!interval.is_zero(), "Step interval must be non-zero");
        Self {
            interval,
            accumulated: Duration::ZERO,
            last_step_delta: Duration::ZERO,
            policy,
            steps_taken: 0,
            clamped: Duration::ZERO,
        }
    }

    /// Creates a driver running `hz` steps per second.
    ///
    /// The interval is `1e9 / hz` nanoseconds, truncated.
    ///
    /// # Panics
    ///
    /// Panics if `hz` is zero.
    #[must_use]
    pub fn from_rate(hz: u32, policy: CatchUpPolicy) -> Self {
        assert!(hz > 0, "Tick rate must be greater than zero");
        Self::new(
            Duration::from_nanos(1_000_000_000 / u64::from(hz)),
            policy,
        )
    }

    /// Adds host frame time. Negative or non-finite deltas are ignored.
    pub fn tick(&mut self, dt_seconds: f64) {
        let Ok(dt) = Duration::try_from_secs_f64(dt_seconds) else {
            tracing::trace!("Ignoring invalid frame delta {}", dt_seconds);
            return;
        };
        self.accumulated += dt;

        if let CatchUpPolicy::Capped { multiplier } = self.policy {
            let limit = self.interval * multiplier;
            if self.accumulated > limit {
                let excess = self.accumulated - limit;
                tracing::trace!("Catch-up clamp discarded {:?}", excess);
                self.clamped += excess;
                self.accumulated = limit;
            }
        }
    }

    /// Consumes one step if enough time is owed.
    ///
    /// Call in a loop until it returns false, running one systems pass per
    /// `true`.
    pub fn consume_step(&mut self) -> bool {
        if self.accumulated < self.interval {
            return false;
        }
        self.accumulated -= self.interval;
        self.last_step_delta = self.interval;
        self.steps_taken += 1;
        true
    }

    /// Length of the last consumed step in seconds; zero before the first.
    #[inline]
    #[must_use]
    pub fn delta_seconds(&self) -> f32 {
        self.last_step_delta.as_secs_f32()
    }

    /// Constant step length.
    #[inline]
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Time owed to the simulation.
    #[inline]
    #[must_use]
    pub const fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Total steps consumed.
    #[inline]
    #[must_use]
    pub const fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    /// Total time discarded by the catch-up clamp.
    #[inline]
    #[must_use]
    pub const fn clamped_time(&self) -> Duration {
        self.clamped
    }

    /// Active catch-up policy.
    #[inline]
    #[must_use]
    pub const fn policy(&self) -> CatchUpPolicy {
        self.policy
    }
}
