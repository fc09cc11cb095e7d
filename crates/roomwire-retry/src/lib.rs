//! Bounded reconnect backoff for roomwire.
//!
//! After a transient close the connection manager asks [`RetryState`] for
//! the next [`Backoff`]. The delay grows linearly with the attempt count
//! (`base_delay * attempt`), so with the defaults the schedule is
//! 500 ms, 1000 ms, 1500 ms, 2000 ms, 2500 ms and then nothing: the budget
//! is spent and the manager stops trying.
//!
//! A successful open resets the counter, so every outage gets the full
//! budget again.
//!
//! # Integration
//!
//! The wait is designed to sit inside the connection task's
//! `tokio::select!` so that disposal can cut it short:
//!
//! ```ignore
//! match retry.next_backoff() {
//!     Some(backoff) => tokio::select! {
//!         _ = backoff.wait() => { /* reconnect */ }
//!         _ = cancel.changed() => { /* disposed, stop */ }
//!     },
//!     None => { /* retries exhausted */ }
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Reconnect policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// How many reconnects to attempt before giving up. 0 disables
    /// reconnecting entirely.
    pub max_attempts: u32,
    /// Delay unit; attempt `n` waits `base_delay * n`.
    pub base_delay: Duration,
    /// Upper bound of a random extra delay added to each wait. Zero keeps
    /// the schedule exact.
    pub jitter: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            base_delay: Self::DEFAULT_BASE_DELAY,
            jitter: Duration::ZERO,
        }
    }
}

impl RetryConfig {
    /// Default reconnect budget.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

    /// Default delay unit.
    pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

    /// Longest delay unit accepted; larger values are clamped.
    pub const MAX_BASE_DELAY: Duration = Duration::from_secs(60);

    /// A policy that never reconnects.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 0,
            ..Default::default()
        }
    }

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`RetryState::new`]. Rules:
    /// - `base_delay` capped to [`Self::MAX_BASE_DELAY`].
    /// - `jitter` capped to `base_delay`.
    pub fn validated(mut self) -> Self {
        if self.base_delay > Self::MAX_BASE_DELAY {
            warn!(
                base_ms = self.base_delay.as_millis() as u64,
                max_ms = Self::MAX_BASE_DELAY.as_millis() as u64,
                "retry base delay exceeds maximum, clamping"
            );
            self.base_delay = Self::MAX_BASE_DELAY;
        }
        if self.jitter > self.base_delay {
            self.jitter = self.base_delay;
        }
        self
    }

    /// The un-jittered delay before reconnect number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

// ---------------------------------------------------------------------------
// Backoff (returned to caller per retry)
// ---------------------------------------------------------------------------

/// One scheduled reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// 1-based attempt number this wait precedes.
    pub attempt: u32,
    /// How long to wait before reconnecting.
    pub delay: Duration,
}

impl Backoff {
    /// Sleeps for the scheduled delay.
    ///
    /// Cancel-safe: dropping the future abandons the wait with no side
    /// effects.
    pub async fn wait(self) {
        tokio::time::sleep(self.delay).await;
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Attempt counter for one connection manager.
#[derive(Debug, Clone)]
pub struct RetryState {
    config: RetryConfig,
    attempt: u32,
}

impl RetryState {
    /// Create a fresh counter at attempt 0.
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config: config.validated(),
            attempt: 0,
        }
    }

    /// Record a successful open. The next outage starts again at 1.
    pub fn reset(&mut self) {
        if self.attempt > 0 {
            debug!(after = self.attempt, "retry counter reset");
        }
        self.attempt = 0;
    }

    /// Consume one attempt and return its backoff, or `None` once the
    /// budget is spent.
    pub fn next_backoff(&mut self) -> Option<Backoff> {
        if self.attempt >= self.config.max_attempts {
            return None;
        }
        self.attempt += 1;

        let mut delay = self.config.delay_for(self.attempt);
        if !self.config.jitter.is_zero() {
            let max_us = self.config.jitter.as_micros() as u64;
            let extra = rand::rng().random_range(0..=max_us);
            delay += Duration::from_micros(extra);
        }

        Some(Backoff {
            attempt: self.attempt,
            delay,
        })
    }

    /// Whether the reconnect budget is spent.
    pub fn is_exhausted(&self) -> bool {
        self.attempt >= self.config.max_attempts
    }

    /// Attempts consumed since the last reset.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// The active (validated) config.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

impl Default for RetryState {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}
