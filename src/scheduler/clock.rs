//! Countdown clock for a single session.
//!
//! The clock only counts. It never decides what happens when it reaches
//! zero; it reports the expiry and leaves the transition to the scheduler.

/// Result of a single clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    /// The clock is paused or already at zero; nothing changed
    Idle,
    /// One second elapsed and time remains
    Counted {
        /// Remaining seconds after the decrement
        remaining_seconds: u32,
    },
    /// The decrement brought the clock to zero
    Expired,
}

/// Holds the remaining seconds of the current session and whether they are
/// counting down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClock {
    remaining_seconds: u32,
    running: bool,
}

impl SessionClock {
    /// Creates a paused clock loaded with `seconds`.
    pub fn new(seconds: u32) -> Self {
        Self {
            remaining_seconds: seconds,
            running: false,
        }
    }

    /// Advances the clock by one second.
    pub fn tick(&mut self) -> ClockTick {
        if !self.running || self.remaining_seconds == 0 {
            return ClockTick::Idle;
        }

        self.remaining_seconds -= 1;
        if self.remaining_seconds == 0 {
            ClockTick::Expired
        } else {
            ClockTick::Counted {
                remaining_seconds: self.remaining_seconds,
            }
        }
    }

    /// Reloads the remaining time. The running flag is left as is.
    pub fn set_duration(&mut self, seconds: u32) {
        self.remaining_seconds = seconds;
    }

    /// Marks the clock as running.
    pub fn resume(&mut self) {
        self.running = true;
    }

    /// Marks the clock as paused.
    pub fn suspend(&mut self) {
        self.running = false;
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns true once the countdown has reached zero.
    pub fn is_expired(&self) -> bool {
        self.remaining_seconds == 0
    }
}
