// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-interval event throttling.
//!
//! The first event is always admitted. After that, any event arriving less than
//! `interval_ms` after the last *admitted* event is dropped. Dropped events are
//! not queued or replayed; the next admitted event simply carries the newest
//! state.

/// Default throttle interval, roughly one frame at 60 Hz.
pub const DEFAULT_INTERVAL_MS: u64 = 16;

/// Drops events that arrive within a fixed window of the last admitted one.
#[derive(Clone, Debug)]
pub struct Throttle {
    /// Minimum spacing between admitted events, in milliseconds.
    pub interval_ms: u64,
    last_admitted: Option<u64>,
}

impl Throttle {
    /// Create a throttle with the given interval in milliseconds.
    ///
    /// An interval of `0` admits every event.
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_admitted: None,
        }
    }

    /// Decide whether an event at `timestamp` (milliseconds) passes the throttle.
    ///
    /// A timestamp earlier than the last admitted one is treated as a clock reset
    /// and admitted.
    pub fn admit(&mut self, timestamp: u64) -> bool {
        match self.last_admitted {
            Some(last) if timestamp >= last && timestamp - last < self.interval_ms => false,
            _ => {
                self.last_admitted = Some(timestamp);
                true
            }
        }
    }

    /// Timestamp of the last admitted event, if any.
    pub const fn last_admitted(&self) -> Option<u64> {
        self.last_admitted
    }

    /// Forget the last admitted event so the next one passes unconditionally.
    pub fn reset(&mut self) {
        self.last_admitted = None;
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL_MS)
    }
}
