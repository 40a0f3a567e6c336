// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pull-to-refresh gesture state machine.
//!
//! ```text
//! Idle --pull past 0--> Pulling --release, pulled >= threshold--> Refreshing --settle--> Idle
//!                       Pulling --release, pulled <  threshold--> Idle
//! ```
//!
//! The pulled distance is the magnitude of the top overscroll, clamped to
//! `max_pull_distance`. While refreshing, further pulls are ignored so a single
//! gesture can never request more than one refresh.
//!
//! ## Usage
//!
//! ```
//! use understory_scroll_state::pull_refresh::{PullRefreshState, PullRelease, RefreshPhase};
//!
//! let mut state = PullRefreshState::new(60.0, 120.0);
//!
//! state.on_pull(30.0);
//! assert_eq!(state.phase(), RefreshPhase::Pulling);
//! state.on_pull(200.0);
//! // Clamped to the maximum pull distance.
//! assert_eq!(state.pulled(), 120.0);
//!
//! assert_eq!(state.on_release(), PullRelease::Refresh);
//! assert_eq!(state.phase(), RefreshPhase::Refreshing);
//!
//! assert!(state.settle());
//! assert_eq!(state.phase(), RefreshPhase::Idle);
//! ```

/// Phase of the pull-to-refresh gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum RefreshPhase {
    /// No gesture in progress.
    #[default]
    Idle,
    /// The content is being pulled down past its top edge.
    Pulling,
    /// A refresh was requested and has not settled yet.
    Refreshing,
}

/// Outcome of releasing a pull gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PullRelease {
    /// Released past the threshold: the caller should start exactly one refresh.
    Refresh,
    /// Released short of the threshold: back to idle, nothing to do.
    Cancel,
    /// There was no pull in progress.
    Ignored,
}

/// Pull-to-refresh state machine.
#[derive(Clone, Debug)]
pub struct PullRefreshState {
    /// Pull distance at or beyond which a release requests a refresh.
    pub threshold: f64,
    /// Upper bound for the tracked pull distance.
    pub max_pull_distance: f64,
    phase: RefreshPhase,
    pulled: f64,
}

impl PullRefreshState {
    /// Create an idle state machine.
    pub const fn new(threshold: f64, max_pull_distance: f64) -> Self {
        Self {
            threshold,
            max_pull_distance,
            phase: RefreshPhase::Idle,
            pulled: 0.0,
        }
    }

    /// Current phase.
    pub const fn phase(&self) -> RefreshPhase {
        self.phase
    }

    /// Current (clamped) pull distance.
    pub const fn pulled(&self) -> f64 {
        self.pulled
    }

    /// Pull progress toward the threshold in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.threshold <= 0.0 {
            return if self.pulled > 0.0 { 1.0 } else { 0.0 };
        }
        (self.pulled / self.threshold).clamp(0.0, 1.0)
    }

    /// Record the current top overscroll distance (a non-negative magnitude).
    ///
    /// A positive distance starts (or continues) a pull. A distance of zero
    /// keeps an ongoing pull alive at zero so that the release still resolves
    /// it. Ignored while refreshing.
    pub fn on_pull(&mut self, distance: f64) -> RefreshPhase {
        if self.phase == RefreshPhase::Refreshing || distance.is_nan() {
            return self.phase;
        }
        let distance = distance.clamp(0.0, self.max_pull_distance.max(0.0));
        if distance > 0.0 {
            self.phase = RefreshPhase::Pulling;
            self.pulled = distance;
        } else if self.phase == RefreshPhase::Pulling {
            self.pulled = 0.0;
        }
        self.phase
    }

    /// Resolve the gesture when the pointer is released.
    pub fn on_release(&mut self) -> PullRelease {
        if self.phase != RefreshPhase::Pulling {
            return PullRelease::Ignored;
        }
        if self.pulled > 0.0 && self.pulled >= self.threshold {
            self.phase = RefreshPhase::Refreshing;
            PullRelease::Refresh
        } else {
            self.phase = RefreshPhase::Idle;
            self.pulled = 0.0;
            PullRelease::Cancel
        }
    }

    /// Enter the refreshing phase without a gesture (host-controlled refresh).
    pub fn begin_refresh(&mut self) {
        self.phase = RefreshPhase::Refreshing;
    }

    /// Finish a refresh, whatever its outcome.
    ///
    /// Returns `true` if a refresh was in progress.
    pub fn settle(&mut self) -> bool {
        let was_refreshing = self.phase == RefreshPhase::Refreshing;
        if was_refreshing {
            self.phase = RefreshPhase::Idle;
            self.pulled = 0.0;
        }
        was_refreshing
    }

    /// Abandon any gesture in progress (for example on pointer cancel).
    pub fn cancel(&mut self) {
        if self.phase == RefreshPhase::Pulling {
            self.phase = RefreshPhase::Idle;
            self.pulled = 0.0;
        }
    }
}

impl Default for PullRefreshState {
    fn default() -> Self {
        Self::new(60.0, 120.0)
    }
}
