// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll coordination: throttled offsets, pagination, and pull-to-refresh.

use core::fmt::Display;

use understory_scroll_state::end_reached::EndReachedState;
use understory_scroll_state::pull_refresh::{PullRefreshState, PullRelease, RefreshPhase};
use understory_scroll_state::throttle::Throttle;

use crate::{MasonryConfig, SettleError, ViewportState};

bitflags::bitflags! {
    /// What a processed scroll event changed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ScrollSignals: u8 {
        /// The event passed the throttle.
        const ADMITTED       = 0b0000_0001;
        /// The stored scroll offset changed.
        const OFFSET_CHANGED = 0b0000_0010;
        /// The viewport crossed into the end-reached band: load the next page.
        const END_REACHED    = 0b0000_0100;
        /// A pull-to-refresh gesture is in progress.
        const PULLING        = 0b0000_1000;
    }
}

/// Progress of the most recent pagination request.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum PaginationState {
    /// No request outstanding.
    #[default]
    Idle,
    /// An end-reached signal was emitted and has not settled yet.
    Loading,
    /// The last request failed; the host may retry.
    Failed(SettleError),
}

/// Turns raw scroll events into viewport updates and list signals.
///
/// The three concerns are independent:
/// - throttling decides which raw events are processed at all,
/// - the end-reached latch emits at most one pagination signal per crossing,
/// - the pull-to-refresh machine tracks top overscroll and releases.
#[derive(Clone, Debug)]
pub struct ScrollCoordinator {
    throttle: Throttle,
    end_reached: EndReachedState,
    pull: PullRefreshState,
    pagination: PaginationState,
    last_refresh_error: Option<SettleError>,
}

impl ScrollCoordinator {
    /// Create a coordinator from the list configuration.
    #[must_use]
    pub fn new(config: &MasonryConfig) -> Self {
        Self {
            throttle: Throttle::new(config.scroll_throttle_ms),
            end_reached: EndReachedState::new(config.end_reached_threshold),
            pull: PullRefreshState::new(config.refresh_threshold, config.max_pull_distance),
            pagination: PaginationState::Idle,
            last_refresh_error: None,
        }
    }

    /// Process a raw scroll event at `timestamp` milliseconds.
    ///
    /// `raw_offset` may be negative while the host shows top overscroll; the
    /// stored offset is clamped at zero and the overscroll feeds the pull
    /// gesture. `content_height` is `None` until a layout exists, in which case
    /// end-reached is not evaluated.
    pub fn on_scroll(
        &mut self,
        viewport: &mut ViewportState,
        raw_offset: f64,
        timestamp: u64,
        content_height: Option<f64>,
    ) -> ScrollSignals {
        if !raw_offset.is_finite() || !self.throttle.admit(timestamp) {
            return ScrollSignals::empty();
        }
        let mut signals = ScrollSignals::ADMITTED;

        let offset = raw_offset.max(0.0);
        if offset != viewport.scroll_offset {
            viewport.scroll_offset = offset;
            signals |= ScrollSignals::OFFSET_CHANGED;
        }

        if raw_offset < 0.0 || self.pull.phase() == RefreshPhase::Pulling {
            self.pull.on_pull((-raw_offset).max(0.0));
        }
        if self.pull.phase() == RefreshPhase::Pulling {
            signals |= ScrollSignals::PULLING;
        }

        if let Some(content_height) = content_height
            && self
                .end_reached
                .on_scroll(offset, viewport.height(), content_height)
        {
            self.pagination = PaginationState::Loading;
            signals |= ScrollSignals::END_REACHED;
        }
        signals
    }

    /// Finish the pull gesture. Returns `true` if the host should refresh now.
    pub fn release_pull(&mut self) -> bool {
        match self.pull.on_release() {
            PullRelease::Refresh => {
                self.last_refresh_error = None;
                true
            }
            PullRelease::Cancel | PullRelease::Ignored => false,
        }
    }

    /// Settle a refresh and scroll back to the top, whatever the outcome.
    ///
    /// Returns `true` if a refresh was in progress.
    pub fn finish_refresh<E: Display>(
        &mut self,
        viewport: &mut ViewportState,
        result: Result<(), E>,
    ) -> bool {
        if !self.pull.settle() {
            return false;
        }
        if let Err(err) = result {
            log::warn!("refresh failed: {err}");
            self.last_refresh_error = Some(SettleError::from_display(&err));
        }
        viewport.scroll_offset = 0.0;
        // The content is about to change under the viewport; re-arm pagination.
        self.end_reached.reset();
        true
    }

    /// Host-controlled refresh indicator.
    ///
    /// Clearing the flag while refreshing settles the refresh as a success, with
    /// the same scroll reset as [`ScrollCoordinator::finish_refresh`]. Returns
    /// `true` if a refresh was settled.
    pub fn set_refreshing(&mut self, viewport: &mut ViewportState, refreshing: bool) -> bool {
        match (refreshing, self.pull.phase()) {
            (true, RefreshPhase::Refreshing) | (false, RefreshPhase::Idle) => false,
            (true, _) => {
                self.pull.begin_refresh();
                self.last_refresh_error = None;
                false
            }
            (false, RefreshPhase::Refreshing) => {
                self.finish_refresh(viewport, Ok::<(), &str>(()))
            }
            (false, RefreshPhase::Pulling) => {
                self.pull.cancel();
                false
            }
        }
    }

    /// Settle the outstanding pagination request.
    pub fn finish_end_reached<E: Display>(&mut self, result: Result<(), E>) {
        self.pagination = match result {
            Ok(()) => PaginationState::Idle,
            Err(err) => {
                log::warn!("loading more items failed: {err}");
                PaginationState::Failed(SettleError::from_display(&err))
            }
        };
    }

    /// Clear the pagination error and the end-reached latch so the next
    /// scroll inside the band signals again.
    pub fn reset_end_reached(&mut self) {
        self.pagination = PaginationState::Idle;
        self.end_reached.reset();
    }

    /// Current pull-to-refresh phase.
    #[must_use]
    pub fn refresh_phase(&self) -> RefreshPhase {
        self.pull.phase()
    }

    /// Current pull distance.
    #[must_use]
    pub fn pull_distance(&self) -> f64 {
        self.pull.pulled()
    }

    /// Pull progress toward the refresh threshold in `[0, 1]`.
    #[must_use]
    pub fn pull_progress(&self) -> f64 {
        self.pull.progress()
    }

    /// Pagination request state.
    #[must_use]
    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    /// Error of the last failed refresh, cleared when the next refresh starts.
    #[must_use]
    pub fn last_refresh_error(&self) -> Option<&SettleError> {
        self.last_refresh_error.as_ref()
    }
}
