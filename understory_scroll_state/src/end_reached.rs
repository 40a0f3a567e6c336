// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-of-content detection with once-per-crossing semantics.
//!
//! The trailing *threshold band* of a strip of content is the last
//! `threshold * content_extent` units. The viewport is "past the threshold" when
//! its trailing edge lies inside (or beyond) that band:
//!
//! ```text
//! scroll_offset + viewport_extent >= content_extent - content_extent * threshold
//! ```
//!
//! Entering the band fires once and sets a latch. While the latch is set, further
//! scrolling inside the band is silent. Leaving the band clears the latch, so the
//! next entry fires again.

/// Latching detector for "the viewport reached the end of the content".
#[derive(Clone, Debug)]
pub struct EndReachedState {
    /// Fraction of the content extent, measured from the end, that counts as
    /// "reached". `0.0` means the very end; `0.5` means the last half.
    pub threshold: f64,
    latched: bool,
}

impl EndReachedState {
    /// Create a detector with the given trailing threshold fraction.
    pub const fn new(threshold: f64) -> Self {
        Self {
            threshold,
            latched: false,
        }
    }

    /// Returns `true` if the viewport's trailing edge lies inside the threshold band.
    pub fn is_past_threshold(
        &self,
        scroll_offset: f64,
        viewport_extent: f64,
        content_extent: f64,
    ) -> bool {
        scroll_offset + viewport_extent >= content_extent - content_extent * self.threshold
    }

    /// Feed the current scroll geometry.
    ///
    /// Returns `true` exactly once per crossing into the threshold band.
    pub fn on_scroll(
        &mut self,
        scroll_offset: f64,
        viewport_extent: f64,
        content_extent: f64,
    ) -> bool {
        if self.is_past_threshold(scroll_offset, viewport_extent, content_extent) {
            if self.latched {
                false
            } else {
                self.latched = true;
                true
            }
        } else {
            self.latched = false;
            false
        }
    }

    /// Whether the detector has fired and is waiting for the viewport to leave the band.
    pub const fn is_latched(&self) -> bool {
        self.latched
    }

    /// Clear the latch so that the next evaluation inside the band fires again.
    pub fn reset(&mut self) {
        self.latched = false;
    }
}

impl Default for EndReachedState {
    fn default() -> Self {
        Self::new(0.5)
    }
}
