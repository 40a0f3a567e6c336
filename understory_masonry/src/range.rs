// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visible range resolution over a masonry layout.

use core::ops::RangeInclusive;

use crate::{LayoutCache, ViewportState};

/// Divisor that turns `window_size` into screens of overscan.
///
/// With the default `window_size` of 21, the band extends one full viewport
/// height above and below the visible area.
pub const OVERSCAN_NORMALIZER: f64 = 21.0;

/// Inclusive range of item indices to mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisibleRange {
    /// First index to mount.
    pub start: usize,
    /// Last index to mount (inclusive).
    pub end: usize,
}

impl VisibleRange {
    /// Creates a range covering `start..=end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Range mounted before any layout exists: `[0, min(initial, len - 1)]`.
    ///
    /// Returns `None` for an empty data set.
    #[must_use]
    pub fn bootstrap(len: usize, initial_num_to_render: usize) -> Option<Self> {
        let last = len.checked_sub(1)?;
        Some(Self::new(0, initial_num_to_render.min(last)))
    }

    /// Whether `index` lies inside the range.
    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    /// The indices as a standard inclusive range.
    #[must_use]
    pub const fn indices(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// Windowing knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowParams {
    /// Overscan in units of `viewport height / OVERSCAN_NORMALIZER` on each side.
    pub window_size: f64,
    /// Extra indices added on both sides of the intersecting range.
    pub max_to_render_per_batch: usize,
    /// Size of the bootstrap range.
    pub initial_num_to_render: usize,
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            window_size: 21.0,
            max_to_render_per_batch: 10,
            initial_num_to_render: 10,
        }
    }
}

/// The expanded vertical band `[start_y, end_y]` around the viewport.
#[must_use]
pub fn overscan_band(viewport: &ViewportState, window_size: f64) -> (f64, f64) {
    let overscan = window_size.max(0.0) * viewport.height() / OVERSCAN_NORMALIZER;
    let start_y = (viewport.scroll_offset - overscan).max(0.0);
    let end_y = viewport.end() + overscan;
    (start_y, end_y)
}

/// Compute which items to mount.
///
/// - `len` is the length of the *current* data set. The cache may lag behind
///   it (a rebuild is still in flight); indices are clamped to `len` either way.
/// - Without a cache, or with an empty one, the bootstrap range is returned.
/// - Otherwise every cached entry whose box intersects the overscan band
///   contributes to `[start, end]`, which is then widened by
///   `max_to_render_per_batch` on each side and clamped to the data bounds.
/// - If nothing intersects (transient states during fast scrolling), the
///   bootstrap range is returned rather than nothing.
///
/// Returns `None` only for an empty data set. This is a linear scan over the
/// cache.
#[must_use]
pub fn resolve_visible_range(
    viewport: &ViewportState,
    cache: Option<&LayoutCache>,
    len: usize,
    params: &WindowParams,
) -> Option<VisibleRange> {
    let bootstrap = VisibleRange::bootstrap(len, params.initial_num_to_render)?;
    let Some(cache) = cache.filter(|cache| !cache.is_empty()) else {
        return Some(bootstrap);
    };

    let (start_y, end_y) = overscan_band(viewport, params.window_size);
    let mut found: Option<(usize, usize)> = None;
    for (index, entry) in cache.iter().take(len) {
        if entry.intersects_band(start_y, end_y) {
            found = Some(match found {
                None => (index, index),
                Some((first, _)) => (first, index),
            });
        }
    }

    let Some((first, last)) = found else {
        return Some(bootstrap);
    };
    let batch = params.max_to_render_per_batch;
    Some(VisibleRange::new(
        first.saturating_sub(batch),
        last.saturating_add(batch).min(len - 1),
    ))
}
