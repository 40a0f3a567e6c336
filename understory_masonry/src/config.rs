// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! List configuration.

use crate::render::ListSlots;
use crate::{ConfigError, DEFAULT_ITEM_HEIGHT, WindowParams};

/// Configuration of a [`MasonryList`](crate::MasonryList).
///
/// Build it with [`MasonryConfig::default`] and the `with_*` methods; the list
/// validates it on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct MasonryConfig {
    /// Number of columns. Must be at least 1.
    pub num_columns: usize,
    /// Explicit column width. When `None`, the width is derived from the
    /// container: `(width - (num_columns - 1) * column_gap) / num_columns`.
    pub column_width: Option<f64>,
    /// Horizontal gap between columns and vertical gap between items.
    pub column_gap: f64,
    /// Overscan, in `viewport height / 21` units on each side of the viewport.
    pub window_size: f64,
    /// Extra items mounted before and after the intersecting range.
    pub max_to_render_per_batch: usize,
    /// Items mounted before the first layout pass completes.
    pub initial_num_to_render: usize,
    /// Trailing fraction of the content that counts as "end reached".
    pub end_reached_threshold: f64,
    /// Height used when no resolver answers or resolution fails.
    pub default_item_height: f64,
    /// Minimum spacing between processed scroll events, in milliseconds.
    pub scroll_throttle_ms: u64,
    /// Pull distance at which releasing requests a refresh.
    pub refresh_threshold: f64,
    /// Upper bound for the tracked pull distance.
    pub max_pull_distance: f64,
    /// Which optional slots (header, footer, empty state) the host provides.
    pub slots: ListSlots,
}

impl Default for MasonryConfig {
    fn default() -> Self {
        let window = WindowParams::default();
        Self {
            num_columns: 2,
            column_width: None,
            column_gap: 8.0,
            window_size: window.window_size,
            max_to_render_per_batch: window.max_to_render_per_batch,
            initial_num_to_render: window.initial_num_to_render,
            end_reached_threshold: 0.5,
            default_item_height: DEFAULT_ITEM_HEIGHT,
            scroll_throttle_ms: understory_scroll_state::throttle::DEFAULT_INTERVAL_MS,
            refresh_threshold: 60.0,
            max_pull_distance: 120.0,
            slots: ListSlots::empty(),
        }
    }
}

impl MasonryConfig {
    /// Sets the column count.
    #[must_use]
    pub fn with_num_columns(mut self, num_columns: usize) -> Self {
        self.num_columns = num_columns;
        self
    }

    /// Sets an explicit column width.
    #[must_use]
    pub fn with_column_width(mut self, column_width: f64) -> Self {
        self.column_width = Some(column_width);
        self
    }

    /// Sets the column gap.
    #[must_use]
    pub fn with_column_gap(mut self, column_gap: f64) -> Self {
        self.column_gap = column_gap;
        self
    }

    /// Sets the windowing parameters.
    #[must_use]
    pub fn with_window(mut self, window: WindowParams) -> Self {
        self.window_size = window.window_size;
        self.max_to_render_per_batch = window.max_to_render_per_batch;
        self.initial_num_to_render = window.initial_num_to_render;
        self
    }

    /// Sets the end-reached threshold.
    #[must_use]
    pub fn with_end_reached_threshold(mut self, threshold: f64) -> Self {
        self.end_reached_threshold = threshold;
        self
    }

    /// Sets the fallback item height.
    #[must_use]
    pub fn with_default_item_height(mut self, height: f64) -> Self {
        self.default_item_height = height;
        self
    }

    /// Sets the scroll throttle interval.
    #[must_use]
    pub fn with_scroll_throttle_ms(mut self, interval_ms: u64) -> Self {
        self.scroll_throttle_ms = interval_ms;
        self
    }

    /// Sets the pull-to-refresh threshold and maximum pull distance.
    #[must_use]
    pub fn with_pull_to_refresh(mut self, threshold: f64, max_pull_distance: f64) -> Self {
        self.refresh_threshold = threshold;
        self.max_pull_distance = max_pull_distance;
        self
    }

    /// Declares which optional slots the host renders.
    #[must_use]
    pub fn with_slots(mut self, slots: ListSlots) -> Self {
        self.slots = slots;
        self
    }

    /// The windowing parameters.
    #[must_use]
    pub fn window(&self) -> WindowParams {
        WindowParams {
            window_size: self.window_size,
            max_to_render_per_batch: self.max_to_render_per_batch,
            initial_num_to_render: self.initial_num_to_render,
        }
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_columns == 0 {
            return Err(ConfigError::ZeroColumns);
        }
        if !self.column_gap.is_finite() || self.column_gap < 0.0 {
            return Err(ConfigError::InvalidGap(self.column_gap));
        }
        if let Some(width) = self.column_width
            && (!width.is_finite() || width <= 0.0)
        {
            return Err(ConfigError::InvalidColumnWidth(width));
        }
        if !self.default_item_height.is_finite() || self.default_item_height < 0.0 {
            return Err(ConfigError::InvalidDefaultHeight(self.default_item_height));
        }
        if !self.window_size.is_finite() || self.window_size < 0.0 {
            return Err(ConfigError::InvalidWindowSize(self.window_size));
        }
        if !(0.0..=1.0).contains(&self.end_reached_threshold) {
            return Err(ConfigError::InvalidThreshold(self.end_reached_threshold));
        }
        let pull_ok = self.refresh_threshold.is_finite()
            && self.max_pull_distance.is_finite()
            && self.refresh_threshold >= 0.0
            && self.refresh_threshold <= self.max_pull_distance;
        if !pull_ok {
            return Err(ConfigError::InvalidPullDistance {
                threshold: self.refresh_threshold,
                max_pull_distance: self.max_pull_distance,
            });
        }
        Ok(())
    }
}
