// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport geometry reported by the host scroll container.

use kurbo::Size;

/// Scroll offset and container size of the host scroll view.
///
/// Updated only by host scroll and layout events; layout code reads it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportState {
    /// Distance from the top of the content to the top of the viewport (`>= 0`).
    pub scroll_offset: f64,
    /// Size of the scroll container.
    pub container: Size,
}

impl ViewportState {
    /// A viewport at the top of the content with the given container size.
    #[must_use]
    pub const fn new(container: Size) -> Self {
        Self {
            scroll_offset: 0.0,
            container,
        }
    }

    /// Container width.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.container.width
    }

    /// Container height.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.container.height
    }

    /// Whether the host has reported a usable container width yet.
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.container.width > 0.0 && self.container.width.is_finite()
    }

    /// Bottom edge of the viewport in content space.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.scroll_offset + self.container.height
    }
}
