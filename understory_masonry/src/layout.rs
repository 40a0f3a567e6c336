// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy shortest-column placement.

use core::num::NonZeroUsize;

use kurbo::{Point, Rect};
use smallvec::{SmallVec, smallvec};

use crate::ConfigError;

/// Placement of one item in content space.
///
/// `x`/`y` are the top-left corner, `width` is the column width, and `column` is
/// the zero-based column the item was placed in. An entry never changes once it
/// has been produced for a given data snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutEntry {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Column width.
    pub width: f64,
    /// Resolved item height.
    pub height: f64,
    /// Zero-based column index.
    pub column: usize,
}

impl LayoutEntry {
    /// Bottom edge, `y + height`.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// The item's box as a [`Rect`].
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.bottom())
    }

    /// Whether the vertical span `[y, y + height]` touches `[start_y, end_y]`.
    ///
    /// Edges are inclusive, so an item ending exactly at `start_y` intersects.
    #[must_use]
    pub fn intersects_band(&self, start_y: f64, end_y: f64) -> bool {
        self.y <= end_y && self.bottom() >= start_y
    }

    /// Whether `point` lies within the item's box.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.rect().contains(point)
    }
}

/// Width of each column when `num_columns` columns and their gaps share `container_width`.
///
/// Never negative; a container narrower than its gaps yields zero-width columns.
#[must_use]
pub fn column_width_for(container_width: f64, num_columns: NonZeroUsize, column_gap: f64) -> f64 {
    let n = num_columns.get() as f64;
    ((container_width - (n - 1.0) * column_gap) / n).max(0.0)
}

/// Greedy masonry packer.
///
/// Each added item goes into the column whose running height is currently the
/// smallest; ties go to the lowest column index. The result is deterministic for
/// a given input sequence and approximately balanced, not optimally packed.
///
/// ```
/// use understory_masonry::LayoutCalculator;
///
/// let mut calc = LayoutCalculator::new(2, 200.0, 0.0).unwrap();
/// let a = calc.add_item(120.0);
/// let b = calc.add_item(80.0);
/// let c = calc.add_item(150.0);
/// assert_eq!((a.column, b.column, c.column), (0, 1, 1));
/// assert_eq!(c.y, 80.0);
/// assert_eq!(calc.total_height(), 230.0);
/// ```
#[derive(Debug, Clone)]
pub struct LayoutCalculator {
    column_heights: SmallVec<[f64; 4]>,
    column_width: f64,
    column_gap: f64,
}

impl LayoutCalculator {
    /// Creates a calculator that splits `container_width` into `num_columns` columns.
    ///
    /// Rejects `num_columns == 0` and negative or non-finite gaps.
    pub fn new(
        num_columns: usize,
        container_width: f64,
        column_gap: f64,
    ) -> Result<Self, ConfigError> {
        let columns = NonZeroUsize::new(num_columns).ok_or(ConfigError::ZeroColumns)?;
        check_gap(column_gap)?;
        let width = column_width_for(container_width.max(0.0), columns, column_gap);
        Ok(Self::from_parts(columns, width, column_gap))
    }

    /// Creates a calculator with an explicit column width.
    pub fn with_column_width(
        num_columns: usize,
        column_width: f64,
        column_gap: f64,
    ) -> Result<Self, ConfigError> {
        let columns = NonZeroUsize::new(num_columns).ok_or(ConfigError::ZeroColumns)?;
        check_gap(column_gap)?;
        if !column_width.is_finite() || column_width <= 0.0 {
            return Err(ConfigError::InvalidColumnWidth(column_width));
        }
        Ok(Self::from_parts(columns, column_width, column_gap))
    }

    /// Infallible constructor for already validated inputs.
    pub(crate) fn from_parts(columns: NonZeroUsize, column_width: f64, column_gap: f64) -> Self {
        Self {
            column_heights: smallvec![0.0; columns.get()],
            column_width,
            column_gap,
        }
    }

    /// Number of columns.
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.column_heights.len()
    }

    /// Width of every column.
    #[must_use]
    pub const fn column_width(&self) -> f64 {
        self.column_width
    }

    /// Gap between columns, also used between vertically stacked items.
    #[must_use]
    pub const fn column_gap(&self) -> f64 {
        self.column_gap
    }

    /// Running height of each column, including the gap after each placed item.
    #[must_use]
    pub fn column_heights(&self) -> &[f64] {
        &self.column_heights
    }

    /// Places the next item and returns its layout.
    ///
    /// Items must be added in data order. A height of zero is valid and yields a
    /// zero-height slot; the column still advances by the gap.
    pub fn add_item(&mut self, height: f64) -> LayoutEntry {
        let column = self.shortest_column();
        let y = self.column_heights[column];
        let entry = LayoutEntry {
            x: column as f64 * (self.column_width + self.column_gap),
            y,
            width: self.column_width,
            height,
            column,
        };
        self.column_heights[column] = y + height + self.column_gap;
        entry
    }

    /// The tallest running column height.
    #[must_use]
    pub fn total_height(&self) -> f64 {
        self.column_heights.iter().copied().fold(0.0, f64::max)
    }

    /// Clears all columns back to zero height.
    pub fn reset(&mut self) {
        self.column_heights.iter_mut().for_each(|h| *h = 0.0);
    }

    fn shortest_column(&self) -> usize {
        let mut best = 0;
        for (i, h) in self.column_heights.iter().enumerate().skip(1) {
            if *h < self.column_heights[best] {
                best = i;
            }
        }
        best
    }
}

fn check_gap(column_gap: f64) -> Result<(), ConfigError> {
    if column_gap.is_finite() && column_gap >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidGap(column_gap))
    }
}
