// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use alloc::string::{String, ToString};
use core::fmt::Display;

/// Invalid list or calculator configuration.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A masonry layout needs at least one column.
    #[error("column count must be at least 1")]
    ZeroColumns,
    /// Column gaps must be finite and non-negative.
    #[error("column gap must be finite and non-negative, got {0}")]
    InvalidGap(f64),
    /// An explicit column width must be finite and positive.
    #[error("column width must be finite and positive, got {0}")]
    InvalidColumnWidth(f64),
    /// The fallback item height must be finite and non-negative.
    #[error("default item height must be finite and non-negative, got {0}")]
    InvalidDefaultHeight(f64),
    /// The overscan window must be finite and non-negative.
    #[error("window size must be finite and non-negative, got {0}")]
    InvalidWindowSize(f64),
    /// The end-reached threshold is a fraction of the content extent.
    #[error("end-reached threshold must lie in [0, 1], got {0}")]
    InvalidThreshold(f64),
    /// Pull distances must be finite, non-negative, and ordered.
    #[error("refresh threshold {threshold} must be non-negative and within max pull distance {max_pull_distance}")]
    InvalidPullDistance {
        /// Configured refresh threshold.
        threshold: f64,
        /// Configured maximum pull distance.
        max_pull_distance: f64,
    },
}

/// Failure to resolve the height of a single item.
///
/// The list never aborts a layout pass because of this error: the item falls
/// back to the configured default height.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("height resolution failed: {reason}")]
pub struct HeightError {
    reason: String,
}

impl HeightError {
    /// Create an error with a human-readable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The reason given when the error was created.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Failure reported by the host when settling a pagination or refresh request.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SettleError {
    message: String,
}

impl SettleError {
    /// Capture the display form of any host error.
    pub fn from_display(err: &impl Display) -> Self {
        Self {
            message: err.to_string(),
        }
    }

    /// The captured message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
