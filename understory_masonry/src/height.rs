// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-item height resolution.
//!
//! A [`HeightResolver`] answers, for each item of a layout pass, either with a
//! height right away or with [`ItemHeight::Pending`]. Pending heights are
//! delivered later by the host through
//! [`MasonryList::deliver_height`](crate::MasonryList::deliver_height), quoting
//! the [`HeightTicket`] handed to the resolver.

use core::fmt;

use crate::HeightError;

/// Height used for an item when no resolver is supplied or resolution fails.
pub const DEFAULT_ITEM_HEIGHT: f64 = 200.0;

/// Identifies one height request within one layout pass.
///
/// `generation` increases with every rebuild, so a ticket from a superseded
/// pass can be recognized and ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HeightTicket {
    /// Rebuild sequence number the request belongs to.
    pub generation: u64,
    /// Item index within the data snapshot of that rebuild.
    pub index: usize,
}

/// Answer of a [`HeightResolver`] for a single item.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemHeight {
    /// The height is known now.
    Ready(f64),
    /// The height will be delivered later for the same ticket.
    Pending,
    /// The height could not be resolved; the default height is used.
    Failed(HeightError),
}

/// Source of item heights for layout passes.
pub trait HeightResolver<T> {
    /// Resolve the height of `item` at `ticket.index`.
    fn item_height(&mut self, item: &T, ticket: HeightTicket) -> ItemHeight;
}

/// Resolver that gives every item the same height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformHeight(pub f64);

impl Default for UniformHeight {
    fn default() -> Self {
        Self(DEFAULT_ITEM_HEIGHT)
    }
}

impl<T> HeightResolver<T> for UniformHeight {
    fn item_height(&mut self, _item: &T, _ticket: HeightTicket) -> ItemHeight {
        ItemHeight::Ready(self.0)
    }
}

/// Resolver backed by a synchronous `(item, index) -> height` function.
pub struct HeightFn<F>(pub F);

impl<F> fmt::Debug for HeightFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeightFn").finish_non_exhaustive()
    }
}

impl<T, F> HeightResolver<T> for HeightFn<F>
where
    F: FnMut(&T, usize) -> f64,
{
    fn item_height(&mut self, item: &T, ticket: HeightTicket) -> ItemHeight {
        ItemHeight::Ready((self.0)(item, ticket.index))
    }
}

/// Normalize a resolved height for layout.
///
/// Non-finite heights fall back to `fallback`; finite negative heights clamp to zero.
pub(crate) fn sanitize_height(height: f64, fallback: f64, index: usize) -> f64 {
    if !height.is_finite() {
        log::warn!("item {index}: non-finite height {height}, using default {fallback}");
        fallback
    } else if height.is_sign_negative() {
        0.0
    } else {
        height
    }
}

/// Turn a delivered height result into a layout height, logging failures.
pub(crate) fn settle_height(result: Result<f64, HeightError>, fallback: f64, index: usize) -> f64 {
    match result {
        Ok(height) => sanitize_height(height, fallback, index),
        Err(err) => {
            log::warn!("item {index}: {err}; using default height {fallback}");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(index: usize) -> HeightTicket {
        HeightTicket {
            generation: 1,
            index,
        }
    }

    #[test]
    fn uniform_height_answers_immediately() {
        let mut resolver = UniformHeight(42.0);
        assert_eq!(
            HeightResolver::<u8>::item_height(&mut resolver, &0, ticket(3)),
            ItemHeight::Ready(42.0)
        );
        assert_eq!(UniformHeight::default().0, DEFAULT_ITEM_HEIGHT);
    }

    #[test]
    fn height_fn_sees_item_and_index() {
        let mut resolver = HeightFn(|item: &f64, index: usize| *item + index as f64);
        assert_eq!(resolver.item_height(&10.0, ticket(5)), ItemHeight::Ready(15.0));
    }

    #[test]
    fn sanitize_clamps_and_falls_back() {
        assert_eq!(sanitize_height(12.0, 99.0, 0), 12.0);
        assert_eq!(sanitize_height(-3.0, 99.0, 0), 0.0);
        assert_eq!(sanitize_height(f64::NAN, 99.0, 0), 99.0);
        assert_eq!(sanitize_height(f64::INFINITY, 99.0, 0), 99.0);
    }

    #[test]
    fn failed_delivery_uses_fallback() {
        assert_eq!(settle_height(Err(HeightError::new("boom")), 7.0, 2), 7.0);
        assert_eq!(settle_height(Ok(3.0), 7.0, 2), 3.0);
    }
}
