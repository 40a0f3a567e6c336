// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout cache and the rebuild pass that produces it.
//!
//! A [`LayoutCache`] is an immutable snapshot: one [`LayoutEntry`] per item,
//! stored in an arena aligned with the data indices, plus a key map for lookups
//! by item identity. Caches are never patched. Any change to the inputs starts a
//! new [`RebuildPass`], and the cache it produces replaces the previous one only
//! once every item has been placed.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::height::{HeightResolver, HeightTicket, ItemHeight, sanitize_height, settle_height};
use crate::{HeightError, LayoutCalculator, LayoutEntry};

bitflags::bitflags! {
    /// Inputs whose change invalidates the layout cache.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Invalidation: u8 {
        /// The data set was replaced or extended.
        const DATA    = 0b0000_0001;
        /// The column count changed.
        const COLUMNS = 0b0000_0010;
        /// The container width (or an explicit column width) changed.
        const WIDTH   = 0b0000_0100;
        /// The column gap changed.
        const GAP     = 0b0000_1000;
    }
}

/// Completed layout of one data snapshot.
#[derive(Clone, Debug, Default)]
pub struct LayoutCache {
    generation: u64,
    entries: Vec<LayoutEntry>,
    keys: Vec<String>,
    by_key: HashMap<String, usize>,
    column_heights: Vec<f64>,
    content_height: f64,
}

impl LayoutCache {
    /// A cache for an empty data set.
    pub(crate) fn empty(generation: u64) -> Self {
        Self {
            generation,
            ..Self::default()
        }
    }

    /// Rebuild sequence number that produced this cache.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of laid out items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Height of the tallest column.
    #[must_use]
    pub const fn content_height(&self) -> f64 {
        self.content_height
    }

    /// Final running height of every column.
    #[must_use]
    pub fn column_heights(&self) -> &[f64] {
        &self.column_heights
    }

    /// Layout of the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&LayoutEntry> {
        self.entries.get(index)
    }

    /// Index and layout of the item with the given key.
    #[must_use]
    pub fn get_by_key(&self, key: &str) -> Option<(usize, &LayoutEntry)> {
        let index = *self.by_key.get(key)?;
        self.entries.get(index).map(|entry| (index, entry))
    }

    /// Key of the item at `index`.
    #[must_use]
    pub fn key(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }

    /// All entries in data order.
    #[must_use]
    pub fn entries(&self) -> &[LayoutEntry] {
        &self.entries
    }

    /// Iterate `(index, entry)` pairs in data order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &LayoutEntry)> {
        self.entries.iter().enumerate()
    }
}

/// One in-progress layout pass over a data snapshot.
///
/// Heights that resolve synchronously are recorded immediately. The calculator
/// then consumes the longest prefix of known heights; a pending height holds
/// back placement of everything after it (placement is order dependent), but
/// not the resolution of those later heights.
#[derive(Debug)]
pub struct RebuildPass {
    generation: u64,
    heights: Vec<Option<f64>>,
    keys: Vec<String>,
    calculator: LayoutCalculator,
    entries: Vec<LayoutEntry>,
    default_height: f64,
}

impl RebuildPass {
    /// Start a pass: extract keys and request every height.
    pub(crate) fn start<T>(
        generation: u64,
        data: &[T],
        key_fn: &dyn Fn(&T, usize) -> String,
        resolver: &mut dyn HeightResolver<T>,
        calculator: LayoutCalculator,
        default_height: f64,
    ) -> Self {
        let mut keys = Vec::with_capacity(data.len());
        let mut heights = Vec::with_capacity(data.len());
        for (index, item) in data.iter().enumerate() {
            keys.push(key_fn(item, index));
            let ticket = HeightTicket { generation, index };
            let height = match resolver.item_height(item, ticket) {
                ItemHeight::Ready(height) => Some(sanitize_height(height, default_height, index)),
                ItemHeight::Pending => None,
                ItemHeight::Failed(err) => Some(settle_height(Err(err), default_height, index)),
            };
            heights.push(height);
        }
        let mut pass = Self {
            generation,
            heights,
            keys,
            calculator,
            entries: Vec::with_capacity(data.len()),
            default_height,
        };
        pass.advance();
        pass
    }

    /// Rebuild sequence number of this pass.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of items in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Returns `true` if the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Number of items already placed.
    #[must_use]
    pub fn placed(&self) -> usize {
        self.entries.len()
    }

    /// Number of heights still outstanding.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.heights.iter().filter(|h| h.is_none()).count()
    }

    /// Whether every item has been placed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.entries.len() == self.heights.len()
    }

    /// Supply a pending height.
    ///
    /// Returns `false` if the index is out of range or already has a height.
    pub(crate) fn deliver(&mut self, index: usize, result: Result<f64, HeightError>) -> bool {
        let default_height = self.default_height;
        let Some(slot) = self.heights.get_mut(index) else {
            log::debug!(
                "rebuild {}: height for out-of-range index {index} ignored",
                self.generation
            );
            return false;
        };
        if slot.is_some() {
            log::debug!(
                "rebuild {}: duplicate height for index {index} ignored",
                self.generation
            );
            return false;
        }
        *slot = Some(settle_height(result, default_height, index));
        self.advance();
        true
    }

    fn advance(&mut self) {
        while let Some(Some(height)) = self.heights.get(self.entries.len()).copied() {
            let entry = self.calculator.add_item(height);
            self.entries.push(entry);
        }
    }

    /// Convert a complete pass into a cache.
    ///
    /// Callers check [`RebuildPass::is_complete`] first; a partial cache is never published.
    pub(crate) fn finish(self) -> LayoutCache {
        debug_assert!(
            self.is_complete(),
            "rebuild {} finished with {} of {} items placed",
            self.generation,
            self.entries.len(),
            self.heights.len()
        );
        let mut by_key = HashMap::with_capacity(self.keys.len());
        for (index, key) in self.keys.iter().enumerate() {
            if by_key.insert(key.clone(), index).is_some() {
                log::warn!(
                    "rebuild {}: duplicate item key {key:?} at index {index}",
                    self.generation
                );
            }
        }
        LayoutCache {
            generation: self.generation,
            content_height: self.calculator.total_height(),
            column_heights: self.calculator.column_heights().to_vec(),
            entries: self.entries,
            keys: self.keys,
            by_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::ToString;
    use alloc::vec;

    use super::*;
    use crate::height::{HeightFn, UniformHeight};

    fn key(item: &u32, _index: usize) -> String {
        item.to_string()
    }

    fn calculator() -> LayoutCalculator {
        LayoutCalculator::new(2, 200.0, 0.0).unwrap()
    }

    /// Resolves even items immediately and leaves odd ones pending.
    struct EvensOnly;

    impl HeightResolver<u32> for EvensOnly {
        fn item_height(&mut self, item: &u32, ticket: HeightTicket) -> ItemHeight {
            if ticket.index % 2 == 0 {
                ItemHeight::Ready(f64::from(*item))
            } else {
                ItemHeight::Pending
            }
        }
    }

    #[test]
    fn synchronous_pass_completes_immediately() {
        let data = vec![120_u32, 80, 150, 60, 90, 70];
        let mut resolver = HeightFn(|item: &u32, _: usize| f64::from(*item));
        let pass = RebuildPass::start(1, &data, &key, &mut resolver, calculator(), 50.0);
        assert!(pass.is_complete());
        assert_eq!(pass.pending(), 0);

        let cache = pass.finish();
        assert_eq!(cache.generation(), 1);
        assert_eq!(cache.len(), 6);
        assert_eq!(cache.content_height(), 300.0);
        assert_eq!(cache.column_heights(), &[270.0, 300.0]);
        assert_eq!(cache.get(2).unwrap().column, 1);
        assert_eq!(cache.key(3), Some("60"));

        let (index, entry) = cache.get_by_key("90").unwrap();
        assert_eq!(index, 4);
        assert_eq!(entry.y, 180.0);
    }

    #[test]
    fn pending_heights_hold_back_placement_only_after_the_gap() {
        let data = vec![10_u32, 20, 30, 40];
        let mut pass = RebuildPass::start(3, &data, &key, &mut EvensOnly, calculator(), 50.0);
        assert_eq!(pass.placed(), 1);
        assert_eq!(pass.pending(), 2);
        assert!(!pass.is_complete());

        // Filling index 3 first cannot place anything past the gap at 1.
        assert!(pass.deliver(3, Ok(40.0)));
        assert_eq!(pass.placed(), 1);

        assert!(pass.deliver(1, Ok(20.0)));
        assert_eq!(pass.placed(), 4);
        assert!(pass.is_complete());

        let cache = pass.finish();
        assert_eq!(cache.generation(), 3);
        assert_eq!(cache.get(3).unwrap().height, 40.0);
    }

    #[test]
    fn pass_reports_progress() {
        let data = vec![10_u32, 20];
        let pass = RebuildPass::start(1, &data, &key, &mut EvensOnly, calculator(), 50.0);
        assert_eq!(pass.generation(), 1);
        assert_eq!(pass.len(), 2);
        assert_eq!(pass.placed(), 1);
        assert!(!pass.is_complete());
    }

    #[test]
    fn failed_heights_fall_back_to_default() {
        struct Failing;
        impl HeightResolver<u32> for Failing {
            fn item_height(&mut self, _item: &u32, ticket: HeightTicket) -> ItemHeight {
                ItemHeight::Failed(HeightError::new(format!("no size for {}", ticket.index)))
            }
        }

        let data = vec![1_u32, 2];
        let pass = RebuildPass::start(1, &data, &key, &mut Failing, calculator(), 50.0);
        let cache = pass.finish();
        assert_eq!(cache.get(0).unwrap().height, 50.0);
        assert_eq!(cache.get(1).unwrap().height, 50.0);
    }

    #[test]
    fn failed_delivery_does_not_abort_the_pass() {
        let data = vec![10_u32, 20, 30];
        let mut pass = RebuildPass::start(1, &data, &key, &mut EvensOnly, calculator(), 50.0);
        assert!(pass.deliver(1, Err(HeightError::new("image decode failed"))));
        let cache = pass.finish();
        assert_eq!(cache.get(1).unwrap().height, 50.0);
    }

    #[test]
    fn duplicate_and_out_of_range_deliveries_are_ignored() {
        let data = vec![10_u32, 20];
        let mut pass = RebuildPass::start(1, &data, &key, &mut EvensOnly, calculator(), 50.0);
        assert!(!pass.deliver(0, Ok(99.0)));
        assert!(!pass.deliver(7, Ok(99.0)));
        assert!(pass.deliver(1, Ok(5.0)));
        assert!(!pass.deliver(1, Ok(6.0)));
        let cache = pass.finish();
        assert_eq!(cache.get(0).unwrap().height, 10.0);
        assert_eq!(cache.get(1).unwrap().height, 5.0);
    }

    #[test]
    fn same_input_yields_identical_cache() {
        let data: Vec<u32> = (0..40).map(|i| 20 + (i * 37) % 90).collect();
        let build = || {
            RebuildPass::start(
                1,
                &data,
                &key,
                &mut HeightFn(|item: &u32, _: usize| f64::from(*item)),
                calculator(),
                50.0,
            )
            .finish()
        };
        assert_eq!(build().entries(), build().entries());
    }

    #[test]
    fn uniform_resolver_stacks_evenly() {
        let data = vec![0_u32, 1, 2, 3];
        let pass = RebuildPass::start(
            1,
            &data,
            &key,
            &mut UniformHeight(10.0),
            calculator(),
            50.0,
        );
        let cache = pass.finish();
        assert_eq!(cache.content_height(), 20.0);
        let columns: Vec<usize> = cache.iter().map(|(_, e)| e.column).collect();
        assert_eq!(columns, [0, 1, 0, 1]);
    }
}
