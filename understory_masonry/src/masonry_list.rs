// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A controller that owns the data, viewport, layout cache, and scroll state.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::fmt::Display;
use core::num::NonZeroUsize;

use kurbo::{Point, Size};
use understory_scroll_state::pull_refresh::RefreshPhase;

use crate::cache::RebuildPass;
use crate::height::UniformHeight;
use crate::render::{ListRenderer, RenderPlan, plan_render, render_with};
use crate::{
    ConfigError, HeightError, HeightResolver, HeightTicket, Invalidation, LayoutCache,
    LayoutCalculator, LayoutEntry, MasonryConfig, PaginationState, ScrollCoordinator,
    ScrollSignals, SettleError, ViewportState, VisibleRange, column_width_for,
    resolve_visible_range,
};

/// Alignment mode when scrolling a specific index into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    /// Align the top of the item with the top of the viewport.
    Start,
    /// Center the item within the viewport.
    Center,
    /// Align the bottom of the item with the bottom of the viewport.
    End,
    /// Move just enough to make the item fully visible, preferring the
    /// smallest change from the current scroll offset.
    Nearest,
}

type KeyFn<T> = Box<dyn Fn(&T, usize) -> String>;

/// Controller for a virtualized masonry list.
///
/// This type:
/// - owns the data and the configuration,
/// - rebuilds the [`LayoutCache`] whenever data, column count, column gap, or
///   container width change, and swaps it in only once complete,
/// - tracks the viewport and caches the most recent [`VisibleRange`],
/// - turns scroll events into pagination and pull-to-refresh signals.
///
/// It does not create views. Hosts call [`MasonryList::render_plan`] (or
/// [`MasonryList::render`]) after events and mount the returned slots.
pub struct MasonryList<T> {
    config: MasonryConfig,
    columns: NonZeroUsize,
    data: Vec<T>,
    key_fn: KeyFn<T>,
    resolver: Box<dyn HeightResolver<T>>,

    viewport: ViewportState,
    coordinator: ScrollCoordinator,

    cache: Option<LayoutCache>,
    in_flight: Option<RebuildPass>,
    next_generation: u64,
    deferred: Invalidation,

    dirty: bool,
    last_range: Option<VisibleRange>,
}

impl<T> fmt::Debug for MasonryList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasonryList")
            .field("config", &self.config)
            .field("len", &self.data.len())
            .field("viewport", &self.viewport)
            .field("coordinator", &self.coordinator)
            .field("cache_generation", &self.cache.as_ref().map(LayoutCache::generation))
            .field(
                "in_flight_generation",
                &self.in_flight.as_ref().map(RebuildPass::generation),
            )
            .field("deferred", &self.deferred)
            .finish_non_exhaustive()
    }
}

impl<T> MasonryList<T> {
    /// Creates a list with a height resolver.
    ///
    /// Fails if `config` does not validate.
    pub fn new(
        config: MasonryConfig,
        key_fn: impl Fn(&T, usize) -> String + 'static,
        resolver: impl HeightResolver<T> + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let columns = NonZeroUsize::new(config.num_columns).ok_or(ConfigError::ZeroColumns)?;
        Ok(Self {
            coordinator: ScrollCoordinator::new(&config),
            config,
            columns,
            data: Vec::new(),
            key_fn: Box::new(key_fn),
            resolver: Box::new(resolver),
            viewport: ViewportState::default(),
            cache: None,
            in_flight: None,
            next_generation: 1,
            deferred: Invalidation::empty(),
            dirty: true,
            last_range: None,
        })
    }

    /// Creates a list where every item gets `config.default_item_height`.
    pub fn with_default_height(
        config: MasonryConfig,
        key_fn: impl Fn(&T, usize) -> String + 'static,
    ) -> Result<Self, ConfigError> {
        let height = UniformHeight(config.default_item_height);
        Self::new(config, key_fn, height)
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &MasonryConfig {
        &self.config
    }

    /// The current data set.
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Number of items in the current data set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if there is no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The current viewport.
    #[must_use]
    pub const fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    /// The scroll coordinator (pagination and refresh state).
    #[must_use]
    pub const fn coordinator(&self) -> &ScrollCoordinator {
        &self.coordinator
    }

    /// The last published layout, if any pass has completed.
    ///
    /// This may lag the data while a newer rebuild is in flight.
    #[must_use]
    pub fn layout_cache(&self) -> Option<&LayoutCache> {
        self.cache.as_ref()
    }

    /// Whether a published layout has entries for the data.
    ///
    /// An empty layout only counts for an empty data set, so data arriving after
    /// the container was measured shows as loading until its first pass lands.
    #[must_use]
    pub fn is_layout_ready(&self) -> bool {
        self.cache
            .as_ref()
            .is_some_and(|cache| !cache.is_empty() || self.data.is_empty())
    }

    /// Whether the published layout matches the current inputs.
    #[must_use]
    pub fn is_layout_current(&self) -> bool {
        self.cache.is_some() && self.in_flight.is_none() && self.deferred.is_empty()
    }

    /// Generation of the rebuild currently waiting for heights, if any.
    #[must_use]
    pub fn in_flight_generation(&self) -> Option<u64> {
        self.in_flight.as_ref().map(RebuildPass::generation)
    }

    /// Number of heights the in-flight rebuild is still waiting for.
    #[must_use]
    pub fn pending_heights(&self) -> usize {
        self.in_flight.as_ref().map_or(0, RebuildPass::pending)
    }

    /// Height of the laid out content, `0.0` before the first layout.
    #[must_use]
    pub fn content_height(&self) -> f64 {
        self.cache.as_ref().map_or(0.0, LayoutCache::content_height)
    }

    /// Replaces the data set.
    pub fn set_data(&mut self, data: Vec<T>) {
        self.data = data;
        self.invalidate(Invalidation::DATA);
    }

    /// Appends items, typically the next page after an end-reached signal.
    ///
    /// The layout is rebuilt in full, like any other data change.
    pub fn append_data(&mut self, items: impl IntoIterator<Item = T>) {
        let before = self.data.len();
        self.data.extend(items);
        if self.data.len() != before {
            self.invalidate(Invalidation::DATA);
        }
    }

    /// Changes the column count.
    pub fn set_num_columns(&mut self, num_columns: usize) -> Result<(), ConfigError> {
        let columns = NonZeroUsize::new(num_columns).ok_or(ConfigError::ZeroColumns)?;
        if columns != self.columns {
            self.columns = columns;
            self.config.num_columns = num_columns;
            self.invalidate(Invalidation::COLUMNS);
        }
        Ok(())
    }

    /// Changes the column gap.
    pub fn set_column_gap(&mut self, column_gap: f64) -> Result<(), ConfigError> {
        if !column_gap.is_finite() || column_gap < 0.0 {
            return Err(ConfigError::InvalidGap(column_gap));
        }
        if column_gap != self.config.column_gap {
            self.config.column_gap = column_gap;
            self.invalidate(Invalidation::GAP);
        }
        Ok(())
    }

    /// Sets or clears an explicit column width.
    pub fn set_column_width(&mut self, column_width: Option<f64>) -> Result<(), ConfigError> {
        if let Some(width) = column_width
            && (!width.is_finite() || width <= 0.0)
        {
            return Err(ConfigError::InvalidColumnWidth(width));
        }
        if column_width != self.config.column_width {
            self.config.column_width = column_width;
            self.invalidate(Invalidation::WIDTH);
        }
        Ok(())
    }

    /// Host layout event: the scroll container's size.
    ///
    /// A width change rebuilds the layout; a height change only affects windowing.
    pub fn set_container_size(&mut self, size: Size) {
        let old = self.viewport.container;
        if size == old {
            return;
        }
        self.viewport.container = size;
        self.dirty = true;
        if size.width != old.width {
            self.invalidate(Invalidation::WIDTH);
        }
    }

    /// Marks inputs as changed and starts a rebuild (or defers it until measured).
    pub fn invalidate(&mut self, reason: Invalidation) {
        self.dirty = true;
        if !self.viewport.is_measured() {
            self.deferred |= reason;
            log::debug!("layout deferred until the container is measured ({reason:?})");
            return;
        }
        let reason = reason | core::mem::take(&mut self.deferred);
        self.start_rebuild(reason);
    }

    fn start_rebuild(&mut self, reason: Invalidation) {
        let generation = self.next_generation;
        self.next_generation += 1;
        if self.in_flight.take().is_some() {
            log::debug!("rebuild {generation} supersedes an in-flight rebuild");
        }

        if self.data.is_empty() {
            log::debug!("rebuild {generation} ({reason:?}): empty data");
            self.publish(LayoutCache::empty(generation));
            return;
        }

        let width = match self.config.column_width {
            Some(width) => width,
            None => column_width_for(self.viewport.width(), self.columns, self.config.column_gap),
        };
        let calculator = LayoutCalculator::from_parts(self.columns, width, self.config.column_gap);
        log::debug!(
            "rebuild {generation} ({reason:?}): {} items in {} columns of width {width}",
            self.data.len(),
            self.columns
        );
        let pass = RebuildPass::start(
            generation,
            &self.data,
            &*self.key_fn,
            &mut *self.resolver,
            calculator,
            self.config.default_item_height,
        );
        if pass.is_complete() {
            self.publish(pass.finish());
        } else {
            log::debug!("rebuild {generation}: waiting for {} heights", pass.pending());
            self.in_flight = Some(pass);
        }
    }

    fn publish(&mut self, cache: LayoutCache) {
        log::debug!(
            "layout generation {} published: {} items, content height {}",
            cache.generation(),
            cache.len(),
            cache.content_height()
        );
        self.cache = Some(cache);
        self.dirty = true;
    }

    /// Deliver a height that the resolver answered with [`ItemHeight::Pending`](crate::ItemHeight::Pending).
    ///
    /// Errors fall back to the default height. Deliveries for a superseded
    /// rebuild are discarded and return `false`.
    pub fn deliver_height(&mut self, ticket: HeightTicket, result: Result<f64, HeightError>) -> bool {
        let Some(pass) = self
            .in_flight
            .as_mut()
            .filter(|pass| pass.generation() == ticket.generation)
        else {
            log::debug!(
                "discarding height for index {} of stale rebuild {}",
                ticket.index,
                ticket.generation
            );
            return false;
        };
        if !pass.deliver(ticket.index, result) {
            return false;
        }
        if pass.is_complete()
            && let Some(pass) = self.in_flight.take()
        {
            self.publish(pass.finish());
        }
        true
    }

    /// Host scroll event. `timestamp` is in milliseconds.
    ///
    /// Negative offsets report top overscroll and drive pull-to-refresh.
    pub fn on_scroll(&mut self, offset: f64, timestamp: u64) -> ScrollSignals {
        let content_height = self.is_layout_ready().then(|| self.content_height());
        let signals =
            self.coordinator
                .on_scroll(&mut self.viewport, offset, timestamp, content_height);
        if signals.contains(ScrollSignals::OFFSET_CHANGED) {
            self.dirty = true;
        }
        signals
    }

    /// Host pointer release. Returns `true` if the host should start a refresh.
    pub fn release_pull(&mut self) -> bool {
        self.coordinator.release_pull()
    }

    /// Settle a refresh started by [`MasonryList::release_pull`] or
    /// [`MasonryList::set_refreshing`].
    ///
    /// The scroll offset returns to the top on success and on failure. Returns
    /// `true` if a refresh was in progress; the host should then scroll its
    /// container to [`MasonryList::scroll_offset`].
    pub fn finish_refresh<E: Display>(&mut self, result: Result<(), E>) -> bool {
        let settled = self.coordinator.finish_refresh(&mut self.viewport, result);
        if settled {
            self.dirty = true;
        }
        settled
    }

    /// Host-controlled refreshing flag.
    ///
    /// Clearing it settles an active refresh like a successful
    /// [`MasonryList::finish_refresh`], returning the offset to the top.
    pub fn set_refreshing(&mut self, refreshing: bool) {
        if self.coordinator.set_refreshing(&mut self.viewport, refreshing) {
            self.dirty = true;
        }
    }

    /// Current pull-to-refresh phase.
    #[must_use]
    pub fn refresh_phase(&self) -> RefreshPhase {
        self.coordinator.refresh_phase()
    }

    /// Error of the last failed refresh.
    #[must_use]
    pub fn last_refresh_error(&self) -> Option<&SettleError> {
        self.coordinator.last_refresh_error()
    }

    /// Settle the pagination request signalled by [`ScrollSignals::END_REACHED`].
    pub fn finish_end_reached<E: Display>(&mut self, result: Result<(), E>) {
        self.coordinator.finish_end_reached(result);
    }

    /// Clear a pagination failure and re-arm end-reached detection.
    pub fn reset_end_reached(&mut self) {
        self.coordinator.reset_end_reached();
    }

    /// Pagination request state.
    #[must_use]
    pub fn pagination(&self) -> &PaginationState {
        self.coordinator.pagination()
    }

    /// Returns the current scroll offset.
    #[must_use]
    pub const fn scroll_offset(&self) -> f64 {
        self.viewport.scroll_offset
    }

    /// Sets the scroll offset directly (programmatic scrolling, not throttled).
    pub fn set_scroll_offset(&mut self, offset: f64) {
        let offset = if offset.is_finite() { offset.max(0.0) } else { 0.0 };
        if offset != self.viewport.scroll_offset {
            self.viewport.scroll_offset = offset;
            self.dirty = true;
        }
    }

    /// Computes or returns the cached visible range.
    ///
    /// `None` only when there is no data.
    #[must_use]
    pub fn visible_range(&mut self) -> Option<VisibleRange> {
        if self.dirty {
            self.last_range = resolve_visible_range(
                &self.viewport,
                self.cache.as_ref(),
                self.data.len(),
                &self.config.window(),
            );
            self.dirty = false;
        }
        self.last_range
    }

    /// Slots to mount for the current frame.
    #[must_use]
    pub fn render_plan(&mut self) -> RenderPlan {
        let range = self.visible_range();
        plan_render(
            self.config.slots,
            self.data.len(),
            self.cache.as_ref(),
            range,
        )
    }

    /// Render the current frame with `renderer`.
    pub fn render<R>(&mut self, renderer: &mut R) -> Vec<R::View>
    where
        R: ListRenderer<T> + ?Sized,
    {
        let plan = self.render_plan();
        render_with(&plan, &self.data, renderer)
    }

    /// Layout of the item at `index` in the published cache.
    #[must_use]
    pub fn item_layout(&self, index: usize) -> Option<&LayoutEntry> {
        if index >= self.data.len() {
            return None;
        }
        self.cache.as_ref()?.get(index)
    }

    /// Index of the item under `point` (content coordinates), if any.
    #[must_use]
    pub fn index_at_point(&self, point: Point) -> Option<usize> {
        let cache = self.cache.as_ref()?;
        cache
            .iter()
            .take(self.data.len())
            .find(|(_, entry)| entry.contains(point))
            .map(|(index, _)| index)
    }

    /// Returns `true` if the item at `index` is fully inside the viewport.
    #[must_use]
    pub fn is_index_fully_visible(&self, index: usize) -> bool {
        let Some(entry) = self.item_layout(index) else {
            return false;
        };
        entry.y >= self.viewport.scroll_offset && entry.bottom() <= self.viewport.end()
    }

    /// Returns `true` if the item at `index` overlaps the viewport at all.
    #[must_use]
    pub fn is_index_partially_visible(&self, index: usize) -> bool {
        let Some(entry) = self.item_layout(index) else {
            return false;
        };
        entry.bottom() > self.viewport.scroll_offset && entry.y < self.viewport.end()
    }

    /// Clamps the scroll offset so the viewport stays within the content.
    pub fn clamp_scroll_to_content(&mut self) {
        let max_offset = (self.content_height() - self.viewport.height()).max(0.0);
        if self.viewport.scroll_offset > max_offset {
            self.set_scroll_offset(max_offset);
        }
    }

    /// Scrolls so that item `index` is brought into view using the given alignment.
    ///
    /// Does nothing before the item has a layout. Returns the new scroll offset,
    /// which the host should apply to its container.
    pub fn scroll_to_index(&mut self, index: usize, align: ScrollAlign) -> Option<f64> {
        let entry = *self.item_layout(index)?;
        let item_start = entry.y;
        let item_end = entry.bottom();
        let viewport = self.viewport.height();

        let new_offset = match align {
            ScrollAlign::Start => item_start,
            ScrollAlign::End => (item_end - viewport).max(0.0),
            ScrollAlign::Center => ((item_start + item_end) / 2.0 - viewport / 2.0).max(0.0),
            ScrollAlign::Nearest => {
                let current = self.viewport.scroll_offset;
                if item_start >= current && item_end <= current + viewport {
                    current
                } else if item_start < current {
                    item_start
                } else {
                    (item_end - viewport).max(0.0)
                }
            }
        };

        self.set_scroll_offset(new_offset);
        Some(self.viewport.scroll_offset)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;
    use core::cell::{Cell, RefCell};

    use alloc::rc::Rc;

    use super::*;
    use crate::height::HeightFn;
    use crate::render::{ListSlots, RenderSlot};
    use crate::{ItemHeight, WindowParams};

    fn key(item: &u32, _index: usize) -> String {
        item.to_string()
    }

    fn heights_list(config: MasonryConfig) -> MasonryList<u32> {
        MasonryList::new(config, key, HeightFn(|item: &u32, _: usize| f64::from(*item))).unwrap()
    }

    fn no_gap() -> MasonryConfig {
        MasonryConfig::default().with_column_gap(0.0)
    }

    /// Leaves every height pending and records the tickets it was asked for.
    #[derive(Clone, Default)]
    struct Deferred {
        tickets: Rc<RefCell<Vec<HeightTicket>>>,
    }

    impl HeightResolver<u32> for Deferred {
        fn item_height(&mut self, _item: &u32, ticket: HeightTicket) -> ItemHeight {
            self.tickets.borrow_mut().push(ticket);
            ItemHeight::Pending
        }
    }

    #[test]
    fn zero_columns_config_is_rejected() {
        let err = MasonryList::<u32>::with_default_height(
            MasonryConfig::default().with_num_columns(0),
            key,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::ZeroColumns);
    }

    #[test]
    fn rebuild_waits_for_container_width() {
        let mut list = heights_list(no_gap());
        list.set_data(vec![120, 80, 150, 60, 90, 70]);
        assert!(!list.is_layout_ready());
        // Bootstrap range while unmeasured.
        assert_eq!(list.visible_range(), Some(VisibleRange::new(0, 5)));

        // Height alone does not unblock layout.
        list.set_container_size(Size::new(0.0, 300.0));
        assert!(!list.is_layout_ready());

        list.set_container_size(Size::new(200.0, 300.0));
        assert!(list.is_layout_current());
        let cache = list.layout_cache().unwrap();
        let columns: Vec<usize> = cache.iter().map(|(_, e)| e.column).collect();
        assert_eq!(columns, [0, 1, 1, 0, 0, 1]);
        assert_eq!(list.content_height(), 300.0);
    }

    #[test]
    fn empty_data_publishes_empty_layout() {
        let calls = Rc::new(Cell::new(0_usize));
        let counter = calls.clone();
        let resolver = HeightFn(move |_: &u32, _: usize| {
            counter.set(counter.get() + 1);
            10.0
        });
        let config = no_gap().with_slots(ListSlots::EMPTY | ListSlots::FOOTER);
        let mut list = MasonryList::new(config, key, resolver).unwrap();
        list.set_container_size(Size::new(200.0, 300.0));
        list.set_data(Vec::new());
        assert_eq!(calls.get(), 0);
        assert!(list.is_layout_ready());
        assert_eq!(list.content_height(), 0.0);
        assert_eq!(list.visible_range(), None);
        let plan = list.render_plan();
        assert_eq!(plan.slots, vec![RenderSlot::Empty, RenderSlot::Footer]);
    }

    #[test]
    fn relayout_on_column_gap_and_width_changes() {
        let mut list = heights_list(no_gap());
        list.set_container_size(Size::new(200.0, 300.0));
        list.set_data(vec![10, 10, 10]);
        let first = list.layout_cache().unwrap().generation();

        list.set_num_columns(3).unwrap();
        assert_eq!(list.layout_cache().unwrap().get(2).unwrap().column, 2);
        assert!(list.layout_cache().unwrap().generation() > first);

        list.set_column_gap(10.0).unwrap();
        // (200 - 2 * 10) / 3 = 60 wide, x steps of 70.
        assert_eq!(list.item_layout(1).unwrap().x, 70.0);

        list.set_container_size(Size::new(320.0, 300.0));
        assert_eq!(list.item_layout(1).unwrap().width, 100.0);

        list.set_column_width(Some(50.0)).unwrap();
        assert_eq!(list.item_layout(2).unwrap().x, 120.0);

        assert_eq!(list.set_num_columns(0), Err(ConfigError::ZeroColumns));
        assert!(list.set_column_gap(f64::NAN).is_err());
    }

    #[test]
    fn unchanged_inputs_do_not_rebuild() {
        let mut list = heights_list(no_gap());
        list.set_container_size(Size::new(200.0, 300.0));
        list.set_data(vec![10, 20]);
        let generation = list.layout_cache().unwrap().generation();
        list.set_num_columns(2).unwrap();
        list.set_column_gap(0.0).unwrap();
        list.set_container_size(Size::new(200.0, 500.0));
        list.append_data(Vec::new());
        assert_eq!(list.layout_cache().unwrap().generation(), generation);
    }

    #[test]
    fn async_heights_publish_only_when_complete() {
        let resolver = Deferred::default();
        let tickets = resolver.tickets.clone();
        let mut list = MasonryList::new(no_gap(), key, resolver).unwrap();
        list.set_container_size(Size::new(200.0, 300.0));
        list.set_data(vec![1, 2, 3]);

        assert!(!list.is_layout_ready());
        assert_eq!(list.pending_heights(), 3);
        let issued: Vec<HeightTicket> = tickets.borrow().clone();
        assert_eq!(issued.len(), 3);

        // The container was measured before the data arrived.
        assert!(list.layout_cache().is_some_and(LayoutCache::is_empty));
        assert!(list.render_plan().contains(&RenderSlot::Loading));

        assert!(list.deliver_height(issued[2], Ok(30.0)));
        assert!(list.deliver_height(issued[0], Ok(10.0)));
        assert!(!list.is_layout_ready());
        assert!(list.deliver_height(issued[1], Err(HeightError::new("decode failed"))));

        assert!(list.is_layout_current());
        assert!(list.is_layout_ready());
        let plan = list.render_plan();
        assert!(!plan.contains(&RenderSlot::Loading));
        assert_eq!(plan.items().count(), 3);
        let cache = list.layout_cache().unwrap();
        assert_eq!(cache.get(1).unwrap().height, list.config().default_item_height);
        assert_eq!(cache.get(2).unwrap().height, 30.0);
    }

    #[test]
    fn stale_rebuild_never_overwrites_newer_cache() {
        let resolver = Deferred::default();
        let tickets = resolver.tickets.clone();
        let mut list = MasonryList::new(no_gap(), key, resolver).unwrap();
        list.set_container_size(Size::new(200.0, 300.0));

        list.set_data(vec![1, 2]);
        let old: Vec<HeightTicket> = tickets.borrow_mut().drain(..).collect();

        // Data changes again before the first rebuild finished.
        list.set_data(vec![7]);
        let new: Vec<HeightTicket> = tickets.borrow_mut().drain(..).collect();
        assert!(new[0].generation > old[0].generation);

        assert!(list.deliver_height(new[0], Ok(70.0)));
        let published = list.layout_cache().unwrap().generation();
        assert_eq!(published, new[0].generation);

        // The older pass completing late is discarded.
        assert!(!list.deliver_height(old[0], Ok(10.0)));
        assert!(!list.deliver_height(old[1], Ok(20.0)));
        let cache = list.layout_cache().unwrap();
        assert_eq!(cache.generation(), published);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(0).unwrap().height, 70.0);
    }

    #[test]
    fn previous_cache_stays_visible_during_rebuild() {
        let resolver = Deferred::default();
        let tickets = resolver.tickets.clone();
        let mut list = MasonryList::new(no_gap(), key, resolver).unwrap();
        list.set_container_size(Size::new(200.0, 300.0));
        list.set_data(vec![1]);
        let first = tickets.borrow_mut().pop().unwrap();
        list.deliver_height(first, Ok(50.0));
        let generation = list.layout_cache().unwrap().generation();

        list.append_data([2, 3]);
        assert!(!list.is_layout_current());
        assert_eq!(list.layout_cache().unwrap().generation(), generation);
        // The lagging cache has one entry; the other two slots are skipped.
        let plan = list.render_plan();
        assert_eq!(plan.items().count(), 1);
    }

    #[test]
    fn scrolling_moves_the_window() {
        let config = no_gap()
            .with_num_columns(1)
            .with_window(WindowParams {
                window_size: 0.0,
                max_to_render_per_batch: 0,
                initial_num_to_render: 2,
            });
        let mut list = heights_list(config);
        list.set_container_size(Size::new(100.0, 100.0));
        list.set_data(vec![100; 50]);

        assert_eq!(list.visible_range(), Some(VisibleRange::new(0, 1)));
        let signals = list.on_scroll(1050.0, 0);
        assert!(signals.contains(ScrollSignals::OFFSET_CHANGED));
        assert_eq!(list.visible_range(), Some(VisibleRange::new(10, 11)));

        // Throttled: the range does not move.
        list.on_scroll(2050.0, 5);
        assert_eq!(list.visible_range(), Some(VisibleRange::new(10, 11)));

        let plan = list.render_plan();
        let mounted: Vec<usize> = plan.items().map(|(i, _)| i).collect();
        assert_eq!(mounted, [10, 11]);
        assert_eq!(plan.content_height, 5000.0);
    }

    #[test]
    fn pagination_cycle() {
        let mut list = heights_list(no_gap().with_num_columns(1));
        list.set_container_size(Size::new(100.0, 100.0));
        list.set_data(vec![100; 10]);

        let mut t = 0;
        let mut fired = 0;
        for offset in [100.0, 500.0, 550.0, 600.0] {
            t += 20;
            if list.on_scroll(offset, t).contains(ScrollSignals::END_REACHED) {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
        assert_eq!(list.pagination(), &PaginationState::Loading);

        list.append_data(vec![100; 10]);
        list.finish_end_reached(Ok::<(), &str>(()));
        assert_eq!(list.content_height(), 2000.0);

        // Now well above the new band; scroll into it again.
        t += 20;
        assert!(!list.on_scroll(620.0, t).contains(ScrollSignals::END_REACHED));
        t += 20;
        assert!(list.on_scroll(1000.0, t).contains(ScrollSignals::END_REACHED));
    }

    #[test]
    fn refresh_cycle_returns_to_top() {
        let mut list = heights_list(no_gap());
        list.set_container_size(Size::new(200.0, 300.0));
        list.set_data(vec![100; 20]);

        list.on_scroll(-20.0, 0);
        assert_eq!(list.refresh_phase(), RefreshPhase::Pulling);
        assert!(!list.release_pull());

        list.on_scroll(-90.0, 20);
        assert!(list.release_pull());
        assert_eq!(list.refresh_phase(), RefreshPhase::Refreshing);

        list.set_scroll_offset(250.0);
        assert!(list.finish_refresh(Err("offline")));
        assert_eq!(list.scroll_offset(), 0.0);
        assert_eq!(list.last_refresh_error().map(SettleError::message), Some("offline"));
        assert_eq!(list.refresh_phase(), RefreshPhase::Idle);
    }

    #[test]
    fn clearing_refreshing_flag_returns_to_top() {
        let mut list = heights_list(no_gap());
        list.set_container_size(Size::new(200.0, 300.0));
        list.set_data(vec![100; 20]);

        list.on_scroll(-90.0, 0);
        assert!(list.release_pull());
        list.set_scroll_offset(250.0);
        let _ = list.visible_range();

        list.set_refreshing(false);
        assert_eq!(list.refresh_phase(), RefreshPhase::Idle);
        assert_eq!(list.scroll_offset(), 0.0);
        assert_eq!(list.last_refresh_error(), None);
        // The cached range follows the reset offset.
        assert_eq!(list.visible_range().map(|r| r.start), Some(0));

        // A host-started refresh settles the same way.
        list.set_scroll_offset(120.0);
        list.set_refreshing(true);
        assert_eq!(list.refresh_phase(), RefreshPhase::Refreshing);
        list.set_refreshing(false);
        assert_eq!(list.scroll_offset(), 0.0);
    }

    #[test]
    fn end_reached_waits_for_items_to_be_laid_out() {
        let resolver = Deferred::default();
        let mut list = MasonryList::new(no_gap(), key, resolver).unwrap();
        list.set_container_size(Size::new(200.0, 300.0));
        list.set_data(vec![1, 2]);
        // Only the empty layout from before the data arrived is published.
        let signals = list.on_scroll(10.0, 0);
        assert!(!signals.contains(ScrollSignals::END_REACHED));
        assert_eq!(list.pagination(), &PaginationState::Idle);
    }

    #[test]
    fn render_plan_orders_slots() {
        let config = no_gap()
            .with_num_columns(1)
            .with_slots(ListSlots::all())
            .with_window(WindowParams {
                window_size: 0.0,
                max_to_render_per_batch: 0,
                initial_num_to_render: 1,
            });
        let mut list = heights_list(config);
        list.set_data(vec![50; 4]);

        // Unmeasured: loading indicator between header and footer.
        let plan = list.render_plan();
        assert_eq!(
            plan.slots,
            vec![RenderSlot::Header, RenderSlot::Loading, RenderSlot::Footer]
        );

        list.set_container_size(Size::new(100.0, 100.0));
        let plan = list.render_plan();
        let mounted: Vec<usize> = plan.items().map(|(i, _)| i).collect();
        assert_eq!(mounted, [0, 1, 2]);
        assert_eq!(plan.slots.first(), Some(&RenderSlot::Header));
        assert_eq!(plan.slots.last(), Some(&RenderSlot::Footer));
    }

    #[test]
    fn scroll_to_index_aligns_items_in_any_column() {
        let mut list = heights_list(no_gap());
        list.set_container_size(Size::new(200.0, 100.0));
        // col0: 0 (0..120), 3 (120..180), 4 (180..270)
        // col1: 1 (0..80), 2 (80..230), 5 (230..300)
        list.set_data(vec![120, 80, 150, 60, 90, 70]);
        assert_eq!(list.item_layout(2).unwrap().column, 1);

        assert_eq!(list.scroll_to_index(2, ScrollAlign::Start), Some(80.0));
        assert_eq!(list.scroll_to_index(5, ScrollAlign::End), Some(200.0));
        // Short item near the top cannot scroll above zero.
        assert_eq!(list.scroll_to_index(1, ScrollAlign::End), Some(0.0));
        assert_eq!(list.scroll_to_index(2, ScrollAlign::Center), Some(105.0));

        // Item 3 (120..180) already fits in 105..205.
        assert_eq!(list.scroll_to_index(3, ScrollAlign::Nearest), Some(105.0));
        assert_eq!(list.scroll_to_index(0, ScrollAlign::Nearest), Some(0.0));
        assert_eq!(list.scroll_to_index(4, ScrollAlign::Nearest), Some(170.0));
        assert!(list.is_index_fully_visible(4));
        assert!(list.is_index_partially_visible(2));

        assert_eq!(list.scroll_to_index(6, ScrollAlign::Start), None);
    }

    #[test]
    fn visibility_queries_and_clamping() {
        let mut list = heights_list(no_gap().with_num_columns(1));
        list.set_container_size(Size::new(100.0, 30.0));
        list.set_data(vec![10; 5]);

        assert!(list.is_index_fully_visible(0));
        assert!(list.is_index_fully_visible(2));
        assert!(!list.is_index_fully_visible(3));
        assert!(!list.is_index_partially_visible(3));

        list.set_scroll_offset(5.0);
        assert!(list.is_index_partially_visible(0));
        assert!(list.is_index_partially_visible(3));
        assert!(!list.is_index_fully_visible(0));

        // 5 * 10 content in a 30 viewport: max offset 20.
        list.set_scroll_offset(100.0);
        list.clamp_scroll_to_content();
        assert_eq!(list.scroll_offset(), 20.0);
    }

    #[test]
    fn hit_testing_uses_cached_boxes() {
        let mut list = heights_list(no_gap());
        list.set_container_size(Size::new(200.0, 300.0));
        list.set_data(vec![120, 80, 150]);
        assert_eq!(list.index_at_point(Point::new(50.0, 60.0)), Some(0));
        assert_eq!(list.index_at_point(Point::new(150.0, 100.0)), Some(2));
        assert_eq!(list.index_at_point(Point::new(50.0, 200.0)), None);
    }

    #[test]
    fn render_calls_renderer_for_mounted_items() {
        struct Columns;
        impl ListRenderer<u32> for Columns {
            type View = (u32, usize);

            fn render_item(
                &mut self,
                item: &u32,
                _index: usize,
                layout: &LayoutEntry,
            ) -> (u32, usize) {
                (*item, layout.column)
            }
        }

        let mut list = heights_list(no_gap());
        list.set_container_size(Size::new(200.0, 300.0));
        list.set_data(vec![120, 80, 150]);
        let expected: [(u32, usize); 3] = [(120, 0), (80, 1), (150, 1)];
        assert_eq!(list.render(&mut Columns), expected);
    }
}
