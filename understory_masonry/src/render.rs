// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render planning: which slots to mount, in which order, and where.

use alloc::vec::Vec;

use crate::{LayoutCache, LayoutEntry, VisibleRange};

bitflags::bitflags! {
    /// Optional slots the host renders around the items.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ListSlots: u8 {
        /// A header above the items.
        const HEADER = 0b0000_0001;
        /// A footer below the items.
        const FOOTER = 0b0000_0010;
        /// A placeholder shown when there is no data.
        const EMPTY  = 0b0000_0100;
    }
}

/// One thing to mount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderSlot {
    /// The header slot.
    Header,
    /// Layout has not been computed yet.
    Loading,
    /// An item, positioned absolutely at `layout` inside the item container.
    Item {
        /// Data index of the item.
        index: usize,
        /// Cached placement of the item.
        layout: LayoutEntry,
    },
    /// The empty-state slot.
    Empty,
    /// The footer slot.
    Footer,
}

/// Ordered list of slots for one frame, plus the item container height.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderPlan {
    /// Slots in mount order.
    pub slots: Vec<RenderSlot>,
    /// Height the item container should report to the scroll view.
    pub content_height: f64,
    /// Range the item slots were taken from.
    pub range: Option<VisibleRange>,
}

impl RenderPlan {
    /// Item slots only, as `(index, layout)`.
    pub fn items(&self) -> impl Iterator<Item = (usize, &LayoutEntry)> {
        self.slots.iter().filter_map(|slot| match slot {
            RenderSlot::Item { index, layout } => Some((*index, layout)),
            _ => None,
        })
    }

    /// Whether the plan contains `slot`.
    #[must_use]
    pub fn contains(&self, slot: &RenderSlot) -> bool {
        self.slots.contains(slot)
    }
}

/// Build the slot list for one frame.
///
/// Order is header, items (or the loading indicator), empty state, footer.
/// The loading indicator shows while there is data but no non-empty layout.
/// Only indices inside `range` are mounted. An index without a cache entry (the
/// cache lags a data change) is skipped for this frame.
#[must_use]
pub fn plan_render(
    slots: ListSlots,
    len: usize,
    cache: Option<&LayoutCache>,
    range: Option<VisibleRange>,
) -> RenderPlan {
    let mut plan = RenderPlan {
        slots: Vec::new(),
        content_height: cache.map_or(0.0, LayoutCache::content_height),
        range,
    };

    if slots.contains(ListSlots::HEADER) {
        plan.slots.push(RenderSlot::Header);
    }

    // An empty layout predates the data; it has nothing to place yet.
    let laid_out = cache.filter(|cache| !cache.is_empty());
    match (laid_out, range) {
        (None, _) if len > 0 => plan.slots.push(RenderSlot::Loading),
        (Some(cache), Some(range)) => {
            for index in range.indices().take_while(|i| *i < len) {
                match cache.get(index) {
                    Some(layout) => plan.slots.push(RenderSlot::Item {
                        index,
                        layout: *layout,
                    }),
                    None => log::trace!(
                        "layout generation {}: no entry for index {index}, skipped",
                        cache.generation()
                    ),
                }
            }
        }
        _ => {}
    }

    if len == 0 && slots.contains(ListSlots::EMPTY) {
        plan.slots.push(RenderSlot::Empty);
    }
    if slots.contains(ListSlots::FOOTER) {
        plan.slots.push(RenderSlot::Footer);
    }
    plan
}

/// Produces host views for planned slots.
///
/// Only [`ListRenderer::render_item`] is required; the optional slots default
/// to rendering nothing.
pub trait ListRenderer<T> {
    /// Host view type.
    type View;

    /// Render one item. `layout.column` is the column it was placed in.
    fn render_item(&mut self, item: &T, index: usize, layout: &LayoutEntry) -> Self::View;

    /// Render the header slot.
    fn render_header(&mut self) -> Option<Self::View> {
        None
    }

    /// Render the footer slot.
    fn render_footer(&mut self) -> Option<Self::View> {
        None
    }

    /// Render the empty-state slot.
    fn render_empty(&mut self) -> Option<Self::View> {
        None
    }

    /// Render the indicator shown until the first layout pass completes.
    fn render_loading(&mut self) -> Option<Self::View> {
        None
    }
}

/// Run `renderer` over `plan`, in plan order.
pub fn render_with<T, R>(plan: &RenderPlan, data: &[T], renderer: &mut R) -> Vec<R::View>
where
    R: ListRenderer<T> + ?Sized,
{
    let mut views = Vec::with_capacity(plan.slots.len());
    for slot in &plan.slots {
        let view = match slot {
            RenderSlot::Header => renderer.render_header(),
            RenderSlot::Loading => renderer.render_loading(),
            RenderSlot::Item { index, layout } => data
                .get(*index)
                .map(|item| renderer.render_item(item, *index, layout)),
            RenderSlot::Empty => renderer.render_empty(),
            RenderSlot::Footer => renderer.render_footer(),
        };
        views.extend(view);
    }
    views
}
