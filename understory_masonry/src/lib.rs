// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_masonry --heading-base-level=0

//! Understory Masonry: a virtualized multi-column "waterfall" list core.
//!
//! Items of varying height are placed into a fixed number of equal-width
//! columns, each item going to the currently shortest column. Only the items
//! near the viewport are handed to the host for mounting.
//!
//! The core concepts are:
//!
//! - [`LayoutCalculator`]: the shortest-column placement algorithm, producing a
//!   [`LayoutEntry`] (position, size, column) per item.
//! - [`LayoutCache`]: an immutable snapshot of a complete layout, looked up by
//!   index or by item key. It is rebuilt, never patched, whenever the data,
//!   column count, column gap, or container width change.
//! - [`HeightResolver`]: how item heights are obtained. Heights may be ready
//!   immediately or delivered later through a [`HeightTicket`]; a rebuild only
//!   publishes its cache once every height is known, and tickets from a
//!   superseded rebuild are discarded.
//! - [`resolve_visible_range`]: which indices to mount, given the viewport, an
//!   overscan band, and per-batch padding.
//! - [`ScrollCoordinator`]: throttled scroll handling, end-reached pagination,
//!   and pull-to-refresh, built on `understory_scroll_state`.
//! - [`plan_render`] and [`ListRenderer`]: the ordered slots (header, items or a
//!   loading indicator, empty state, footer) for one frame.
//! - [`MasonryList`]: a controller tying all of the above together.
//!
//! This crate does not know about widgets or any particular UI framework. Host
//! frameworks are responsible for:
//!
//! - Forwarding container size and scroll events, with timestamps.
//! - Delivering heights for items whose resolver answered [`ItemHeight::Pending`].
//! - Mounting the slots of each [`RenderPlan`] at their absolute positions.
//! - Acting on [`ScrollSignals::END_REACHED`] and pull releases, then settling
//!   them.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Size;
//! use understory_masonry::{MasonryConfig, MasonryList, HeightFn};
//!
//! let config = MasonryConfig::default().with_column_gap(0.0);
//! let mut list = MasonryList::new(
//!     config,
//!     |item: &u32, _| item.to_string(),
//!     HeightFn(|item: &u32, _: usize| f64::from(*item)),
//! )
//! .unwrap();
//!
//! list.set_data(vec![120, 80, 150, 60, 90, 70]);
//! // Layout waits for a measured container.
//! assert!(!list.is_layout_ready());
//! list.set_container_size(Size::new(200.0, 300.0));
//!
//! assert_eq!(list.content_height(), 300.0);
//! let plan = list.render_plan();
//! for (index, layout) in plan.items() {
//!     // Mount item `index` at (layout.x, layout.y), layout.width wide.
//!     assert!(layout.column < 2);
//!     let _ = index;
//! }
//! ```
//!
//! All positions live in the scroll container's content coordinates, in
//! logical pixels.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod cache;
mod config;
mod error;
mod height;
mod layout;
mod masonry_list;
mod range;
mod render;
mod scroll;
mod viewport;

pub use cache::{Invalidation, LayoutCache, RebuildPass};
pub use config::MasonryConfig;
pub use error::{ConfigError, HeightError, SettleError};
pub use height::{
    DEFAULT_ITEM_HEIGHT, HeightFn, HeightResolver, HeightTicket, ItemHeight, UniformHeight,
};
pub use layout::{LayoutCalculator, LayoutEntry, column_width_for};
pub use masonry_list::{MasonryList, ScrollAlign};
pub use range::{
    OVERSCAN_NORMALIZER, VisibleRange, WindowParams, overscan_band, resolve_visible_range,
};
pub use render::{ListRenderer, ListSlots, RenderPlan, RenderSlot, plan_render, render_with};
pub use scroll::{PaginationState, ScrollCoordinator, ScrollSignals};
pub use understory_scroll_state::pull_refresh::RefreshPhase;
pub use viewport::ViewportState;
