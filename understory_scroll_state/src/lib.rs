// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_scroll_state --heading-base-level=0

//! Understory Scroll State: small state machines for scroll-driven signals.
//!
//! Scrollable containers produce a raw stream of offsets. Higher layers usually
//! want a handful of derived, debounced signals instead:
//!
//! - [`throttle::Throttle`]: admits at most one event per fixed interval and drops
//!   (never queues) the rest.
//! - [`end_reached::EndReachedState`]: fires once when the viewport crosses into
//!   the trailing threshold band of the content, and re-arms only after the
//!   viewport leaves that band again.
//! - [`pull_refresh::PullRefreshState`]: tracks top overscroll and turns a
//!   release past the threshold into exactly one refresh request.
//!
//! All timestamps are caller-supplied milliseconds; nothing here reads a clock.
//!
//! ## Example
//!
//! ```
//! use understory_scroll_state::end_reached::EndReachedState;
//! use understory_scroll_state::throttle::Throttle;
//!
//! let mut throttle = Throttle::new(16);
//! let mut end = EndReachedState::new(0.5);
//!
//! // 1000 units of content in a 200 unit viewport.
//! assert!(throttle.admit(0));
//! assert!(!end.on_scroll(100.0, 200.0, 1000.0));
//!
//! // Too soon after the previous event: dropped.
//! assert!(!throttle.admit(8));
//!
//! assert!(throttle.admit(20));
//! assert!(end.on_scroll(400.0, 200.0, 1000.0));
//! // Still past the threshold: no second signal.
//! assert!(!end.on_scroll(450.0, 200.0, 1000.0));
//! ```

#![no_std]

pub mod end_reached;
pub mod pull_refresh;
pub mod throttle;
