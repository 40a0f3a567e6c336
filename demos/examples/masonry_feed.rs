// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A simulated photo feed driving `understory_masonry` from a fake host.
//!
//! The "host" here is a loop that:
//! - measures the container, then scrolls down in timestamped steps,
//! - loads another page whenever the list signals end-reached,
//! - resolves image heights asynchronously (every third photo "decodes" late),
//! - performs a pull-to-refresh at the end.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example masonry_feed`

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Size;
use understory_masonry::{
    HeightResolver, HeightTicket, ItemHeight, LayoutEntry, ListRenderer, ListSlots, MasonryConfig,
    MasonryList, ScrollAlign, ScrollSignals,
};

#[derive(Clone, Debug)]
struct Photo {
    id: u32,
    aspect: f64,
}

fn page(first_id: u32, count: u32) -> Vec<Photo> {
    (first_id..first_id + count)
        .map(|id| Photo {
            id,
            aspect: 0.6 + f64::from((id * 37) % 11) / 10.0,
        })
        .collect()
}

type DecodeQueue = Rc<RefCell<Vec<(HeightTicket, f64)>>>;

/// Sizes known photos immediately and queues the rest for a later "decode".
#[derive(Debug, Default)]
struct ImageSizes {
    column_width: f64,
    queue: DecodeQueue,
}

impl HeightResolver<Photo> for ImageSizes {
    fn item_height(&mut self, photo: &Photo, ticket: HeightTicket) -> ItemHeight {
        let height = self.column_width * photo.aspect;
        if photo.id % 3 == 0 {
            self.queue.borrow_mut().push((ticket, height));
            ItemHeight::Pending
        } else {
            ItemHeight::Ready(height)
        }
    }
}

struct TextRenderer;

impl ListRenderer<Photo> for TextRenderer {
    type View = String;

    fn render_item(&mut self, photo: &Photo, index: usize, layout: &LayoutEntry) -> String {
        format!(
            "  #{index:<3} photo {:<4} col {} at ({:>5.1}, {:>7.1}) {:>5.1}x{:<5.1}",
            photo.id, layout.column, layout.x, layout.y, layout.width, layout.height
        )
    }

    fn render_header(&mut self) -> Option<String> {
        Some("  [header: Discover]".into())
    }

    fn render_footer(&mut self) -> Option<String> {
        Some("  [footer: spinner]".into())
    }

    fn render_empty(&mut self) -> Option<String> {
        Some("  [nothing here yet]".into())
    }

    fn render_loading(&mut self) -> Option<String> {
        Some("  [laying out...]".into())
    }
}

fn drain_decodes(list: &mut MasonryList<Photo>, queue: &DecodeQueue) {
    let ready: Vec<(HeightTicket, f64)> = queue.borrow_mut().drain(..).collect();
    for (ticket, height) in ready {
        list.deliver_height(ticket, Ok(height));
    }
}

fn print_frame(list: &mut MasonryList<Photo>, title: &str) {
    let range = list.visible_range();
    let views = list.render(&mut TextRenderer);
    println!(
        "-- {title}: offset {:.0}, content {:.0}, range {:?}",
        list.scroll_offset(),
        list.content_height(),
        range.map(|r| (r.start, r.end))
    );
    for view in views {
        println!("{view}");
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config = MasonryConfig::default()
        .with_num_columns(2)
        .with_column_gap(8.0)
        .with_slots(ListSlots::all());
    let container = Size::new(360.0, 640.0);
    let column_width = (container.width - config.column_gap) / 2.0;

    let resolver = ImageSizes {
        column_width,
        ..ImageSizes::default()
    };
    let queue = resolver.queue.clone();
    let mut list = match MasonryList::new(config, |photo: &Photo, _| photo.id.to_string(), resolver)
    {
        Ok(list) => list,
        Err(err) => {
            log::error!("invalid configuration: {err}");
            return;
        }
    };

    print_frame(&mut list, "before data");

    let mut next_id = 0;
    list.set_data(page(next_id, 30));
    next_id += 30;
    print_frame(&mut list, "data set, container not measured");

    list.set_container_size(container);
    print_frame(&mut list, "measured, waiting on image decodes");
    log::info!("{} heights pending", list.pending_heights());

    drain_decodes(&mut list, &queue);
    print_frame(&mut list, "first layout");

    let mut now = 0_u64;
    for step in 1..=12 {
        now += 32;
        let signals = list.on_scroll(f64::from(step) * 350.0, now);
        if signals.contains(ScrollSignals::END_REACHED) {
            log::info!("end reached at offset {:.0}, loading page", list.scroll_offset());
            list.append_data(page(next_id, 20));
            next_id += 20;
            drain_decodes(&mut list, &queue);
            list.finish_end_reached(Ok::<(), String>(()));
        }
        if signals.contains(ScrollSignals::OFFSET_CHANGED) && step % 4 == 0 {
            print_frame(&mut list, "scrolled");
        }
    }

    if let Some(offset) = list.scroll_to_index(5, ScrollAlign::Center) {
        log::info!("jumped to item 5 at offset {offset:.0}");
    }
    print_frame(&mut list, "scroll_to_index(5)");

    // Pull down past the threshold and let go.
    list.set_scroll_offset(0.0);
    now += 32;
    list.on_scroll(-40.0, now);
    now += 32;
    list.on_scroll(-95.0, now);
    if list.release_pull() {
        log::info!("refreshing");
        next_id += 1000;
        list.set_data(page(next_id, 12));
        drain_decodes(&mut list, &queue);
        list.finish_refresh(Ok::<(), String>(()));
    }
    print_frame(&mut list, "after refresh");

    list.set_data(Vec::new());
    print_frame(&mut list, "cleared");
}
