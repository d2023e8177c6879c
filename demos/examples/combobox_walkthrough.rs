// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A filtering combobox driven through keyboard, pointer, and outside clicks.
//!
//! This example shows how a host:
//! - re-filters its candidate list from the input-value callback,
//! - feeds region events and document events into the engine,
//! - forwards due timers from `BoundsEnvironment`'s manual clock,
//! - reads props back for rendering.
//!
//! Run:
//! - `RUST_LOG=understory_combobox=trace cargo run -p understory_demos --example combobox_walkthrough`

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Rect};
use tracing_subscriber::EnvFilter;
use understory_combobox::{
    BoundsEnvironment, Combobox, ComboboxIds, ComboboxOptions, DocumentEvent, DocumentEventKind,
    EventTarget, Key, RawEvent, Region,
};

const FRUITS: [&str; 8] = [
    "Apple",
    "Apricot",
    "Banana",
    "Blueberry",
    "Cherry",
    "Grape",
    "Mango",
    "Peach",
];

fn filter(query: &str) -> Vec<&'static str> {
    let query = query.to_lowercase();
    FRUITS
        .iter()
        .copied()
        .filter(|fruit| fruit.to_lowercase().starts_with(&query))
        .collect()
}

fn render(combo: &mut Combobox<&'static str, BoundsEnvironment>, items: &[&'static str]) {
    let input = combo.input_props(items);
    println!(
        "  [{}] expanded={} activedescendant={:?}",
        input.value, input.aria_expanded, input.aria_activedescendant
    );
    if !combo.menu_props(items).is_open {
        return;
    }
    for (index, fruit) in items.iter().enumerate() {
        if let Some(item) = combo.item_props(index, items) {
            let marker = if item.aria_selected { '>' } else { ' ' };
            let chosen = if item.is_selected { " (selected)" } else { "" };
            println!("   {marker} {fruit}{chosen}");
        }
    }
}

fn main() {
    let filter_env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("understory_combobox=debug"));
    tracing_subscriber::fmt().with_env_filter(filter_env).init();

    // The visible candidates, recomputed whenever the text changes.
    let visible: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(FRUITS.to_vec()));
    let refilter = visible.clone();
    let options = ComboboxOptions::default()
        .with_ids(ComboboxIds::new("fruit"))
        .with_outside_debounce_ms(10)
        .with_scroll_into_view(|index| println!("  (scroll candidate {index} into view)"))
        .on_input_value_change(move |value, kind, _| {
            println!("  input -> {value:?} via {kind:?}");
            *refilter.borrow_mut() = filter(value);
        })
        .on_selected_item_change(|item, kind, _| {
            println!("  selected -> {item:?} via {kind:?}");
        });

    let mut env = BoundsEnvironment::new();
    env.set_bounds(Region::Input, Rect::new(0.0, 0.0, 200.0, 24.0));
    env.set_bounds(Region::ToggleButton, Rect::new(200.0, 0.0, 224.0, 24.0));
    env.set_bounds(Region::Menu, Rect::new(0.0, 24.0, 224.0, 224.0));

    let mut combo = match Combobox::new(options, env) {
        Ok(combo) => combo,
        Err(err) => {
            eprintln!("could not attach combobox: {err}");
            return;
        }
    };

    let items = || visible.borrow().clone();

    println!("== Type \"b\" ==");
    combo.handle(Region::Input, &RawEvent::change("b"), &items());
    render(&mut combo, &items());

    println!("\n== Arrow Down twice, then Enter ==");
    for key in [Key::ArrowDown, Key::ArrowDown, Key::Enter] {
        combo.handle(Region::Input, &RawEvent::key(key), &items());
    }
    render(&mut combo, &items());

    println!("\n== Clear the text, toggle the list, hover Cherry, click it ==");
    combo.handle(Region::Input, &RawEvent::change(""), &items());
    combo.handle(Region::ToggleButton, &RawEvent::Click, &items());
    let cherry = items().iter().position(|f| *f == "Cherry");
    if let Some(index) = cherry {
        combo.handle(Region::Item(index), &RawEvent::MouseMove, &items());
        render(&mut combo, &items());
        combo.handle(Region::Item(index), &RawEvent::Click, &items());
    }
    render(&mut combo, &items());
    println!(
        "  focus requests: {:?}",
        combo.environment_mut().take_focus_requests()
    );

    println!("\n== Open, then click outside ==");
    combo.open_menu(&items());
    let outside = EventTarget::Point(Point::new(400.0, 400.0));
    combo.handle_document_event(&DocumentEvent::new(DocumentEventKind::MouseDown, outside));
    combo.handle_document_event(&DocumentEvent::new(DocumentEventKind::MouseUp, outside));
    for timer in combo.environment_mut().advance(10) {
        combo.handle_timer(timer, &items());
    }
    render(&mut combo, &items());

    println!("\n== Escape ==");
    combo.handle(Region::Input, &RawEvent::key(Key::Escape), &items());
    render(&mut combo, &items());
}
