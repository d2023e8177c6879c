// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_combobox --heading-base-level=0

//! Understory Combobox: a headless, accessible combobox interaction engine.
//!
//! This crate implements the behavior of an editable text input paired with a
//! popup list of candidates: keyboard navigation, highlighting, selection,
//! text entry, opening and closing, and dismissal by interacting outside the
//! widget. It renders nothing. Hosts feed it events and read back a
//! [`ComboboxState`] plus accessibility-annotated props for each part.
//!
//! The core concepts are:
//!
//! - [`classify`]: maps a raw event on a widget [`Region`] to an [`Action`].
//! - [`transition`]: a pure function from (state, action, [`TransitionContext`])
//!   to proposed [`Changes`].
//! - The reducer pipeline: proposed changes pass through an optional caller
//!   state reducer, are merged over the previous state, reconciled against
//!   [`Controlled`] values, committed, and announced through change callbacks
//!   configured on [`ComboboxOptions`]. Callbacks queue follow-up work on an
//!   [`ActionQueue`] rather than re-entering the engine.
//! - [`Combobox`]: owns the state, drives the pipeline, tracks outside
//!   interactions through an [`Environment`], and hands out props such as
//!   [`InputProps`] and [`ItemProps`] that stay identical between renders
//!   until something they depend on changes.
//!
//! The candidate list is owned by the host. Filtering is the host's job too:
//! re-filter in the input-value callback and pass the new slice on the next
//! call. The engine only ever refers to candidates by position.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_combobox::{Combobox, ComboboxOptions, Key, RawEvent, Region};
//!
//! let items = ["Apple", "Banana", "Cherry"];
//! let mut combo = Combobox::detached(ComboboxOptions::default());
//!
//! // Arrow Down opens the list and highlights the first candidate.
//! combo.handle(Region::Input, &RawEvent::key(Key::ArrowDown), &items);
//! assert!(combo.state().is_open);
//! assert_eq!(combo.state().highlighted_index, Some(0));
//!
//! // The input advertises the highlighted candidate to assistive technology.
//! let input = combo.input_props(&items);
//! assert_eq!(input.aria_activedescendant.as_deref(), Some("combobox-item-0"));
//!
//! // Enter confirms it.
//! combo.handle(Region::Input, &RawEvent::key(Key::Enter), &items);
//! assert_eq!(combo.state().selected_item, Some("Apple"));
//! assert_eq!(combo.state().input_value, "Apple");
//! ```
//!
//! ## Controlled state
//!
//! Any field can be owned by the host. Declare it with [`Source::External`]
//! and the committed state will always carry the host's value, while change
//! callbacks keep reporting what the engine wanted:
//!
//! ```rust
//! use understory_combobox::{Combobox, ComboboxOptions, Controlled, RawEvent, Region, Source};
//!
//! let items = ["Apple", "Banana", "Cherry"];
//! let options = ComboboxOptions::<&str>::default()
//!     .on_selected_item_change(|item, _, _| assert_eq!(item, Some(&"Cherry")));
//! let mut combo = Combobox::detached(options);
//! combo.set_controlled(
//!     Controlled { selected_item: Source::External(None), ..Controlled::default() },
//!     &items,
//! );
//! combo.open_menu(&items);
//! combo.handle(Region::Item(2), &RawEvent::Click, &items);
//! assert_eq!(combo.state().selected_item, None);
//! ```
//!
//! ## Outside interactions
//!
//! [`Combobox::new`] registers document listeners through the
//! [`Environment`] and releases them when the combobox is dropped. A pointer
//! release or tap outside the widget schedules a debounced close; focus
//! returning to the widget before the timer fires cancels it.
//! [`BoundsEnvironment`] implements the environment with [`kurbo::Rect`]
//! region bounds and a manual clock.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod action;
mod combobox;
mod controlled;
mod environment;
mod event;
mod options;
mod pipeline;
mod props;
mod state;
mod transition;

pub use action::{Action, ActionKind, classify};
pub use combobox::Combobox;
pub use controlled::{Controlled, Source};
pub use environment::{
    BoundsEnvironment, DetachedEnvironment, Environment, EnvironmentError, ListenerId, TimerId,
};
pub use event::{
    DocumentEvent, DocumentEventKind, EventTarget, HostEvent, Key, Modifiers, RawEvent, Region,
};
pub use options::{
    ComboboxIds, ComboboxOptions, DEFAULT_OUTSIDE_DEBOUNCE_MS, IsItemDisabled, ItemToString,
    ScrollIntoView,
};
pub use pipeline::{
    ActionAndChanges, ActionQueue, MAX_QUEUED_ACTIONS, OnHighlightedIndexChange,
    OnInputValueChange, OnIsOpenChange, OnSelectedItemChange, OnStateChange, StateChange,
    StateReducer,
};
pub use props::{EventMask, InputProps, ItemProps, LabelProps, MenuProps, ToggleButtonProps};
pub use state::{Changes, ComboboxState, StateFields};
pub use transition::{PAGE_SIZE, TransitionContext, transition};
