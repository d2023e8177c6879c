// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Props for each interactive region: ids, ARIA attributes, and event bindings.
//!
//! Everything here is derived from the committed state, the candidate list,
//! and the configured [`ComboboxIds`]. The [`Binder`] hands out `Rc`s and
//! reuses them while neither the committed state nor the candidate list
//! changed, so hosts can skip work with [`Rc::ptr_eq`].

use alloc::rc::Rc;
use alloc::string::String;

use bitflags::bitflags;
use hashbrown::HashMap;

use crate::options::ComboboxIds;
use crate::state::ComboboxState;

bitflags! {
    /// Events a region needs forwarded to [`Combobox::handle`](crate::Combobox::handle).
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EventMask: u8 {
        /// [`RawEvent::KeyDown`](crate::RawEvent::KeyDown).
        const KEY_DOWN = 1 << 0;
        /// [`RawEvent::Change`](crate::RawEvent::Change).
        const CHANGE = 1 << 1;
        /// [`RawEvent::Click`](crate::RawEvent::Click).
        const CLICK = 1 << 2;
        /// [`RawEvent::MouseMove`](crate::RawEvent::MouseMove).
        const MOUSE_MOVE = 1 << 3;
        /// [`RawEvent::MouseLeave`](crate::RawEvent::MouseLeave).
        const MOUSE_LEAVE = 1 << 4;
        /// [`RawEvent::Focus`](crate::RawEvent::Focus).
        const FOCUS = 1 << 5;
        /// [`RawEvent::Blur`](crate::RawEvent::Blur).
        const BLUR = 1 << 6;
    }
}

/// Props for the label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelProps {
    /// Element id.
    pub id: String,
    /// Id of the input the label describes.
    pub html_for: String,
}

/// Props for the text input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputProps {
    /// Element id.
    pub id: String,
    /// Always `"combobox"`.
    pub role: &'static str,
    /// Always `"list"`.
    pub aria_autocomplete: &'static str,
    /// Mirrors [`ComboboxState::is_open`].
    pub aria_expanded: bool,
    /// Id of the candidate list.
    pub aria_controls: String,
    /// Id of the label.
    pub aria_labelledby: String,
    /// Id of the highlighted candidate, while open and in range.
    pub aria_activedescendant: Option<String>,
    /// Current text.
    pub value: String,
    /// Events to bind.
    pub events: EventMask,
}

/// Props for the toggle button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToggleButtonProps {
    /// Element id.
    pub id: String,
    /// Id of the candidate list.
    pub aria_controls: String,
    /// Mirrors [`ComboboxState::is_open`].
    pub aria_expanded: bool,
    /// The button stays out of the tab sequence.
    pub tab_index: i32,
    /// Events to bind.
    pub events: EventMask,
}

/// Props for the candidate list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuProps {
    /// Element id.
    pub id: String,
    /// Always `"listbox"`.
    pub role: &'static str,
    /// Id of the label.
    pub aria_labelledby: String,
    /// Whether the host should render the list.
    pub is_open: bool,
    /// Events to bind.
    pub events: EventMask,
}

/// Props for one candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemProps {
    /// Element id.
    pub id: String,
    /// Position in the candidate list.
    pub index: usize,
    /// Always `"option"`.
    pub role: &'static str,
    /// Whether this candidate is highlighted (ARIA `aria-selected`).
    pub aria_selected: bool,
    /// Whether this candidate cannot be chosen.
    pub aria_disabled: bool,
    /// Whether this candidate equals the committed selection.
    pub is_selected: bool,
    /// Events to bind; empty for disabled candidates.
    pub events: EventMask,
}

/// Identity of one render's inputs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct RenderKey {
    revision: u64,
    items_ptr: usize,
    items_len: usize,
}

/// Cache of props handed out for the current render inputs.
#[derive(Debug, Default)]
pub(crate) struct Binder {
    key: Option<RenderKey>,
    label: Option<Rc<LabelProps>>,
    input: Option<Rc<InputProps>>,
    toggle_button: Option<Rc<ToggleButtonProps>>,
    menu: Option<Rc<MenuProps>>,
    items: HashMap<usize, Rc<ItemProps>>,
}

impl Binder {
    /// Drop cached props if `revision` or the list identity moved on.
    pub(crate) fn sync<T>(&mut self, revision: u64, items: &[T]) {
        let key = RenderKey {
            revision,
            items_ptr: items.as_ptr() as usize,
            items_len: items.len(),
        };
        if self.key != Some(key) {
            self.key = Some(key);
            self.input = None;
            self.toggle_button = None;
            self.menu = None;
            self.items.clear();
        }
    }

    pub(crate) fn label(&mut self, ids: &ComboboxIds) -> Rc<LabelProps> {
        self.label
            .get_or_insert_with(|| {
                Rc::new(LabelProps {
                    id: ids.label(),
                    html_for: ids.input(),
                })
            })
            .clone()
    }

    pub(crate) fn input<T>(
        &mut self,
        ids: &ComboboxIds,
        state: &ComboboxState<T>,
        items_len: usize,
    ) -> Rc<InputProps> {
        self.input
            .get_or_insert_with(|| {
                let aria_activedescendant = state
                    .highlighted_index
                    .filter(|&i| state.is_open && i < items_len)
                    .map(|i| ids.item(i));
                Rc::new(InputProps {
                    id: ids.input(),
                    role: "combobox",
                    aria_autocomplete: "list",
                    aria_expanded: state.is_open,
                    aria_controls: ids.menu(),
                    aria_labelledby: ids.label(),
                    aria_activedescendant,
                    value: state.input_value.clone(),
                    events: EventMask::KEY_DOWN
                        | EventMask::CHANGE
                        | EventMask::CLICK
                        | EventMask::FOCUS
                        | EventMask::BLUR,
                })
            })
            .clone()
    }

    pub(crate) fn toggle_button<T>(
        &mut self,
        ids: &ComboboxIds,
        state: &ComboboxState<T>,
    ) -> Rc<ToggleButtonProps> {
        self.toggle_button
            .get_or_insert_with(|| {
                Rc::new(ToggleButtonProps {
                    id: ids.toggle_button(),
                    aria_controls: ids.menu(),
                    aria_expanded: state.is_open,
                    tab_index: -1,
                    events: EventMask::CLICK,
                })
            })
            .clone()
    }

    pub(crate) fn menu<T>(&mut self, ids: &ComboboxIds, state: &ComboboxState<T>) -> Rc<MenuProps> {
        self.menu
            .get_or_insert_with(|| {
                Rc::new(MenuProps {
                    id: ids.menu(),
                    role: "listbox",
                    aria_labelledby: ids.label(),
                    is_open: state.is_open,
                    events: EventMask::MOUSE_LEAVE,
                })
            })
            .clone()
    }

    pub(crate) fn item<T: PartialEq>(
        &mut self,
        ids: &ComboboxIds,
        state: &ComboboxState<T>,
        items: &[T],
        index: usize,
        disabled: bool,
    ) -> Rc<ItemProps> {
        self.items
            .entry(index)
            .or_insert_with(|| {
                let is_selected = match (state.selected_item.as_ref(), items.get(index)) {
                    (Some(selected), Some(item)) => selected == item,
                    _ => false,
                };
                Rc::new(ItemProps {
                    id: ids.item(index),
                    index,
                    role: "option",
                    aria_selected: state.highlighted_index == Some(index),
                    aria_disabled: disabled,
                    is_selected,
                    events: if disabled {
                        EventMask::empty()
                    } else {
                        EventMask::CLICK | EventMask::MOUSE_MOVE | EventMask::MOUSE_LEAVE
                    },
                })
            })
            .clone()
    }
}
