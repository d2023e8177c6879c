// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The transition function: `(state, action) -> changes`.
//!
//! [`transition`] is pure. It reads the candidate list and the caller's
//! item hooks through a [`TransitionContext`] and proposes [`Changes`]; it
//! never commits anything. Highlighted indices are always re-validated
//! against `items.len()` at the moment of the transition, so a list that
//! shrank since the last render reads as "nothing highlighted".

use alloc::string::String;

use crate::action::Action;
use crate::event::Modifiers;
use crate::state::{Changes, ComboboxState};

/// Number of positions Page Up / Page Down move the highlight.
pub const PAGE_SIZE: usize = 10;

/// Everything a transition may consult besides the state and the action.
#[derive(Clone, Copy)]
pub struct TransitionContext<'a, T> {
    /// The candidate list for this computation.
    pub items: &'a [T],
    /// Display text of a candidate.
    pub item_to_string: &'a dyn Fn(&T) -> String,
    /// Whether a candidate can be highlighted or chosen.
    pub is_item_disabled: Option<&'a dyn Fn(&T, usize) -> bool>,
    /// Whether keyboard navigation wraps around the ends of the list.
    pub circular: bool,
    /// State restored by a reset; its highlight is also preferred on open.
    pub defaults: &'a ComboboxState<T>,
}

impl<T> core::fmt::Debug for TransitionContext<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransitionContext")
            .field("items", &self.items.len())
            .field("circular", &self.circular)
            .finish_non_exhaustive()
    }
}

impl<'a, T> TransitionContext<'a, T> {
    /// A context with circular navigation, no disabled items, and empty defaults.
    pub fn new(
        items: &'a [T],
        item_to_string: &'a dyn Fn(&T) -> String,
        defaults: &'a ComboboxState<T>,
    ) -> Self {
        Self {
            items,
            item_to_string,
            is_item_disabled: None,
            circular: true,
            defaults,
        }
    }

    /// `index` if it still points into the list.
    pub fn valid_index(&self, index: Option<usize>) -> Option<usize> {
        index.filter(|&i| i < self.items.len())
    }

    fn is_disabled(&self, index: usize) -> bool {
        self.is_item_disabled
            .is_some_and(|disabled| disabled(&self.items[index], index))
    }

    fn is_selectable(&self, index: usize) -> bool {
        index < self.items.len() && !self.is_disabled(index)
    }

    fn text_of(&self, item: Option<&T>) -> String {
        item.map(self.item_to_string).unwrap_or_default()
    }

    /// Scan from `start` for an enabled candidate, moving forward or backward.
    fn enabled_from(&self, start: usize, forward: bool, circular: bool) -> Option<usize> {
        let len = self.items.len();
        let mut index = start;
        for _ in 0..len {
            if !self.is_disabled(index) {
                return Some(index);
            }
            index = if forward {
                if index + 1 == len {
                    if !circular {
                        return None;
                    }
                    0
                } else {
                    index + 1
                }
            } else if index == 0 {
                if !circular {
                    return None;
                }
                len - 1
            } else {
                index - 1
            };
        }
        None
    }

    fn first_enabled(&self) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        self.enabled_from(0, true, false)
    }

    fn last_enabled(&self) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        self.enabled_from(self.items.len() - 1, false, false)
    }

    /// Move `step` positions away from `from`.
    ///
    /// With nothing highlighted, forward movement starts before the first
    /// candidate and backward movement after the last. Past either end the
    /// index wraps when `circular`, and clamps otherwise. A clamped move that
    /// finds nothing enabled past the target settles on the nearest enabled
    /// candidate between `from` and the target. If there is none the current
    /// highlight is kept.
    fn navigate(&self, from: Option<usize>, step: isize, circular: bool) -> Option<usize> {
        let len = self.items.len();
        if len == 0 {
            return None;
        }
        let from = self.valid_index(from);
        let last = len as isize - 1;
        let base = match from {
            Some(i) => i as isize,
            None if step > 0 => -1,
            None => len as isize,
        };
        let mut target = base + step;
        if target < 0 {
            target = if circular { last } else { 0 };
        } else if target > last {
            target = if circular { 0 } else { last };
        }
        let forward = step > 0;
        let target = target as usize;
        self.enabled_from(target, forward, circular)
            .or_else(|| {
                if circular {
                    return None;
                }
                self.enabled_from(target, !forward, false)
                    .filter(|&i| from.is_none_or(|f| if forward { i > f } else { i < f }))
            })
            .or(from)
    }

    /// Highlight to show when the list opens.
    ///
    /// Prefers the default highlight, then the selected item's position. For
    /// keyboard opens (`offset != 0`) it falls back to the first or last
    /// enabled candidate.
    fn highlight_on_open(&self, state: &ComboboxState<T>, offset: isize) -> Option<usize>
    where
        T: PartialEq,
    {
        if let Some(index) = self.defaults.highlighted_index
            && self.is_selectable(index)
        {
            return Some(index);
        }
        if let Some(selected) = &state.selected_item {
            let position = self.items.iter().position(|item| item == selected);
            if position.is_some() || offset == 0 {
                return position;
            }
        }
        match offset {
            0 => None,
            o if o < 0 => self.last_enabled(),
            _ => self.first_enabled(),
        }
    }

    /// Commit the candidate at `index` and close.
    fn select(&self, index: usize) -> Changes<T>
    where
        T: Clone,
    {
        let item = &self.items[index];
        Changes::none()
            .with_selected_item(Some(item.clone()))
            .with_input_value((self.item_to_string)(item))
            .with_open(false)
            .with_highlighted_index(None)
    }

    /// Close, committing the highlighted candidate if there is one.
    fn confirm(&self, highlighted: Option<usize>) -> Changes<T>
    where
        T: Clone,
    {
        match highlighted {
            Some(index) if self.is_selectable(index) => self.select(index),
            _ => Changes::none()
                .with_open(false)
                .with_highlighted_index(None),
        }
    }
}

/// Compute the changes `action` proposes against `state`.
///
/// ```rust
/// use understory_combobox::{Action, ComboboxState, Modifiers, TransitionContext, transition};
///
/// let items = ["Apple", "Banana", "Cherry"];
/// let to_string = |item: &&'static str| item.to_string();
/// let defaults = ComboboxState::default();
/// let cx = TransitionContext::new(&items, &to_string, &defaults);
///
/// let closed = ComboboxState::default();
/// let changes = transition(
///     &closed,
///     &Action::InputKeyDownArrowUp { modifiers: Modifiers::empty() },
///     &cx,
/// );
/// // Opening with Arrow Up highlights the last candidate in one step.
/// assert_eq!(changes.is_open, Some(true));
/// assert_eq!(changes.highlighted_index, Some(Some(2)));
/// ```
pub fn transition<T: Clone + PartialEq>(
    state: &ComboboxState<T>,
    action: &Action<T>,
    cx: &TransitionContext<'_, T>,
) -> Changes<T> {
    let highlighted = cx.valid_index(state.highlighted_index);
    match action {
        Action::InputKeyDownArrowDown { modifiers } => {
            if state.is_open {
                Changes::none().with_highlighted_index(cx.navigate(highlighted, 1, cx.circular))
            } else {
                let index = if modifiers.contains(Modifiers::ALT) && state.selected_item.is_none()
                {
                    None
                } else {
                    cx.highlight_on_open(state, 1)
                };
                Changes::none().with_open(true).with_highlighted_index(index)
            }
        }
        Action::InputKeyDownArrowUp { modifiers } => {
            if !state.is_open {
                Changes::none()
                    .with_open(true)
                    .with_highlighted_index(cx.highlight_on_open(state, -1))
            } else if modifiers.contains(Modifiers::ALT) {
                cx.confirm(highlighted)
            } else {
                Changes::none().with_highlighted_index(cx.navigate(highlighted, -1, cx.circular))
            }
        }
        Action::InputKeyDownHome if state.is_open => {
            Changes::none().with_highlighted_index(cx.first_enabled())
        }
        Action::InputKeyDownEnd if state.is_open => {
            Changes::none().with_highlighted_index(cx.last_enabled())
        }
        Action::InputKeyDownPageUp if state.is_open => Changes::none()
            .with_highlighted_index(cx.navigate(highlighted, -(PAGE_SIZE as isize), false)),
        Action::InputKeyDownPageDown if state.is_open => Changes::none()
            .with_highlighted_index(cx.navigate(highlighted, PAGE_SIZE as isize, false)),
        // Closed: nothing moves, but a highlight left over from a longer list goes.
        Action::InputKeyDownHome
        | Action::InputKeyDownEnd
        | Action::InputKeyDownPageUp
        | Action::InputKeyDownPageDown => {
            if highlighted == state.highlighted_index {
                Changes::none()
            } else {
                Changes::none().with_highlighted_index(None)
            }
        }
        Action::InputKeyDownEnter => {
            if state.is_open {
                cx.confirm(highlighted)
            } else {
                Changes::none()
            }
        }
        Action::InputKeyDownEscape => Changes::none()
            .with_open(false)
            .with_highlighted_index(None)
            .with_input_value(cx.text_of(state.selected_item.as_ref())),
        Action::InputKeyDownTab => blur(state, highlighted, true, cx),
        Action::InputBlur { select_item } => blur(state, highlighted, *select_item, cx),
        Action::InputChange { value } => Changes::none()
            .with_open(true)
            .with_highlighted_index(None)
            .with_input_value(value.clone()),
        Action::InputClear => Changes::none()
            .with_highlighted_index(None)
            .with_input_value(String::new()),
        Action::InputClick | Action::ToggleButtonClick => {
            if state.is_open {
                Changes::none()
                    .with_open(false)
                    .with_highlighted_index(None)
            } else {
                Changes::none()
                    .with_open(true)
                    .with_highlighted_index(cx.highlight_on_open(state, 0))
            }
        }
        Action::MenuMouseLeave => Changes::none().with_highlighted_index(None),
        Action::ItemMouseMove { index } => {
            if cx.is_selectable(*index) {
                Changes::none().with_highlighted_index(Some(*index))
            } else {
                Changes::none()
            }
        }
        Action::ItemMouseLeave { index } => {
            if highlighted == Some(*index) {
                Changes::none().with_highlighted_index(None)
            } else {
                Changes::none()
            }
        }
        Action::ItemClick { index } => {
            if cx.is_selectable(*index) {
                cx.select(*index)
            } else {
                Changes::none()
            }
        }
        Action::FunctionToggleMenu => Changes::none().with_open(!state.is_open),
        Action::FunctionOpenMenu => Changes::none().with_open(true),
        Action::FunctionCloseMenu => Changes::none().with_open(false),
        Action::FunctionSetHighlightedIndex(index) => {
            Changes::none().with_highlighted_index(cx.valid_index(*index))
        }
        Action::FunctionSelectItem(item) => Changes::none()
            .with_input_value(cx.text_of(item.as_ref()))
            .with_selected_item(item.clone()),
        Action::FunctionSetInputValue(value) => Changes::none().with_input_value(value.clone()),
        Action::FunctionReset => Changes::from_state(cx.defaults.clone()),
        Action::ControlledPropUpdatedSelectedItem => {
            Changes::none().with_input_value(cx.text_of(state.selected_item.as_ref()))
        }
    }
}

fn blur<T: Clone + PartialEq>(
    state: &ComboboxState<T>,
    highlighted: Option<usize>,
    select_item: bool,
    cx: &TransitionContext<'_, T>,
) -> Changes<T> {
    match highlighted {
        Some(index) if select_item && state.is_open && cx.is_selectable(index) => cx.select(index),
        _ => Changes::none()
            .with_open(false)
            .with_highlighted_index(None),
    }
}
