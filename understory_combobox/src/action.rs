// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Semantic actions and the classifier that produces them from raw events.
//!
//! Classification looks only at the [`Region`] an event was delivered to and
//! the event itself. It never consults widget state: whether an action ends
//! up changing anything is decided later by the transition function.

use alloc::string::String;

use crate::event::{EventTarget, Key, Modifiers, RawEvent, Region};

/// Why the state is changing.
///
/// This is the fieldless mirror of [`Action`], handed to state reducers and
/// change callbacks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Arrow Down on the input.
    InputKeyDownArrowDown,
    /// Arrow Up on the input.
    InputKeyDownArrowUp,
    /// Home on the input.
    InputKeyDownHome,
    /// End on the input.
    InputKeyDownEnd,
    /// Page Up on the input.
    InputKeyDownPageUp,
    /// Page Down on the input.
    InputKeyDownPageDown,
    /// Enter on the input.
    InputKeyDownEnter,
    /// Escape on the input.
    InputKeyDownEscape,
    /// Tab (or Shift+Tab) leaving the input.
    InputKeyDownTab,
    /// Text typed into the input.
    InputChange,
    /// Input text removed entirely.
    ///
    /// Unlike [`ActionKind::InputChange`] this does not open the list: erasing
    /// the text with Backspace leaves a closed list closed.
    InputClear,
    /// Click on the input.
    InputClick,
    /// The input lost focus to something outside the widget.
    InputBlur,
    /// Pointer left the candidate list.
    MenuMouseLeave,
    /// Pointer moved over a candidate.
    ItemMouseMove,
    /// Pointer left a candidate.
    ItemMouseLeave,
    /// Click on a candidate.
    ItemClick,
    /// Click on the toggle button.
    ToggleButtonClick,
    /// Programmatic toggle.
    FunctionToggleMenu,
    /// Programmatic open.
    FunctionOpenMenu,
    /// Programmatic close.
    FunctionCloseMenu,
    /// Programmatic highlight.
    FunctionSetHighlightedIndex,
    /// Programmatic selection.
    FunctionSelectItem,
    /// Programmatic input text.
    FunctionSetInputValue,
    /// Programmatic reset to defaults.
    FunctionReset,
    /// The host swapped the externally controlled selected item.
    ControlledPropUpdatedSelectedItem,
}

/// A semantic action together with the data its transition needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action<T> {
    /// See [`ActionKind::InputKeyDownArrowDown`].
    InputKeyDownArrowDown {
        /// Modifiers held.
        modifiers: Modifiers,
    },
    /// See [`ActionKind::InputKeyDownArrowUp`].
    InputKeyDownArrowUp {
        /// Modifiers held.
        modifiers: Modifiers,
    },
    /// See [`ActionKind::InputKeyDownHome`].
    InputKeyDownHome,
    /// See [`ActionKind::InputKeyDownEnd`].
    InputKeyDownEnd,
    /// See [`ActionKind::InputKeyDownPageUp`].
    InputKeyDownPageUp,
    /// See [`ActionKind::InputKeyDownPageDown`].
    InputKeyDownPageDown,
    /// See [`ActionKind::InputKeyDownEnter`].
    InputKeyDownEnter,
    /// See [`ActionKind::InputKeyDownEscape`].
    InputKeyDownEscape,
    /// See [`ActionKind::InputKeyDownTab`].
    InputKeyDownTab,
    /// See [`ActionKind::InputChange`].
    InputChange {
        /// New input text.
        value: String,
    },
    /// See [`ActionKind::InputClear`].
    InputClear,
    /// See [`ActionKind::InputClick`].
    InputClick,
    /// See [`ActionKind::InputBlur`].
    InputBlur {
        /// Whether a highlighted candidate should be committed.
        select_item: bool,
    },
    /// See [`ActionKind::MenuMouseLeave`].
    MenuMouseLeave,
    /// See [`ActionKind::ItemMouseMove`].
    ItemMouseMove {
        /// Candidate position.
        index: usize,
    },
    /// See [`ActionKind::ItemMouseLeave`].
    ItemMouseLeave {
        /// Candidate position.
        index: usize,
    },
    /// See [`ActionKind::ItemClick`].
    ItemClick {
        /// Candidate position.
        index: usize,
    },
    /// See [`ActionKind::ToggleButtonClick`].
    ToggleButtonClick,
    /// See [`ActionKind::FunctionToggleMenu`].
    FunctionToggleMenu,
    /// See [`ActionKind::FunctionOpenMenu`].
    FunctionOpenMenu,
    /// See [`ActionKind::FunctionCloseMenu`].
    FunctionCloseMenu,
    /// See [`ActionKind::FunctionSetHighlightedIndex`].
    FunctionSetHighlightedIndex(Option<usize>),
    /// See [`ActionKind::FunctionSelectItem`].
    FunctionSelectItem(Option<T>),
    /// See [`ActionKind::FunctionSetInputValue`].
    FunctionSetInputValue(String),
    /// See [`ActionKind::FunctionReset`].
    FunctionReset,
    /// See [`ActionKind::ControlledPropUpdatedSelectedItem`].
    ControlledPropUpdatedSelectedItem,
}

impl<T> Action<T> {
    /// The kind of this action.
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::InputKeyDownArrowDown { .. } => ActionKind::InputKeyDownArrowDown,
            Self::InputKeyDownArrowUp { .. } => ActionKind::InputKeyDownArrowUp,
            Self::InputKeyDownHome => ActionKind::InputKeyDownHome,
            Self::InputKeyDownEnd => ActionKind::InputKeyDownEnd,
            Self::InputKeyDownPageUp => ActionKind::InputKeyDownPageUp,
            Self::InputKeyDownPageDown => ActionKind::InputKeyDownPageDown,
            Self::InputKeyDownEnter => ActionKind::InputKeyDownEnter,
            Self::InputKeyDownEscape => ActionKind::InputKeyDownEscape,
            Self::InputKeyDownTab => ActionKind::InputKeyDownTab,
            Self::InputChange { .. } => ActionKind::InputChange,
            Self::InputClear => ActionKind::InputClear,
            Self::InputClick => ActionKind::InputClick,
            Self::InputBlur { .. } => ActionKind::InputBlur,
            Self::MenuMouseLeave => ActionKind::MenuMouseLeave,
            Self::ItemMouseMove { .. } => ActionKind::ItemMouseMove,
            Self::ItemMouseLeave { .. } => ActionKind::ItemMouseLeave,
            Self::ItemClick { .. } => ActionKind::ItemClick,
            Self::ToggleButtonClick => ActionKind::ToggleButtonClick,
            Self::FunctionToggleMenu => ActionKind::FunctionToggleMenu,
            Self::FunctionOpenMenu => ActionKind::FunctionOpenMenu,
            Self::FunctionCloseMenu => ActionKind::FunctionCloseMenu,
            Self::FunctionSetHighlightedIndex(_) => ActionKind::FunctionSetHighlightedIndex,
            Self::FunctionSelectItem(_) => ActionKind::FunctionSelectItem,
            Self::FunctionSetInputValue(_) => ActionKind::FunctionSetInputValue,
            Self::FunctionReset => ActionKind::FunctionReset,
            Self::ControlledPropUpdatedSelectedItem => {
                ActionKind::ControlledPropUpdatedSelectedItem
            }
        }
    }
}

/// Map a raw event on a widget region to a semantic action.
///
/// Returns `None` for events the combobox does not react to. Notable cases:
///
/// - Enter during IME composition is left to the composition session.
/// - A blur whose related target is another part of the widget (the toggle
///   button, the list, a candidate) is not a loss of composite focus and is
///   ignored.
/// - Clearing the input is reported as [`Action::InputClear`], any other text
///   change as [`Action::InputChange`].
///
/// ```rust
/// use understory_combobox::{Action, Key, RawEvent, Region, classify};
///
/// let action: Option<Action<&str>> = classify(Region::Input, &RawEvent::key(Key::Escape));
/// assert_eq!(action, Some(Action::InputKeyDownEscape));
///
/// // Labels do not drive the state machine.
/// assert_eq!(classify::<&str>(Region::Label, &RawEvent::Click), None);
/// ```
pub fn classify<T>(region: Region, event: &RawEvent) -> Option<Action<T>> {
    match (region, event) {
        (
            Region::Input,
            RawEvent::KeyDown {
                key,
                modifiers,
                composing,
            },
        ) => classify_input_key(*key, *modifiers, *composing),
        (Region::Input, RawEvent::Change { value }) => Some(if value.is_empty() {
            Action::InputClear
        } else {
            Action::InputChange {
                value: value.clone(),
            }
        }),
        (Region::Input, RawEvent::Click) => Some(Action::InputClick),
        (Region::Input, RawEvent::Blur { related_target }) => match related_target {
            Some(EventTarget::Region(_)) => None,
            _ => Some(Action::InputBlur { select_item: true }),
        },
        (Region::ToggleButton, RawEvent::Click) => Some(Action::ToggleButtonClick),
        (Region::Menu, RawEvent::MouseLeave) => Some(Action::MenuMouseLeave),
        (Region::Item(index), RawEvent::MouseMove) => Some(Action::ItemMouseMove { index }),
        (Region::Item(index), RawEvent::MouseLeave) => Some(Action::ItemMouseLeave { index }),
        (Region::Item(index), RawEvent::Click) => Some(Action::ItemClick { index }),
        _ => None,
    }
}

fn classify_input_key<T>(key: Key, modifiers: Modifiers, composing: bool) -> Option<Action<T>> {
    let action = match key {
        Key::ArrowDown => Action::InputKeyDownArrowDown { modifiers },
        Key::ArrowUp => Action::InputKeyDownArrowUp { modifiers },
        Key::Home => Action::InputKeyDownHome,
        Key::End => Action::InputKeyDownEnd,
        Key::PageUp => Action::InputKeyDownPageUp,
        Key::PageDown => Action::InputKeyDownPageDown,
        Key::Enter if composing => return None,
        Key::Enter => Action::InputKeyDownEnter,
        Key::Escape => Action::InputKeyDownEscape,
        Key::Tab => Action::InputKeyDownTab,
        // Text keys surface through `RawEvent::Change`.
        Key::Backspace | Key::Character(_) | Key::Other => return None,
    };
    Some(action)
}
