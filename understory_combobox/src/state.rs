// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Widget state, partial changes, and field sets.

use alloc::string::String;

use bitflags::bitflags;

/// The single source of truth for a combobox.
///
/// `highlighted_index` is `None` when nothing is highlighted. When it is
/// `Some(i)`, `i` indexes the candidate list the state was last computed
/// against; transitions re-validate it against the list they receive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComboboxState<T> {
    /// Whether the candidate list is visible.
    pub is_open: bool,
    /// Keyboard-highlighted candidate position.
    pub highlighted_index: Option<usize>,
    /// Current text of the input.
    pub input_value: String,
    /// Committed selection.
    pub selected_item: Option<T>,
}

impl<T> Default for ComboboxState<T> {
    fn default() -> Self {
        Self {
            is_open: false,
            highlighted_index: None,
            input_value: String::new(),
            selected_item: None,
        }
    }
}

impl<T: PartialEq> ComboboxState<T> {
    /// Fields whose values differ between `self` and `other`.
    pub fn diff(&self, other: &Self) -> StateFields {
        let mut fields = StateFields::empty();
        fields.set(StateFields::IS_OPEN, self.is_open != other.is_open);
        fields.set(
            StateFields::HIGHLIGHTED_INDEX,
            self.highlighted_index != other.highlighted_index,
        );
        fields.set(
            StateFields::INPUT_VALUE,
            self.input_value != other.input_value,
        );
        fields.set(
            StateFields::SELECTED_ITEM,
            self.selected_item != other.selected_item,
        );
        fields
    }
}

bitflags! {
    /// A set of [`ComboboxState`] fields.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct StateFields: u8 {
        /// [`ComboboxState::is_open`].
        const IS_OPEN = 1 << 0;
        /// [`ComboboxState::highlighted_index`].
        const HIGHLIGHTED_INDEX = 1 << 1;
        /// [`ComboboxState::input_value`].
        const INPUT_VALUE = 1 << 2;
        /// [`ComboboxState::selected_item`].
        const SELECTED_ITEM = 1 << 3;
    }
}

/// A partial [`ComboboxState`]: `None` fields pass through unchanged.
///
/// This is what transitions propose and what a state reducer override gets to
/// rewrite before anything is committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Changes<T> {
    /// New open flag.
    pub is_open: Option<bool>,
    /// New highlight (`Some(None)` clears it).
    pub highlighted_index: Option<Option<usize>>,
    /// New input text.
    pub input_value: Option<String>,
    /// New selection (`Some(None)` clears it).
    pub selected_item: Option<Option<T>>,
}

impl<T> Default for Changes<T> {
    fn default() -> Self {
        Self {
            is_open: None,
            highlighted_index: None,
            input_value: None,
            selected_item: None,
        }
    }
}

impl<T> Changes<T> {
    /// No changes.
    pub fn none() -> Self {
        Self::default()
    }

    /// Changes that overwrite every field with `state`.
    pub fn from_state(state: ComboboxState<T>) -> Self {
        Self {
            is_open: Some(state.is_open),
            highlighted_index: Some(state.highlighted_index),
            input_value: Some(state.input_value),
            selected_item: Some(state.selected_item),
        }
    }

    /// Set the open flag.
    #[must_use]
    pub fn with_open(mut self, is_open: bool) -> Self {
        self.is_open = Some(is_open);
        self
    }

    /// Set the highlight.
    #[must_use]
    pub fn with_highlighted_index(mut self, index: Option<usize>) -> Self {
        self.highlighted_index = Some(index);
        self
    }

    /// Set the input text.
    #[must_use]
    pub fn with_input_value(mut self, value: impl Into<String>) -> Self {
        self.input_value = Some(value.into());
        self
    }

    /// Set the selection.
    #[must_use]
    pub fn with_selected_item(mut self, item: Option<T>) -> Self {
        self.selected_item = Some(item);
        self
    }

    /// Whether no field is touched.
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Fields this record touches (not necessarily changes).
    pub fn fields(&self) -> StateFields {
        let mut fields = StateFields::empty();
        fields.set(StateFields::IS_OPEN, self.is_open.is_some());
        fields.set(
            StateFields::HIGHLIGHTED_INDEX,
            self.highlighted_index.is_some(),
        );
        fields.set(StateFields::INPUT_VALUE, self.input_value.is_some());
        fields.set(StateFields::SELECTED_ITEM, self.selected_item.is_some());
        fields
    }

    /// Merge over `state`.
    pub fn apply_to(self, mut state: ComboboxState<T>) -> ComboboxState<T> {
        if let Some(is_open) = self.is_open {
            state.is_open = is_open;
        }
        if let Some(index) = self.highlighted_index {
            state.highlighted_index = index;
        }
        if let Some(value) = self.input_value {
            state.input_value = value;
        }
        if let Some(item) = self.selected_item {
            state.selected_item = item;
        }
        state
    }
}
