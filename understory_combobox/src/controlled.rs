// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Controlled-state reconciliation.
//!
//! Each [`ComboboxState`] field is either owned by the engine or dictated by
//! the host. The host re-declares this on every render through
//! [`Controlled`]; external values always win, silently.

use alloc::string::String;

use crate::state::{ComboboxState, StateFields};

/// Who decides a field's value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Source<V> {
    /// The engine computes the value.
    #[default]
    Internal,
    /// The host dictates the value.
    External(V),
}

impl<V> Source<V> {
    /// Whether the host dictates this field.
    pub fn is_external(&self) -> bool {
        matches!(self, Self::External(_))
    }

    /// The external value, if any.
    pub fn external(&self) -> Option<&V> {
        match self {
            Self::Internal => None,
            Self::External(v) => Some(v),
        }
    }
}

impl<V: Clone> Source<V> {
    fn resolve(&self, computed: V) -> V {
        match self {
            Self::Internal => computed,
            Self::External(v) => v.clone(),
        }
    }
}

/// Per-field sources for a combobox.
///
/// ```rust
/// use understory_combobox::{ComboboxState, Controlled, Source};
///
/// // The host keeps the selection empty no matter what the user clicks.
/// let controlled = Controlled::<&str> {
///     selected_item: Source::External(None),
///     ..Controlled::default()
/// };
/// let computed = ComboboxState {
///     selected_item: Some("Banana"),
///     ..ComboboxState::default()
/// };
/// assert_eq!(controlled.reconcile(computed).selected_item, None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Controlled<T> {
    /// Source of [`ComboboxState::is_open`].
    pub is_open: Source<bool>,
    /// Source of [`ComboboxState::highlighted_index`].
    pub highlighted_index: Source<Option<usize>>,
    /// Source of [`ComboboxState::input_value`].
    pub input_value: Source<String>,
    /// Source of [`ComboboxState::selected_item`].
    pub selected_item: Source<Option<T>>,
}

impl<T> Default for Controlled<T> {
    fn default() -> Self {
        Self {
            is_open: Source::Internal,
            highlighted_index: Source::Internal,
            input_value: Source::Internal,
            selected_item: Source::Internal,
        }
    }
}

impl<T: Clone> Controlled<T> {
    /// Substitute every external value into `state`.
    pub fn reconcile(&self, state: ComboboxState<T>) -> ComboboxState<T> {
        ComboboxState {
            is_open: self.is_open.resolve(state.is_open),
            highlighted_index: self.highlighted_index.resolve(state.highlighted_index),
            input_value: self.input_value.resolve(state.input_value),
            selected_item: self.selected_item.resolve(state.selected_item),
        }
    }
}

impl<T> Controlled<T> {
    /// Fields the host currently dictates.
    pub fn fields(&self) -> StateFields {
        let mut fields = StateFields::empty();
        fields.set(StateFields::IS_OPEN, self.is_open.is_external());
        fields.set(
            StateFields::HIGHLIGHTED_INDEX,
            self.highlighted_index.is_external(),
        );
        fields.set(StateFields::INPUT_VALUE, self.input_value.is_external());
        fields.set(StateFields::SELECTED_ITEM, self.selected_item.is_external());
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn internal_sources_keep_computed_values() {
        let state = ComboboxState {
            is_open: true,
            highlighted_index: Some(1),
            input_value: "ban".to_string(),
            selected_item: Some(7_u32),
        };
        assert_eq!(Controlled::default().reconcile(state.clone()), state);
        assert!(Controlled::<u32>::default().fields().is_empty());
    }

    #[test]
    fn external_sources_always_win() {
        let controlled = Controlled {
            is_open: Source::External(false),
            highlighted_index: Source::External(None),
            input_value: Source::External("fixed".to_string()),
            selected_item: Source::External(Some(3_u32)),
        };
        let state = ComboboxState {
            is_open: true,
            highlighted_index: Some(4),
            input_value: "typed".to_string(),
            selected_item: None,
        };
        let reconciled = controlled.reconcile(state);
        assert!(!reconciled.is_open);
        assert_eq!(reconciled.highlighted_index, None);
        assert_eq!(reconciled.input_value, "fixed");
        assert_eq!(reconciled.selected_item, Some(3));
        assert_eq!(controlled.fields(), StateFields::all());
    }

    #[test]
    fn external_none_is_a_value_not_an_absence() {
        let controlled = Controlled::<u32> {
            selected_item: Source::External(None),
            ..Controlled::default()
        };
        assert_eq!(controlled.selected_item.external(), Some(&None));
        assert_eq!(controlled.fields(), StateFields::SELECTED_ITEM);
    }
}
