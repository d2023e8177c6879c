// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Records and hooks that travel through the reducer pipeline.
//!
//! A dispatch runs: classify, [`transition`](crate::transition), the
//! caller's state reducer (sees an [`ActionAndChanges`]), merge, reconcile,
//! and finally change notifications through [`Callbacks`]. Callbacks never
//! re-enter the engine: they push follow-up actions onto an [`ActionQueue`],
//! which the engine drains once the current transition has committed.

use alloc::boxed::Box;
use alloc::collections::VecDeque;

use crate::action::{Action, ActionKind};
use crate::state::{Changes, ComboboxState, StateFields};

/// Upper bound on actions processed for one host dispatch, including the
/// ones queued by callbacks. Anything past it is dropped.
pub const MAX_QUEUED_ACTIONS: usize = 64;

/// What a state reducer override is shown: why the state is changing and
/// what the engine proposes.
#[derive(Debug)]
pub struct ActionAndChanges<'a, T> {
    /// The action being processed.
    pub action: &'a Action<T>,
    /// Its kind.
    pub kind: ActionKind,
    /// Changes the transition function proposes.
    pub changes: Changes<T>,
}

/// Aggregate notification for one committed transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateChange<T> {
    /// Why the state changed.
    pub kind: ActionKind,
    /// The state the engine arrived at, before controlled overrides.
    pub state: ComboboxState<T>,
    /// Fields that differ from the previous committed state.
    pub changed: StateFields,
}

/// Follow-up actions requested from inside a change callback.
///
/// ```rust
/// use understory_combobox::{Action, ActionQueue};
///
/// let mut queue = ActionQueue::<&str>::new();
/// queue.push(Action::FunctionCloseMenu);
/// assert_eq!(queue.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct ActionQueue<T> {
    pending: VecDeque<Action<T>>,
}

impl<T> Default for ActionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ActionQueue<T> {
    /// An empty queue.
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    /// Run `action` after the transition in progress completes.
    pub fn push(&mut self, action: Action<T>) {
        self.pending.push_back(action);
    }

    /// Number of queued actions.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn pop(&mut self) -> Option<Action<T>> {
        self.pending.pop_front()
    }

    pub(crate) fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Caller hook that may rewrite proposed changes before they commit.
pub type StateReducer<T> = Box<dyn Fn(&ComboboxState<T>, ActionAndChanges<'_, T>) -> Changes<T>>;

/// Called when [`ComboboxState::is_open`] changes.
pub type OnIsOpenChange<T> = Box<dyn FnMut(bool, ActionKind, &mut ActionQueue<T>)>;
/// Called when [`ComboboxState::highlighted_index`] changes.
pub type OnHighlightedIndexChange<T> =
    Box<dyn FnMut(Option<usize>, ActionKind, &mut ActionQueue<T>)>;
/// Called when [`ComboboxState::input_value`] changes.
pub type OnInputValueChange<T> = Box<dyn FnMut(&str, ActionKind, &mut ActionQueue<T>)>;
/// Called when [`ComboboxState::selected_item`] changes.
pub type OnSelectedItemChange<T> = Box<dyn FnMut(Option<&T>, ActionKind, &mut ActionQueue<T>)>;
/// Called once per transition that changed anything.
pub type OnStateChange<T> = Box<dyn FnMut(&StateChange<T>, &mut ActionQueue<T>)>;

/// Change notification hooks, one per field plus an aggregate.
pub(crate) struct Callbacks<T> {
    pub(crate) on_is_open_change: Option<OnIsOpenChange<T>>,
    pub(crate) on_highlighted_index_change: Option<OnHighlightedIndexChange<T>>,
    pub(crate) on_input_value_change: Option<OnInputValueChange<T>>,
    pub(crate) on_selected_item_change: Option<OnSelectedItemChange<T>>,
    pub(crate) on_state_change: Option<OnStateChange<T>>,
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Self {
            on_is_open_change: None,
            on_highlighted_index_change: None,
            on_input_value_change: None,
            on_selected_item_change: None,
            on_state_change: None,
        }
    }
}

impl<T> core::fmt::Debug for Callbacks<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_is_open_change", &self.on_is_open_change.is_some())
            .field(
                "on_highlighted_index_change",
                &self.on_highlighted_index_change.is_some(),
            )
            .field("on_input_value_change", &self.on_input_value_change.is_some())
            .field(
                "on_selected_item_change",
                &self.on_selected_item_change.is_some(),
            )
            .field("on_state_change", &self.on_state_change.is_some())
            .finish()
    }
}

impl<T: Clone> Callbacks<T> {
    /// Fire the hooks for `changed` fields of `state`.
    pub(crate) fn notify(
        &mut self,
        kind: ActionKind,
        state: &ComboboxState<T>,
        changed: StateFields,
        queue: &mut ActionQueue<T>,
    ) {
        if changed.is_empty() {
            return;
        }
        if changed.contains(StateFields::IS_OPEN)
            && let Some(cb) = self.on_is_open_change.as_mut()
        {
            cb(state.is_open, kind, queue);
        }
        if changed.contains(StateFields::HIGHLIGHTED_INDEX)
            && let Some(cb) = self.on_highlighted_index_change.as_mut()
        {
            cb(state.highlighted_index, kind, queue);
        }
        if changed.contains(StateFields::INPUT_VALUE)
            && let Some(cb) = self.on_input_value_change.as_mut()
        {
            cb(&state.input_value, kind, queue);
        }
        if changed.contains(StateFields::SELECTED_ITEM)
            && let Some(cb) = self.on_selected_item_change.as_mut()
        {
            cb(state.selected_item.as_ref(), kind, queue);
        }
        if let Some(cb) = self.on_state_change.as_mut() {
            cb(
                &StateChange {
                    kind,
                    state: state.clone(),
                    changed,
                },
                queue,
            );
        }
    }
}
