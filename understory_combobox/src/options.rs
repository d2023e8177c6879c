// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host configuration for a [`Combobox`](crate::Combobox).

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use core::fmt::Display;

use crate::action::ActionKind;
use crate::pipeline::{ActionAndChanges, ActionQueue, Callbacks, StateChange, StateReducer};
use crate::state::{Changes, ComboboxState};

/// Delay, in milliseconds, between an outside pointer release and the
/// resulting close. Zero defers to the host's next timer turn, which is
/// enough for a focus change back into the widget to cancel it.
pub const DEFAULT_OUTSIDE_DEBOUNCE_MS: u64 = 0;

/// Display text of a candidate.
pub type ItemToString<T> = Box<dyn Fn(&T) -> String>;
/// Whether a candidate at a position can be highlighted or chosen.
pub type IsItemDisabled<T> = Box<dyn Fn(&T, usize) -> bool>;
/// Advisory request to make the candidate at a position visible.
pub type ScrollIntoView = Box<dyn FnMut(usize)>;

/// Element ids used in accessibility attributes.
///
/// The engine does not make ids unique; the host supplies a base that is
/// unique in its document and every part id is derived from it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComboboxIds {
    base: String,
}

impl Default for ComboboxIds {
    fn default() -> Self {
        Self::new("combobox")
    }
}

impl ComboboxIds {
    /// Ids derived from `base`.
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// Id of the label element.
    pub fn label(&self) -> String {
        format!("{}-label", self.base)
    }

    /// Id of the input element.
    pub fn input(&self) -> String {
        format!("{}-input", self.base)
    }

    /// Id of the toggle button element.
    pub fn toggle_button(&self) -> String {
        format!("{}-toggle-button", self.base)
    }

    /// Id of the candidate list element.
    pub fn menu(&self) -> String {
        format!("{}-menu", self.base)
    }

    /// Id of the candidate at `index`.
    pub fn item(&self, index: usize) -> String {
        format!("{}-item-{index}", self.base)
    }
}

/// Everything the host configures up front.
///
/// Built with `with_*` methods; [`Default`] is available for items that
/// implement [`Display`], in which case the display text is the item itself.
///
/// ```rust
/// use understory_combobox::{Changes, ComboboxOptions};
///
/// let options = ComboboxOptions::<&str>::default()
///     .with_circular(false)
///     .with_initial(Changes::none().with_input_value("Ap"));
/// # let _ = options;
/// ```
pub struct ComboboxOptions<T> {
    pub(crate) item_to_string: ItemToString<T>,
    pub(crate) is_item_disabled: Option<IsItemDisabled<T>>,
    pub(crate) initial: Changes<T>,
    pub(crate) defaults: ComboboxState<T>,
    pub(crate) circular: bool,
    pub(crate) ids: ComboboxIds,
    pub(crate) state_reducer: Option<StateReducer<T>>,
    pub(crate) callbacks: Callbacks<T>,
    pub(crate) scroll_into_view: Option<ScrollIntoView>,
    pub(crate) outside_debounce_ms: u64,
}

impl<T: Display + 'static> Default for ComboboxOptions<T> {
    fn default() -> Self {
        Self::new(|item: &T| item.to_string())
    }
}

impl<T> core::fmt::Debug for ComboboxOptions<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ComboboxOptions")
            .field("is_item_disabled", &self.is_item_disabled.is_some())
            .field("circular", &self.circular)
            .field("ids", &self.ids)
            .field("state_reducer", &self.state_reducer.is_some())
            .field("callbacks", &self.callbacks)
            .field("scroll_into_view", &self.scroll_into_view.is_some())
            .field("outside_debounce_ms", &self.outside_debounce_ms)
            .finish_non_exhaustive()
    }
}

impl<T> ComboboxOptions<T> {
    /// Options with the given display-text function and everything else default.
    pub fn new(item_to_string: impl Fn(&T) -> String + 'static) -> Self {
        Self {
            item_to_string: Box::new(item_to_string),
            is_item_disabled: None,
            initial: Changes::none(),
            defaults: ComboboxState::default(),
            circular: true,
            ids: ComboboxIds::default(),
            state_reducer: None,
            callbacks: Callbacks::default(),
            scroll_into_view: None,
            outside_debounce_ms: DEFAULT_OUTSIDE_DEBOUNCE_MS,
        }
    }

    /// Mark candidates that cannot be highlighted or chosen.
    #[must_use]
    pub fn with_disabled_items(
        mut self,
        is_disabled: impl Fn(&T, usize) -> bool + 'static,
    ) -> Self {
        self.is_item_disabled = Some(Box::new(is_disabled));
        self
    }

    /// Whether arrow navigation wraps around the ends (default `true`).
    #[must_use]
    pub fn with_circular(mut self, circular: bool) -> Self {
        self.circular = circular;
        self
    }

    /// Values for the first render; unset fields fall back to the defaults.
    #[must_use]
    pub fn with_initial(mut self, initial: Changes<T>) -> Self {
        self.initial = initial;
        self
    }

    /// Values restored by a reset. The default highlight is also used
    /// whenever the list opens.
    #[must_use]
    pub fn with_defaults(mut self, defaults: Changes<T>) -> Self {
        self.defaults = defaults.apply_to(ComboboxState::default());
        self
    }

    /// Base for element ids.
    #[must_use]
    pub fn with_ids(mut self, ids: ComboboxIds) -> Self {
        self.ids = ids;
        self
    }

    /// Rewrite proposed changes before they commit.
    #[must_use]
    pub fn with_state_reducer(
        mut self,
        reducer: impl Fn(&ComboboxState<T>, ActionAndChanges<'_, T>) -> Changes<T> + 'static,
    ) -> Self {
        self.state_reducer = Some(Box::new(reducer));
        self
    }

    /// Notified when the list opens or closes.
    #[must_use]
    pub fn on_is_open_change(
        mut self,
        cb: impl FnMut(bool, ActionKind, &mut ActionQueue<T>) + 'static,
    ) -> Self {
        self.callbacks.on_is_open_change = Some(Box::new(cb));
        self
    }

    /// Notified when the highlight moves.
    #[must_use]
    pub fn on_highlighted_index_change(
        mut self,
        cb: impl FnMut(Option<usize>, ActionKind, &mut ActionQueue<T>) + 'static,
    ) -> Self {
        self.callbacks.on_highlighted_index_change = Some(Box::new(cb));
        self
    }

    /// Notified when the input text changes. This is where hosts re-filter.
    #[must_use]
    pub fn on_input_value_change(
        mut self,
        cb: impl FnMut(&str, ActionKind, &mut ActionQueue<T>) + 'static,
    ) -> Self {
        self.callbacks.on_input_value_change = Some(Box::new(cb));
        self
    }

    /// Notified when the selection changes.
    #[must_use]
    pub fn on_selected_item_change(
        mut self,
        cb: impl FnMut(Option<&T>, ActionKind, &mut ActionQueue<T>) + 'static,
    ) -> Self {
        self.callbacks.on_selected_item_change = Some(Box::new(cb));
        self
    }

    /// Notified once per transition that changed anything.
    #[must_use]
    pub fn on_state_change(
        mut self,
        cb: impl FnMut(&StateChange<T>, &mut ActionQueue<T>) + 'static,
    ) -> Self {
        self.callbacks.on_state_change = Some(Box::new(cb));
        self
    }

    /// Called with a candidate position whenever keyboard or programmatic
    /// highlighting should bring it into view. Unset means the host ignores it.
    #[must_use]
    pub fn with_scroll_into_view(mut self, scroll: impl FnMut(usize) + 'static) -> Self {
        self.scroll_into_view = Some(Box::new(scroll));
        self
    }

    /// Delay between an outside pointer release and the close it causes.
    #[must_use]
    pub fn with_outside_debounce_ms(mut self, delay_ms: u64) -> Self {
        self.outside_debounce_ms = delay_ms;
        self
    }

    /// Element ids.
    pub fn ids(&self) -> &ComboboxIds {
        &self.ids
    }

    /// State restored by a reset.
    pub fn defaults(&self) -> &ComboboxState<T> {
        &self.defaults
    }

    /// Display text of `item`.
    pub fn item_to_string(&self, item: &T) -> String {
        (self.item_to_string)(item)
    }

    /// State for the first render.
    pub(crate) fn initial_state(&self) -> ComboboxState<T>
    where
        T: Clone,
    {
        self.initial.clone().apply_to(self.defaults.clone())
    }
}
