// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The combobox engine: owns state, runs the reducer pipeline, binds props.

use alloc::rc::Rc;
use alloc::string::String;
use core::fmt::Debug;

use crate::action::{Action, ActionKind, classify};
use crate::controlled::{Controlled, Source};
use crate::environment::{
    DetachedEnvironment, Environment, EnvironmentError, OutsideInteraction, TimerId,
};
use crate::event::{DocumentEvent, HostEvent, RawEvent, Region};
use crate::options::ComboboxOptions;
use crate::pipeline::{ActionAndChanges, ActionQueue, MAX_QUEUED_ACTIONS};
use crate::props::{Binder, InputProps, ItemProps, LabelProps, MenuProps, ToggleButtonProps};
use crate::state::{ComboboxState, StateFields};
use crate::transition::{TransitionContext, transition};

/// A combobox interaction engine.
///
/// The engine owns the [`ComboboxState`]; the host owns the candidate list
/// and passes it to every call that may need it. All work happens
/// synchronously inside the call that delivered the triggering event.
///
/// ```rust
/// use understory_combobox::{Combobox, ComboboxOptions, Key, RawEvent, Region};
///
/// let items = ["Apple", "Banana", "Cherry"];
/// let mut combo = Combobox::detached(ComboboxOptions::default());
///
/// combo.handle(Region::Input, &RawEvent::key(Key::ArrowDown), &items);
/// combo.handle(Region::Input, &RawEvent::key(Key::ArrowDown), &items);
/// assert_eq!(combo.state().highlighted_index, Some(1));
///
/// combo.handle(Region::Input, &RawEvent::key(Key::Enter), &items);
/// assert_eq!(combo.state().selected_item, Some("Banana"));
/// assert_eq!(combo.state().input_value, "Banana");
/// assert!(!combo.state().is_open);
/// ```
pub struct Combobox<T, E: Environment = DetachedEnvironment> {
    options: ComboboxOptions<T>,
    /// Last accepted state, before controlled overrides.
    internal: ComboboxState<T>,
    /// What the host sees.
    committed: ComboboxState<T>,
    controlled: Controlled<T>,
    env: E,
    outside: OutsideInteraction,
    binder: Binder,
    /// Bumped whenever `committed` changes; keys the props cache.
    revision: u64,
}

impl<T: Debug, E: Environment> Debug for Combobox<T, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Combobox")
            .field("state", &self.committed)
            .field("controlled", &self.controlled)
            .field("options", &self.options)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + PartialEq> Combobox<T, DetachedEnvironment> {
    /// A combobox without a document: no outside-click detection.
    pub fn detached(options: ComboboxOptions<T>) -> Self {
        Self::with_outside(options, DetachedEnvironment::new(), OutsideInteraction::default())
    }
}

impl<T: Clone + PartialEq, E: Environment> Combobox<T, E> {
    /// Create a combobox and register its document listeners with `env`.
    ///
    /// Listeners are released when the combobox is dropped.
    pub fn new(options: ComboboxOptions<T>, mut env: E) -> Result<Self, EnvironmentError> {
        let outside = OutsideInteraction::attach(&mut env)?;
        Ok(Self::with_outside(options, env, outside))
    }

    fn with_outside(options: ComboboxOptions<T>, env: E, outside: OutsideInteraction) -> Self {
        let internal = options.initial_state();
        Self {
            committed: internal.clone(),
            internal,
            options,
            controlled: Controlled::default(),
            env,
            outside,
            binder: Binder::default(),
            revision: 0,
        }
    }

    /// The committed state.
    pub fn state(&self) -> &ComboboxState<T> {
        &self.committed
    }

    /// The configuration this combobox was built with.
    pub fn options(&self) -> &ComboboxOptions<T> {
        &self.options
    }

    /// Current controlled sources.
    pub fn controlled(&self) -> &Controlled<T> {
        &self.controlled
    }

    /// The environment.
    pub fn environment(&self) -> &E {
        &self.env
    }

    /// The environment, mutably (for example to update region bounds).
    pub fn environment_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Re-declare which fields the host controls and their values.
    ///
    /// Hosts call this on every render. No change callbacks fire for values
    /// the host forces; when the externally controlled selected item is
    /// swapped, the input text follows it through
    /// [`ActionKind::ControlledPropUpdatedSelectedItem`].
    pub fn set_controlled(&mut self, controlled: Controlled<T>, items: &[T]) -> StateFields {
        let selection_swapped = match (&self.controlled.selected_item, &controlled.selected_item)
        {
            (Source::External(old), Source::External(new)) => old != new,
            (Source::Internal, Source::External(new)) => *new != self.committed.selected_item,
            (_, Source::Internal) => false,
        };
        self.controlled = controlled;
        let reconciled = self.controlled.reconcile(self.internal.clone());
        let mut changed = self.committed.diff(&reconciled);
        if !changed.is_empty() {
            self.committed = reconciled;
            self.revision += 1;
        }
        if selection_swapped {
            tracing::debug!("controlled selected item swapped; syncing input text");
            changed |= self.dispatch(Action::ControlledPropUpdatedSelectedItem, items);
        }
        changed
    }

    /// Run `action` (and anything callbacks queue in response) to completion.
    ///
    /// Returns the fields of the committed state that differ afterwards.
    pub fn dispatch(&mut self, action: Action<T>, items: &[T]) -> StateFields {
        let before = self.committed.clone();
        let mut queue = ActionQueue::new();
        queue.push(action);
        let mut processed = 0;
        while let Some(action) = queue.pop() {
            if processed == MAX_QUEUED_ACTIONS {
                tracing::warn!(
                    dropped = queue.len() + 1,
                    "combobox callbacks keep queueing actions; dropping the rest"
                );
                queue.clear();
                break;
            }
            processed += 1;
            self.step(action, items, &mut queue);
        }
        before.diff(&self.committed)
    }

    /// One pass through the pipeline.
    fn step(&mut self, action: Action<T>, items: &[T], queue: &mut ActionQueue<T>) {
        let kind = action.kind();
        let previous = self.committed.clone();
        let cx = TransitionContext {
            items,
            item_to_string: &*self.options.item_to_string,
            is_item_disabled: self.options.is_item_disabled.as_deref(),
            circular: self.options.circular,
            defaults: &self.options.defaults,
        };
        let proposed = transition(&previous, &action, &cx);
        let accepted = match &self.options.state_reducer {
            Some(reducer) => reducer(
                &previous,
                ActionAndChanges {
                    action: &action,
                    kind,
                    changes: proposed,
                },
            ),
            None => proposed,
        };

        let computed = accepted.apply_to(previous.clone());
        let notified = previous.diff(&computed);
        let committed = self.controlled.reconcile(computed.clone());
        let changed = previous.diff(&committed);
        tracing::trace!(
            ?kind,
            notified = notified.bits(),
            changed = changed.bits(),
            "combobox transition"
        );

        self.internal = computed;
        self.committed = committed;
        if !changed.is_empty() {
            self.revision += 1;
        }
        self.run_effects(kind, changed);
        self.options
            .callbacks
            .notify(kind, &self.internal, notified, queue);
    }

    /// Advisory scroll and focus requests for a committed transition.
    fn run_effects(&mut self, kind: ActionKind, changed: StateFields) {
        let moved = changed.intersects(StateFields::HIGHLIGHTED_INDEX | StateFields::IS_OPEN);
        // Hover already has the candidate under the pointer.
        if moved
            && self.committed.is_open
            && kind != ActionKind::ItemMouseMove
            && let Some(index) = self.committed.highlighted_index
            && let Some(scroll) = self.options.scroll_into_view.as_mut()
        {
            scroll(index);
        }
        match kind {
            ActionKind::ToggleButtonClick if self.committed.is_open => {
                self.env.request_focus(Region::Input);
            }
            ActionKind::ItemClick if !changed.is_empty() => {
                self.env.request_focus(Region::Input);
            }
            _ => {}
        }
    }

    /// Handle an event delivered to one of the widget's regions.
    ///
    /// Returns the kind of action the event was classified as, if any.
    pub fn handle(&mut self, region: Region, event: &RawEvent, items: &[T]) -> Option<ActionKind> {
        match event {
            RawEvent::Focus => {
                if self.outside.pending().is_some() {
                    tracing::debug!(?region, "focus returned to combobox; cancelling close");
                    self.outside.cancel(&mut self.env);
                }
            }
            RawEvent::Blur { related_target } => {
                // The pointer is pressed inside the widget (for example on a
                // candidate); the click that follows decides what happens.
                if self.outside.is_mouse_down() {
                    tracing::trace!("blur during pointer press ignored");
                    return None;
                }
                if related_target.is_some_and(|target| self.env.contains(&target)) {
                    return None;
                }
            }
            _ => {}
        }
        let Some(action) = classify(region, event) else {
            tracing::trace!(?region, "event not classified");
            return None;
        };
        let kind = action.kind();
        self.dispatch(action, items);
        Some(kind)
    }

    /// Run the caller's `handler` first, then [`Combobox::handle`] unless the
    /// handler called [`HostEvent::suppress_default`].
    pub fn handle_with(
        &mut self,
        region: Region,
        event: &mut HostEvent,
        items: &[T],
        handler: impl FnOnce(&mut HostEvent),
    ) -> Option<ActionKind> {
        handler(event);
        if event.is_default_suppressed() {
            tracing::trace!(?region, "default suppressed by caller handler");
            return None;
        }
        self.handle(region, &event.event, items)
    }

    /// Feed a document-level event from one of the registered listeners.
    ///
    /// Returns `true` when the event scheduled a close of the open list.
    pub fn handle_document_event(&mut self, event: &DocumentEvent) -> bool {
        let inside = self.env.contains(&event.target);
        if self.outside.observe(event, inside) && self.committed.is_open {
            tracing::debug!(kind = ?event.kind, "outside interaction; scheduling close");
            self.outside
                .schedule(&mut self.env, self.options.outside_debounce_ms);
            return true;
        }
        false
    }

    /// Feed a timer the environment reports as due.
    pub fn handle_timer(&mut self, id: TimerId, items: &[T]) -> Option<ActionKind> {
        if !self.outside.fire(id) || !self.committed.is_open {
            return None;
        }
        self.dispatch(Action::InputBlur { select_item: false }, items);
        Some(ActionKind::InputBlur)
    }

    /// Open the list.
    pub fn open_menu(&mut self, items: &[T]) -> StateFields {
        self.dispatch(Action::FunctionOpenMenu, items)
    }

    /// Close the list.
    pub fn close_menu(&mut self, items: &[T]) -> StateFields {
        self.dispatch(Action::FunctionCloseMenu, items)
    }

    /// Flip the list between open and closed.
    pub fn toggle_menu(&mut self, items: &[T]) -> StateFields {
        self.dispatch(Action::FunctionToggleMenu, items)
    }

    /// Restore the configured defaults.
    pub fn reset(&mut self, items: &[T]) -> StateFields {
        self.dispatch(Action::FunctionReset, items)
    }

    /// Select `item` (or clear the selection) and sync the input text.
    pub fn select_item(&mut self, item: Option<T>, items: &[T]) -> StateFields {
        self.dispatch(Action::FunctionSelectItem(item), items)
    }

    /// Highlight a candidate. Positions past the end of `items` clear the
    /// highlight.
    pub fn set_highlighted_index(&mut self, index: Option<usize>, items: &[T]) -> StateFields {
        self.dispatch(Action::FunctionSetHighlightedIndex(index), items)
    }

    /// Replace the input text.
    pub fn set_input_value(&mut self, value: impl Into<String>, items: &[T]) -> StateFields {
        self.dispatch(Action::FunctionSetInputValue(value.into()), items)
    }

    /// Props for the label.
    pub fn label_props(&mut self) -> Rc<LabelProps> {
        self.binder.label(&self.options.ids)
    }

    /// Props for the input.
    pub fn input_props(&mut self, items: &[T]) -> Rc<InputProps> {
        self.binder.sync(self.revision, items);
        self.binder
            .input(&self.options.ids, &self.committed, items.len())
    }

    /// Props for the toggle button.
    pub fn toggle_button_props(&mut self, items: &[T]) -> Rc<ToggleButtonProps> {
        self.binder.sync(self.revision, items);
        self.binder.toggle_button(&self.options.ids, &self.committed)
    }

    /// Props for the candidate list.
    pub fn menu_props(&mut self, items: &[T]) -> Rc<MenuProps> {
        self.binder.sync(self.revision, items);
        self.binder.menu(&self.options.ids, &self.committed)
    }

    /// Props for the candidate at `index`, or `None` past the end of `items`.
    pub fn item_props(&mut self, index: usize, items: &[T]) -> Option<Rc<ItemProps>> {
        let item = items.get(index)?;
        let disabled = self
            .options
            .is_item_disabled
            .as_ref()
            .is_some_and(|disabled| disabled(item, index));
        self.binder.sync(self.revision, items);
        Some(
            self.binder
                .item(&self.options.ids, &self.committed, items, index, disabled),
        )
    }
}

impl<T, E: Environment> Drop for Combobox<T, E> {
    fn drop(&mut self) {
        self.outside.detach(&mut self.env);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DocumentEventKind, EventTarget, Key, Modifiers};
    use crate::state::Changes;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use kurbo::{Point, Rect};

    use crate::environment::BoundsEnvironment;

    const FRUITS: [&str; 3] = ["Apple", "Banana", "Cherry"];

    type Log = Rc<RefCell<Vec<String>>>;

    fn key(combo: &mut Combobox<&'static str, impl Environment>, k: Key) -> Option<ActionKind> {
        combo.handle(Region::Input, &RawEvent::key(k), &FRUITS)
    }

    fn logging_options(log: &Log) -> ComboboxOptions<&'static str> {
        let (a, b, c, d, e) = (log.clone(), log.clone(), log.clone(), log.clone(), log.clone());
        ComboboxOptions::default()
            .on_is_open_change(move |open, kind, _| {
                a.borrow_mut().push(alloc::format!("open {open} {kind:?}"));
            })
            .on_highlighted_index_change(move |index, _, _| {
                b.borrow_mut().push(alloc::format!("highlight {index:?}"));
            })
            .on_input_value_change(move |value, _, _| {
                c.borrow_mut().push(alloc::format!("input {value}"));
            })
            .on_selected_item_change(move |item, _, _| {
                d.borrow_mut().push(alloc::format!("selected {item:?}"));
            })
            .on_state_change(move |change, _| {
                e.borrow_mut()
                    .push(alloc::format!("state {:?}", change.kind));
            })
    }

    fn outside_point() -> EventTarget {
        EventTarget::Point(Point::new(500.0, 500.0))
    }

    fn laid_out_env() -> BoundsEnvironment {
        let mut env = BoundsEnvironment::new();
        env.set_bounds(Region::Input, Rect::new(0.0, 0.0, 200.0, 24.0));
        env.set_bounds(Region::Menu, Rect::new(0.0, 24.0, 200.0, 124.0));
        env
    }

    #[test]
    fn arrow_arrow_enter_selects_second_item() {
        let mut combo = Combobox::detached(ComboboxOptions::default());
        key(&mut combo, Key::ArrowDown);
        assert!(combo.state().is_open);
        assert_eq!(combo.state().highlighted_index, Some(0));
        key(&mut combo, Key::ArrowDown);
        assert_eq!(combo.state().highlighted_index, Some(1));
        key(&mut combo, Key::Enter);
        assert_eq!(
            *combo.state(),
            ComboboxState {
                is_open: false,
                highlighted_index: None,
                input_value: "Banana".to_string(),
                selected_item: Some("Banana"),
            }
        );
    }

    #[test]
    fn confirmation_notifies_exactly_once() {
        let log: Log = Rc::default();
        let mut combo = Combobox::detached(logging_options(&log));
        key(&mut combo, Key::ArrowDown);
        log.borrow_mut().clear();
        key(&mut combo, Key::Enter);
        let log = log.borrow();
        let count = |prefix: &str| log.iter().filter(|l| l.starts_with(prefix)).count();
        assert_eq!(count("state"), 1, "{log:?}");
        assert_eq!(count("selected"), 1);
        assert_eq!(count("input"), 1);
        assert_eq!(count("open"), 1);
        assert_eq!(count("highlight"), 1);
        assert!(log.contains(&"selected Some(\"Apple\")".to_string()));
    }

    #[test]
    fn unchanged_transitions_notify_nothing() {
        let log: Log = Rc::default();
        let mut combo = Combobox::detached(logging_options(&log));
        key(&mut combo, Key::Escape);
        key(&mut combo, Key::Escape);
        assert!(log.borrow().is_empty(), "{:?}", log.borrow());
    }

    #[test]
    fn controlled_null_selection_still_reports_clicks() {
        let log: Log = Rc::default();
        let mut combo = Combobox::detached(logging_options(&log));
        let controlled = Controlled {
            selected_item: Source::External(None),
            ..Controlled::default()
        };
        combo.set_controlled(controlled.clone(), &FRUITS);
        combo.open_menu(&FRUITS);
        log.borrow_mut().clear();

        combo.handle(Region::Item(2), &RawEvent::Click, &FRUITS);
        assert!(log
            .borrow()
            .contains(&"selected Some(\"Cherry\")".to_string()));
        assert_eq!(combo.state().selected_item, None);
        assert!(!combo.state().is_open);

        // Re-declaring the same controlled value on the next render changes nothing.
        assert!(combo.set_controlled(controlled, &FRUITS).is_empty());
        assert_eq!(combo.state().selected_item, None);
    }

    #[test]
    fn controlled_fields_win_after_every_transition() {
        let mut combo = Combobox::detached(ComboboxOptions::default());
        combo.set_controlled(
            Controlled {
                is_open: Source::External(true),
                input_value: Source::External("fixed".to_string()),
                ..Controlled::default()
            },
            &FRUITS,
        );
        for k in [Key::Escape, Key::ArrowDown, Key::Enter, Key::Tab] {
            key(&mut combo, k);
            assert!(combo.state().is_open, "after {k:?}");
            assert_eq!(combo.state().input_value, "fixed", "after {k:?}");
        }
        combo.handle(Region::Input, &RawEvent::change("abc"), &FRUITS);
        assert_eq!(combo.state().input_value, "fixed");
    }

    #[test]
    fn transitions_read_controlled_previous_state() {
        let mut combo = Combobox::detached(ComboboxOptions::default());
        combo.set_controlled(
            Controlled {
                highlighted_index: Source::External(Some(2)),
                is_open: Source::External(true),
                ..Controlled::default()
            },
            &FRUITS,
        );
        assert_eq!(combo.state().highlighted_index, Some(2));
        // Enter reads the forced highlight.
        key(&mut combo, Key::Enter);
        assert_eq!(combo.state().selected_item, Some("Cherry"));
    }

    #[test]
    fn releasing_control_resumes_internal_values() {
        let mut combo = Combobox::detached(ComboboxOptions::default());
        combo.set_controlled(
            Controlled {
                is_open: Source::External(false),
                ..Controlled::default()
            },
            &FRUITS,
        );
        key(&mut combo, Key::ArrowDown);
        assert!(!combo.state().is_open);
        let changed = combo.set_controlled(Controlled::default(), &FRUITS);
        assert_eq!(changed, StateFields::IS_OPEN);
        assert!(combo.state().is_open);
    }

    #[test]
    fn swapping_controlled_selection_syncs_input() {
        let mut combo = Combobox::detached(ComboboxOptions::default());
        combo.set_controlled(
            Controlled {
                selected_item: Source::External(Some("Banana")),
                ..Controlled::default()
            },
            &FRUITS,
        );
        assert_eq!(combo.state().input_value, "Banana");
        combo.set_controlled(
            Controlled {
                selected_item: Source::External(Some("Apple")),
                ..Controlled::default()
            },
            &FRUITS,
        );
        assert_eq!(combo.state().input_value, "Apple");
        assert_eq!(combo.state().selected_item, Some("Apple"));
    }

    #[test]
    fn state_reducer_can_rewrite_changes() {
        // Keep the list open after a selection.
        let options = ComboboxOptions::default().with_state_reducer(|_, ac| match ac.kind {
            ActionKind::InputKeyDownEnter | ActionKind::ItemClick => {
                let mut changes = ac.changes;
                changes.is_open = Some(true);
                changes
            }
            _ => ac.changes,
        });
        let mut combo = Combobox::detached(options);
        key(&mut combo, Key::ArrowDown);
        key(&mut combo, Key::Enter);
        assert!(combo.state().is_open);
        assert_eq!(combo.state().selected_item, Some("Apple"));
    }

    #[test]
    fn state_reducer_output_still_obeys_control() {
        let options = ComboboxOptions::default()
            .with_state_reducer(|_, _| Changes::none().with_input_value("reducer"));
        let mut combo = Combobox::detached(options);
        combo.set_controlled(
            Controlled {
                input_value: Source::External("host".to_string()),
                ..Controlled::default()
            },
            &FRUITS,
        );
        key(&mut combo, Key::Escape);
        assert_eq!(combo.state().input_value, "host");
    }

    #[test]
    fn callbacks_queue_nested_transitions() {
        let seen: Rc<RefCell<Vec<(bool, ActionKind)>>> = Rc::default();
        let s = seen.clone();
        let options = ComboboxOptions::default()
            .on_selected_item_change(|item, _, queue| {
                if item.is_some() {
                    // Clear the text as soon as something is picked.
                    queue.push(Action::FunctionSetInputValue(String::new()));
                }
            })
            .on_is_open_change(move |open, kind, _| s.borrow_mut().push((open, kind)));
        let mut combo = Combobox::detached(options);
        key(&mut combo, Key::ArrowDown);
        let changed = key(&mut combo, Key::Enter);
        assert_eq!(changed, Some(ActionKind::InputKeyDownEnter));
        assert_eq!(combo.state().selected_item, Some("Apple"));
        assert_eq!(combo.state().input_value, "");
        assert_eq!(
            *seen.borrow(),
            vec![
                (true, ActionKind::InputKeyDownArrowDown),
                (false, ActionKind::InputKeyDownEnter)
            ]
        );
    }

    #[test]
    fn runaway_callbacks_are_cut_off() {
        let options = ComboboxOptions::default().on_is_open_change(|_, _, queue| {
            queue.push(Action::FunctionToggleMenu);
        });
        let mut combo = Combobox::detached(options);
        combo.open_menu(&FRUITS);
        // The loop stopped; the engine is still usable.
        combo.set_highlighted_index(Some(1), &FRUITS);
        assert_eq!(combo.state().highlighted_index, Some(1));
    }

    #[test]
    fn caller_handler_can_suppress_default() {
        let mut combo = Combobox::detached(ComboboxOptions::default());
        let mut ev = HostEvent::new(RawEvent::key(Key::ArrowDown));
        let mut called = false;
        let kind = combo.handle_with(Region::Input, &mut ev, &FRUITS, |ev| {
            called = true;
            ev.suppress_default();
        });
        assert!(called);
        assert_eq!(kind, None);
        assert!(!combo.state().is_open);

        let mut ev = HostEvent::new(RawEvent::key(Key::ArrowDown));
        let kind = combo.handle_with(Region::Input, &mut ev, &FRUITS, |_| {});
        assert_eq!(kind, Some(ActionKind::InputKeyDownArrowDown));
        assert!(combo.state().is_open);
    }

    #[test]
    fn text_entry_resets_highlight_but_function_toggle_keeps_it() {
        let mut combo = Combobox::detached(ComboboxOptions::default());
        combo.set_highlighted_index(Some(2), &FRUITS);
        combo.open_menu(&FRUITS);
        combo.close_menu(&FRUITS);
        combo.open_menu(&FRUITS);
        assert_eq!(combo.state().highlighted_index, Some(2));

        combo.handle(Region::Input, &RawEvent::change("Ch"), &["Cherry"]);
        assert!(combo.state().is_open);
        assert_eq!(combo.state().highlighted_index, None);
    }

    #[test]
    fn outside_click_closes_after_debounce() {
        let mut env = laid_out_env();
        let mut combo = Combobox::new(ComboboxOptions::default(), &mut env).unwrap();
        combo.open_menu(&FRUITS);
        combo.set_highlighted_index(Some(1), &FRUITS);

        let down = DocumentEvent::new(DocumentEventKind::MouseDown, outside_point());
        let up = DocumentEvent::new(DocumentEventKind::MouseUp, outside_point());
        assert!(!combo.handle_document_event(&down));
        assert!(combo.handle_document_event(&up));
        assert!(combo.state().is_open, "close waits for the timer");

        let due = combo.environment_mut().advance(0);
        assert_eq!(due.len(), 1);
        assert_eq!(
            combo.handle_timer(due[0], &FRUITS),
            Some(ActionKind::InputBlur)
        );
        assert!(!combo.state().is_open);
        // Outside clicks never select.
        assert_eq!(combo.state().selected_item, None);
    }

    #[test]
    fn inside_release_does_not_close() {
        let mut env = laid_out_env();
        let mut combo = Combobox::new(ComboboxOptions::default(), &mut env).unwrap();
        combo.open_menu(&FRUITS);
        let inside = EventTarget::Point(Point::new(10.0, 50.0));
        assert!(!combo.handle_document_event(&DocumentEvent::new(
            DocumentEventKind::MouseUp,
            inside
        )));
        assert_eq!(combo.environment().pending_timers(), 0);
    }

    #[test]
    fn focus_back_inside_cancels_pending_close() {
        let mut env = laid_out_env();
        let mut combo = Combobox::new(
            ComboboxOptions::default().with_outside_debounce_ms(20),
            &mut env,
        )
        .unwrap();
        combo.open_menu(&FRUITS);
        combo.handle_document_event(&DocumentEvent::new(
            DocumentEventKind::TouchStart,
            outside_point(),
        ));
        assert!(combo.handle_document_event(&DocumentEvent::new(
            DocumentEventKind::TouchEnd,
            outside_point()
        )));
        combo.handle(Region::Input, &RawEvent::Focus, &FRUITS);
        assert!(combo.environment_mut().advance(50).is_empty());
        assert!(combo.state().is_open);
    }

    #[test]
    fn closed_list_ignores_outside_clicks() {
        let mut env = laid_out_env();
        let mut combo = Combobox::new(ComboboxOptions::default(), &mut env).unwrap();
        assert!(!combo.handle_document_event(&DocumentEvent::new(
            DocumentEventKind::MouseUp,
            outside_point()
        )));
        assert_eq!(combo.handle_timer(TimerId(999), &FRUITS), None);
    }

    #[test]
    fn dropping_releases_listeners_and_timers() {
        let mut env = laid_out_env();
        {
            let mut combo = Combobox::new(ComboboxOptions::default(), &mut env).unwrap();
            combo.open_menu(&FRUITS);
            combo.handle_document_event(&DocumentEvent::new(
                DocumentEventKind::MouseUp,
                outside_point(),
            ));
            assert_eq!(combo.environment().listener_count(), 5);
            assert_eq!(combo.environment().pending_timers(), 1);
        }
        assert_eq!(env.listener_count(), 0);
        assert_eq!(env.pending_timers(), 0);
    }

    #[test]
    fn attaching_to_a_detached_document_fails() {
        let mut env = BoundsEnvironment::new();
        env.detach();
        let err = Combobox::<&str, _>::new(ComboboxOptions::default(), &mut env).unwrap_err();
        assert_eq!(err, EnvironmentError::Detached);
        assert_eq!(env.listener_count(), 0);
    }

    #[test]
    fn blur_while_pointer_pressed_inside_is_ignored() {
        let mut env = laid_out_env();
        let mut combo = Combobox::new(ComboboxOptions::default(), &mut env).unwrap();
        key(&mut combo, Key::ArrowDown);
        let item = EventTarget::Point(Point::new(10.0, 40.0));
        combo.handle_document_event(&DocumentEvent::new(DocumentEventKind::MouseDown, item));
        let blur = RawEvent::Blur {
            related_target: None,
        };
        assert_eq!(combo.handle(Region::Input, &blur, &FRUITS), None);
        assert!(combo.state().is_open);
        combo.handle(Region::Item(1), &RawEvent::Click, &FRUITS);
        assert_eq!(combo.state().selected_item, Some("Banana"));
    }

    #[test]
    fn blur_to_point_inside_is_not_a_blur() {
        let mut env = laid_out_env();
        let mut combo = Combobox::new(ComboboxOptions::default(), &mut env).unwrap();
        key(&mut combo, Key::ArrowDown);
        let blur = RawEvent::Blur {
            related_target: Some(EventTarget::Point(Point::new(5.0, 5.0))),
        };
        assert_eq!(combo.handle(Region::Input, &blur, &FRUITS), None);
        let blur = RawEvent::Blur {
            related_target: Some(outside_point()),
        };
        assert_eq!(
            combo.handle(Region::Input, &blur, &FRUITS),
            Some(ActionKind::InputBlur)
        );
        assert_eq!(combo.state().selected_item, Some("Apple"));
    }

    #[test]
    fn scroll_requests_follow_keyboard_not_hover() {
        let scrolled: Rc<RefCell<Vec<usize>>> = Rc::default();
        let s = scrolled.clone();
        let options =
            ComboboxOptions::default().with_scroll_into_view(move |i| s.borrow_mut().push(i));
        let mut combo = Combobox::detached(options);
        key(&mut combo, Key::ArrowDown);
        key(&mut combo, Key::ArrowUp);
        combo.handle(Region::Item(1), &RawEvent::MouseMove, &FRUITS);
        combo.set_highlighted_index(Some(0), &FRUITS);
        assert_eq!(*scrolled.borrow(), vec![0, 2, 0]);
    }

    #[test]
    fn clicks_request_input_focus() {
        let mut env = laid_out_env();
        let mut combo = Combobox::new(ComboboxOptions::default(), &mut env).unwrap();
        combo.handle(Region::ToggleButton, &RawEvent::Click, &FRUITS);
        combo.handle(Region::Item(0), &RawEvent::Click, &FRUITS);
        combo.handle(Region::ToggleButton, &RawEvent::Click, &FRUITS);
        combo.handle(Region::ToggleButton, &RawEvent::Click, &FRUITS);
        assert_eq!(
            combo.environment_mut().take_focus_requests(),
            vec![Region::Input, Region::Input, Region::Input]
        );
    }

    #[test]
    fn props_are_stable_until_state_changes() {
        let items = FRUITS;
        let mut combo = Combobox::detached(ComboboxOptions::default());
        let input = combo.input_props(&items);
        assert!(Rc::ptr_eq(&input, &combo.input_props(&items)));

        // A transition that changes nothing keeps the props.
        combo.close_menu(&items);
        assert!(Rc::ptr_eq(&input, &combo.input_props(&items)));

        combo.handle(Region::Input, &RawEvent::key(Key::ArrowDown), &items);
        let opened = combo.input_props(&items);
        assert!(!Rc::ptr_eq(&input, &opened));
        assert!(opened.aria_expanded);
        assert_eq!(
            opened.aria_activedescendant.as_deref(),
            Some("combobox-item-0")
        );
        assert!(combo.toggle_button_props(&items).aria_expanded);
        assert!(combo.menu_props(&items).is_open);
        assert!(combo.item_props(0, &items).unwrap().aria_selected);
        assert!(combo.item_props(3, &items).is_none());
        assert_eq!(combo.label_props().id, "combobox-label");
    }

    #[test]
    fn disabled_items_are_not_chosen() {
        let options = ComboboxOptions::default().with_disabled_items(|item: &&str, _| *item == "Banana");
        let mut combo = Combobox::detached(options);
        key(&mut combo, Key::ArrowDown);
        key(&mut combo, Key::ArrowDown);
        assert_eq!(combo.state().highlighted_index, Some(2));
        assert!(combo.item_props(1, &FRUITS).unwrap().aria_disabled);
        combo.handle(Region::Item(1), &RawEvent::Click, &FRUITS);
        assert_eq!(combo.state().selected_item, None);
    }

    #[test]
    fn reset_restores_defaults_and_initial_applies_once() {
        let options = ComboboxOptions::default()
            .with_defaults(Changes::none().with_selected_item(Some("Apple")).with_input_value("Apple"))
            .with_initial(Changes::none().with_open(true).with_input_value("Ba"));
        let mut combo = Combobox::detached(options);
        assert!(combo.state().is_open);
        assert_eq!(combo.state().input_value, "Ba");
        assert_eq!(combo.state().selected_item, Some("Apple"));
        combo.reset(&FRUITS);
        assert!(!combo.state().is_open);
        assert_eq!(combo.state().input_value, "Apple");
    }

    #[test]
    fn programmatic_controls_drive_the_pipeline() {
        let log: Log = Rc::default();
        let mut combo = Combobox::detached(logging_options(&log));
        assert_eq!(combo.toggle_menu(&FRUITS), StateFields::IS_OPEN);
        assert_eq!(
            combo.select_item(Some("Cherry"), &FRUITS),
            StateFields::SELECTED_ITEM | StateFields::INPUT_VALUE
        );
        assert_eq!(
            combo.set_input_value("Che", &FRUITS),
            StateFields::INPUT_VALUE
        );
        assert_eq!(
            combo.set_highlighted_index(Some(10), &FRUITS),
            StateFields::empty()
        );
        assert!(log
            .borrow()
            .contains(&"state FunctionSelectItem".to_string()));
    }

    #[test]
    fn alt_down_then_escape_round_trip() {
        let mut combo = Combobox::detached(ComboboxOptions::default());
        combo.handle(
            Region::Input,
            &RawEvent::key_with(Key::ArrowDown, Modifiers::ALT),
            &FRUITS,
        );
        assert!(combo.state().is_open);
        assert_eq!(combo.state().highlighted_index, None);
        combo.handle(Region::Input, &RawEvent::change("Ban"), &FRUITS);
        key(&mut combo, Key::Escape);
        let once = combo.state().clone();
        key(&mut combo, Key::Escape);
        assert_eq!(*combo.state(), once);
        assert_eq!(once.input_value, "");
    }
}
