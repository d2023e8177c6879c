// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host environment: document listeners, timers, containment, and focus.
//!
//! A combobox closes when the user clicks or taps outside of it. Detecting
//! that needs document-level listeners, a timer to debounce the close, and a
//! way to tell whether an event target lies inside the widget. None of this
//! is discovered from ambient state: the host passes an [`Environment`] in,
//! which also makes embedded contexts (a widget living in another window or
//! document) a matter of passing a different value.
//!
//! Two implementations ship with the crate:
//!
//! - [`DetachedEnvironment`]: no document at all. Only [`EventTarget::Region`]
//!   targets count as inside; timers never fire unless the host forwards them.
//! - [`BoundsEnvironment`]: region bounds as [`kurbo::Rect`]s, point hit
//!   testing, and a manual clock. Handy for headless hosts and for tests.

use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::Rect;
use smallvec::SmallVec;

use crate::event::{DocumentEvent, DocumentEventKind, EventTarget, Region};

/// Handle for a registered document listener.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Handle for a scheduled timer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Failure to wire the widget into its environment.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EnvironmentError {
    /// The environment refused a listener.
    #[error("environment refused a listener for {0:?}")]
    ListenerRejected(DocumentEventKind),
    /// The environment has no document to listen on.
    #[error("environment is detached from its document")]
    Detached,
}

/// Capabilities the combobox needs from its host.
pub trait Environment {
    /// Start delivering `kind` events to the widget.
    fn add_listener(&mut self, kind: DocumentEventKind) -> Result<ListenerId, EnvironmentError>;

    /// Stop delivering events for `id`.
    fn remove_listener(&mut self, id: ListenerId);

    /// Schedule a timer; the host forwards it to
    /// [`Combobox::handle_timer`](crate::Combobox::handle_timer) once due.
    fn set_timeout(&mut self, delay_ms: u64) -> TimerId;

    /// Cancel a timer that has not fired yet.
    fn clear_timeout(&mut self, id: TimerId);

    /// Whether `target` lies inside the widget.
    fn contains(&self, target: &EventTarget) -> bool;

    /// Advisory: the widget would like `region` to receive focus.
    fn request_focus(&mut self, region: Region) {
        let _ = region;
    }
}

impl<E: Environment + ?Sized> Environment for &mut E {
    fn add_listener(&mut self, kind: DocumentEventKind) -> Result<ListenerId, EnvironmentError> {
        (**self).add_listener(kind)
    }

    fn remove_listener(&mut self, id: ListenerId) {
        (**self).remove_listener(id);
    }

    fn set_timeout(&mut self, delay_ms: u64) -> TimerId {
        (**self).set_timeout(delay_ms)
    }

    fn clear_timeout(&mut self, id: TimerId) {
        (**self).clear_timeout(id);
    }

    fn contains(&self, target: &EventTarget) -> bool {
        (**self).contains(target)
    }

    fn request_focus(&mut self, region: Region) {
        (**self).request_focus(region);
    }
}

/// An environment without a document.
#[derive(Clone, Debug, Default)]
pub struct DetachedEnvironment {
    next_id: u64,
}

impl DetachedEnvironment {
    /// Create a detached environment.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Environment for DetachedEnvironment {
    fn add_listener(&mut self, _kind: DocumentEventKind) -> Result<ListenerId, EnvironmentError> {
        self.next_id += 1;
        Ok(ListenerId(self.next_id))
    }

    fn remove_listener(&mut self, _id: ListenerId) {}

    fn set_timeout(&mut self, _delay_ms: u64) -> TimerId {
        self.next_id += 1;
        TimerId(self.next_id)
    }

    fn clear_timeout(&mut self, _id: TimerId) {}

    fn contains(&self, target: &EventTarget) -> bool {
        matches!(target, EventTarget::Region(_))
    }
}

/// An environment that knows where each widget region is.
///
/// Point targets are inside the widget when any registered region bounds
/// contain them. Timers run on a manual clock advanced by
/// [`BoundsEnvironment::advance`].
///
/// ```rust
/// use kurbo::{Point, Rect};
/// use understory_combobox::{BoundsEnvironment, Environment, EventTarget, Region};
///
/// let mut env = BoundsEnvironment::new();
/// env.set_bounds(Region::Input, Rect::new(0.0, 0.0, 200.0, 24.0));
/// assert!(env.contains(&EventTarget::Point(Point::new(10.0, 10.0))));
/// assert!(!env.contains(&EventTarget::Point(Point::new(10.0, 300.0))));
///
/// let timer = env.set_timeout(50);
/// assert!(env.advance(49).is_empty());
/// assert_eq!(env.advance(1).as_slice(), &[timer]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct BoundsEnvironment {
    bounds: HashMap<Region, Rect>,
    listeners: HashMap<ListenerId, DocumentEventKind>,
    timers: HashMap<TimerId, u64>,
    now: u64,
    next_id: u64,
    detached: bool,
    focus_requests: Vec<Region>,
}

impl BoundsEnvironment {
    /// An attached environment with no bounds, at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record where `region` is.
    pub fn set_bounds(&mut self, region: Region, rect: Rect) {
        self.bounds.insert(region, rect);
    }

    /// Forget every region's bounds (for example before a relayout).
    pub fn clear_bounds(&mut self) {
        self.bounds.clear();
    }

    /// Refuse further listener registrations, as a torn-down document would.
    pub fn detach(&mut self) {
        self.detached = true;
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Whether a listener for `kind` is live.
    pub fn is_listening(&self, kind: DocumentEventKind) -> bool {
        self.listeners.values().any(|k| *k == kind)
    }

    /// Number of timers that have neither fired nor been cleared.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Current clock value in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Move the clock forward and return the timers that became due, in
    /// deadline order. Returned timers are forgotten.
    pub fn advance(&mut self, ms: u64) -> SmallVec<[TimerId; 4]> {
        self.now = self.now.saturating_add(ms);
        let now = self.now;
        let mut due: SmallVec<[(u64, TimerId); 4]> = self
            .timers
            .iter()
            .filter(|&(_, &deadline)| deadline <= now)
            .map(|(&id, &deadline)| (deadline, id))
            .collect();
        due.sort_unstable();
        for (_, id) in &due {
            self.timers.remove(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }

    /// Focus requests received so far, oldest first; clears the record.
    pub fn take_focus_requests(&mut self) -> Vec<Region> {
        core::mem::take(&mut self.focus_requests)
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Environment for BoundsEnvironment {
    fn add_listener(&mut self, kind: DocumentEventKind) -> Result<ListenerId, EnvironmentError> {
        if self.detached {
            return Err(EnvironmentError::Detached);
        }
        let id = ListenerId(self.next_id());
        self.listeners.insert(id, kind);
        Ok(id)
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }

    fn set_timeout(&mut self, delay_ms: u64) -> TimerId {
        let id = TimerId(self.next_id());
        self.timers.insert(id, self.now.saturating_add(delay_ms));
        id
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.timers.remove(&id);
    }

    fn contains(&self, target: &EventTarget) -> bool {
        match target {
            EventTarget::Region(_) => true,
            EventTarget::Point(pt) => self.bounds.values().any(|rect| rect.contains(*pt)),
            EventTarget::Detached => false,
        }
    }

    fn request_focus(&mut self, region: Region) {
        self.focus_requests.push(region);
    }
}

/// Document listener registrations plus the pointer/touch bookkeeping that
/// decides when an interaction happened outside the widget.
#[derive(Clone, Debug, Default)]
pub(crate) struct OutsideInteraction {
    listeners: SmallVec<[ListenerId; 5]>,
    pending: Option<TimerId>,
    is_mouse_down: bool,
    is_touch_move: bool,
}

impl OutsideInteraction {
    /// Register every document listener, rolling back on the first failure.
    pub(crate) fn attach<E: Environment>(env: &mut E) -> Result<Self, EnvironmentError> {
        let mut this = Self::default();
        for kind in DocumentEventKind::ALL {
            match env.add_listener(kind) {
                Ok(id) => this.listeners.push(id),
                Err(err) => {
                    tracing::warn!(?kind, %err, "combobox listener registration failed");
                    this.detach(env);
                    return Err(err);
                }
            }
        }
        Ok(this)
    }

    /// Release every listener and any pending timer.
    pub(crate) fn detach<E: Environment>(&mut self, env: &mut E) {
        for id in self.listeners.drain(..) {
            env.remove_listener(id);
        }
        self.cancel(env);
    }

    pub(crate) fn is_mouse_down(&self) -> bool {
        self.is_mouse_down
    }

    pub(crate) fn pending(&self) -> Option<TimerId> {
        self.pending
    }

    /// Track `event`; returns `true` when it completes an interaction that
    /// started and ended outside of the widget.
    pub(crate) fn observe(&mut self, event: &DocumentEvent, inside: bool) -> bool {
        match event.kind {
            DocumentEventKind::MouseDown => {
                self.is_mouse_down = true;
                false
            }
            DocumentEventKind::MouseUp => {
                self.is_mouse_down = false;
                !inside
            }
            DocumentEventKind::TouchStart => {
                self.is_touch_move = false;
                false
            }
            DocumentEventKind::TouchMove => {
                self.is_touch_move = true;
                false
            }
            // A touch that moved was a scroll, not a tap.
            DocumentEventKind::TouchEnd => !self.is_touch_move && !inside,
        }
    }

    /// (Re)start the debounce timer.
    pub(crate) fn schedule<E: Environment>(&mut self, env: &mut E, delay_ms: u64) {
        self.cancel(env);
        self.pending = Some(env.set_timeout(delay_ms));
    }

    pub(crate) fn cancel<E: Environment>(&mut self, env: &mut E) {
        if let Some(id) = self.pending.take() {
            env.clear_timeout(id);
        }
    }

    /// Consume `id` if it is the pending debounce timer.
    pub(crate) fn fire(&mut self, id: TimerId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}
